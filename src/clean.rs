//! Text cleaning for extracted document text.
//!
//! Strips the artifacts PDF extraction leaves behind (page-number lines,
//! fenced code blocks, image references, bare URLs) and collapses all
//! whitespace runs to single spaces. Cleaning never fails; it always returns
//! a (possibly empty) string.

use once_cell::sync::Lazy;
use regex::Regex;

/// A page-number artifact: a line that is solely a number, optionally
/// labeled "Page", surrounded by blank lines.
static PAGE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*(?:[Pp]age[ \t]+)?\d+\s*\n").unwrap());

/// Fenced code block, non-greedy across lines.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

/// Image reference syntax: `![alt](target)`.
static IMAGE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());

/// Bare http/https URL.
static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean extracted text by removing boilerplate and non-text artifacts.
///
/// Removes page-number lines, fenced code blocks, image references, and
/// bare URLs, then collapses whitespace runs to single spaces and trims
/// the ends.
pub fn clean_text(text: &str) -> String {
    // Page-number removal leaves a single newline so adjacent page numbers
    // still sit between blank lines on the next pass.
    let mut cleaned = text.to_string();
    loop {
        let next = PAGE_NUMBER.replace_all(&cleaned, "\n").into_owned();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }

    let cleaned = CODE_FENCE.replace_all(&cleaned, "");
    let cleaned = IMAGE_REF.replace_all(&cleaned, "");
    let cleaned = BARE_URL.replace_all(&cleaned, "");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");

    cleaned.trim().to_string()
}
