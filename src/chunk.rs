//! Text chunking strategies.
//!
//! Two alternative strategies over different input assumptions:
//!
//! - [`MarkdownChunker`] for structured (markdown-like) text: split at the
//!   top-level headings, fall back to paragraph splitting when the heading
//!   split produces undersized fragments, then greedily merge small
//!   fragments up to `max_chunk_size`.
//! - [`SlidingWindowChunker`] for raw extracted text with no usable
//!   structure: fixed-size windows advancing by `chunk_size - chunk_overlap`.
//!
//! The strategies are alternatives selected by [`ChunkStrategy`]; they are
//! never layered. All sizes are character counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::clean::clean_text;
use crate::error::{Error, Result};
use crate::models::{Chunk, ChunkMetadata};

/// A heading line: one or more `#` markers followed by whitespace.
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#+)\s").unwrap());

/// Blank-line paragraph separator.
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Which chunking strategy the pipeline applies to extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Heading-first split with paragraph fallback and small-chunk merging.
    Markdown,
    /// Fixed-size sliding window over raw text.
    Window,
}

/// Splits structured text into semantically coherent chunks.
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    min_chunk_size: usize,
    max_chunk_size: usize,
}

impl MarkdownChunker {
    pub fn new(min_chunk_size: usize, max_chunk_size: usize) -> Result<Self> {
        if min_chunk_size == 0 || max_chunk_size < min_chunk_size {
            return Err(Error::Configuration(format!(
                "invalid chunk sizes: min={}, max={}",
                min_chunk_size, max_chunk_size
            )));
        }
        Ok(Self {
            min_chunk_size,
            max_chunk_size,
        })
    }

    /// Split text immediately before each top-level heading line.
    ///
    /// The split level is the smallest `#` run present in the text, so a
    /// document headed by `#` sections keeps its `##` subsections inside
    /// their parent fragment. Empty fragments are dropped.
    pub fn split_by_headings(&self, text: &str) -> Vec<String> {
        let top_level = HEADING
            .captures_iter(text)
            .map(|c| c[1].len())
            .min();
        let Some(top_level) = top_level else {
            return trimmed_nonempty(std::iter::once(text));
        };

        let mut starts: Vec<usize> = HEADING
            .captures_iter(text)
            .filter(|c| c[1].len() == top_level)
            .map(|c| c.get(0).unwrap().start())
            .collect();
        if starts.first() != Some(&0) {
            starts.insert(0, 0);
        }
        starts.push(text.len());

        trimmed_nonempty(starts.windows(2).map(|w| &text[w[0]..w[1]]))
    }

    /// Split text on blank-line separators, dropping empty fragments.
    pub fn split_by_paragraphs(&self, text: &str) -> Vec<String> {
        trimmed_nonempty(PARAGRAPH_BREAK.split(text))
    }

    /// Greedily accumulate chunks into a running buffer, flushing whenever
    /// the next chunk would push the buffer past `max_chunk_size`. The final
    /// buffer is always flushed, so the last chunk may remain under
    /// `min_chunk_size`; that is accepted, not re-merged.
    pub fn merge_small_chunks(&self, chunks: Vec<String>) -> Vec<String> {
        let mut merged = Vec::new();
        let mut current = String::new();

        for chunk in chunks {
            if current.chars().count() + chunk.chars().count() <= self.max_chunk_size {
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(&chunk);
            } else {
                if !current.is_empty() {
                    merged.push(current);
                }
                current = chunk;
            }
        }

        if !current.is_empty() {
            merged.push(current);
        }

        merged
    }

    /// Clean and split text into chunks with positional metadata.
    ///
    /// Tries the heading split first; if ANY resulting fragment is below
    /// `min_chunk_size` the heading split is discarded entirely and the text
    /// is re-split by paragraphs instead. Fragments are then merged up to
    /// `max_chunk_size`. Always returns at least one chunk; text shorter
    /// than `min_chunk_size` yields a single chunk holding the whole
    /// cleaned text.
    pub fn chunk_text(&self, text: &str, source_id: &str) -> Vec<Chunk> {
        let cleaned = clean_text(text);

        let mut fragments = self.split_by_headings(&cleaned);
        if fragments
            .iter()
            .any(|f| f.chars().count() < self.min_chunk_size)
        {
            fragments = self.split_by_paragraphs(&cleaned);
        }

        let mut merged = self.merge_small_chunks(fragments);
        if merged.is_empty() {
            merged.push(cleaned);
        }

        wrap_chunks(merged, source_id)
    }
}

/// Fixed-size sliding-window chunker for raw extracted text.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SlidingWindowChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Cut text into windows of `chunk_size` characters, advancing the
    /// window start by `chunk_size - chunk_overlap` each step and stopping
    /// once the start reaches end-of-text. The final window may be shorter.
    pub fn chunk_text(&self, text: &str, source_id: &str) -> Vec<Chunk> {
        // Byte offset of every char, plus the end, so windows never split a
        // multi-byte character.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let total_chars = boundaries.len() - 1;

        let step = self.chunk_size - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0usize;
        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            windows.push(text[boundaries[start]..boundaries[end]].to_string());
            start += step;
        }

        wrap_chunks(windows, source_id)
    }
}

fn trimmed_nonempty<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn wrap_chunks(fragments: Vec<String>, source_id: &str) -> Vec<Chunk> {
    fragments
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let chunk_size = text.chars().count();
            Chunk {
                text,
                metadata: ChunkMetadata {
                    source_id: source_id.to_string(),
                    chunk_index: i,
                    chunk_size,
                },
            }
        })
        .collect()
}
