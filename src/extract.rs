//! PDF text extraction.
//!
//! Extraction is delegated entirely to the `pdf-extract` crate; this module
//! only wraps its failures (missing file, unreadable content, empty
//! extraction result) into typed conversion errors with descriptive
//! messages.

use std::path::Path;

use tracing::{error, info};

use crate::error::{Error, Result};

/// Extract plain text from a PDF file on disk.
///
/// # Errors
///
/// Returns [`Error::Conversion`] when the file does not exist, the
/// extractor fails, or the extraction yields no text content.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    if !path.exists() {
        let msg = format!("file not found: {}", path.display());
        error!(path = %path.display(), "extraction failed");
        return Err(Error::Conversion(msg));
    }

    info!(path = %path.display(), "extracting text");

    let text = pdf_extract::extract_text(path).map_err(|e| {
        let msg = format!("PDF extraction failed for {}: {}", path.display(), e);
        error!(path = %path.display(), error = %e, "extraction failed");
        Error::Conversion(msg)
    })?;

    if text.trim().is_empty() {
        let msg = format!(
            "conversion completed but no text content was extracted from {}",
            path.display()
        );
        error!(path = %path.display(), "extraction empty");
        return Err(Error::Conversion(msg));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_conversion_error() {
        let err = extract_pdf_text(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn invalid_pdf_returns_conversion_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let err = extract_pdf_text(&path).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }
}
