//! Typed errors for the ingestion and retrieval pipeline.
//!
//! Each variant corresponds to one failure domain: document conversion,
//! embedding generation, answer generation, configuration, and index
//! storage. Transient HTTP failures (429, 5xx) are retried by the remote
//! clients before being converted into [`Error::Embedding`] or
//! [`Error::AnswerGeneration`]; all other failures convert immediately.

use thiserror::Error;

/// Pipeline error.
#[derive(Debug, Error)]
pub enum Error {
    /// Document extraction or input problems (missing file, unreadable
    /// content, empty extraction result).
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// Embedding generation failed after retry exhaustion, or the provider
    /// returned a malformed response.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Chat/completion call failed.
    #[error("answer generation failed: {0}")]
    AnswerGeneration(String),

    /// Missing credential or invalid configuration at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The on-disk index state could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
