//! Core data models used throughout docvec.
//!
//! These types represent the documents, chunks, and retrieval results that
//! flow through the ingestion and query pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document: an identifier (the source filename) plus its raw
/// extracted text. Transient; not persisted by the core.
#[derive(Debug, Clone)]
pub struct Document {
    pub source_id: String,
    pub text: String,
}

/// Position metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source filename the chunk was cut from.
    pub source_id: String,
    /// Position of the chunk within its document, starting at 0.
    pub chunk_index: usize,
    /// Character length of the chunk text.
    pub chunk_size: usize,
}

/// A bounded span of document text, the unit of retrieval.
/// Immutable once created.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A stored `(id, vector, text, metadata)` tuple.
///
/// `id` is the content address of the chunk: identical text at the same
/// position in the same source always maps to the same entry, so
/// re-ingestion overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub ingested_at: DateTime<Utc>,
}

/// A chunk returned from a similarity query, with its cosine score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

/// One cited source in an [`Answer`].
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub filename: String,
    pub chunk_index: usize,
    pub text: String,
}

/// Final response to an operator question: answer text plus the retrieved
/// sources it was composed from.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}
