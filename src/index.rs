//! Content-addressed vector index with brute-force cosine retrieval.
//!
//! Stores `(id, vector, text, metadata)` tuples where the id is derived
//! deterministically from the chunk's text and position, making storage
//! idempotent: re-ingesting identical input overwrites the prior entry
//! (upsert, last-write-wins). Queries score every stored vector against the
//! query vector with cosine similarity and return the top k, stable on ties.
//!
//! State persists as a JSON snapshot (`index.json`) inside a storage
//! directory created on open; the snapshot is written to a temp file and
//! renamed so a crash never leaves a truncated index behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::models::{Chunk, IndexEntry, RetrievedChunk};

/// Default number of results returned by a query.
pub const DEFAULT_TOP_K: usize = 5;

const SNAPSHOT_FILE: &str = "index.json";

/// Derive the stable identifier for a chunk from its text and position.
///
/// A pure function: identical inputs always yield the identical id, and any
/// change to the text, source, or index changes it.
pub fn content_address(text: &str, source_id: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(source_id.as_bytes());
    hasher.update(chunk_index.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute cosine similarity between two vectors.
///
/// Normalizes defensively at comparison time rather than assuming stored
/// vectors are unit length. Returns `0.0` for empty vectors, length
/// mismatches, or a near-zero denominator.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Persistent store of embedded chunks, queried by cosine similarity.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
    snapshot_path: PathBuf,
}

impl VectorIndex {
    /// Open (or create) an index in the given storage directory.
    ///
    /// The directory is created if absent. An existing `index.json`
    /// snapshot is loaded, so previously ingested entries remain queryable
    /// across process restarts.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Storage(format!(
                "cannot create storage directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        let entries: Vec<IndexEntry> = if snapshot_path.exists() {
            let content = std::fs::read_to_string(&snapshot_path).map_err(|e| {
                Error::Storage(format!("cannot read {}: {}", snapshot_path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("corrupt snapshot {}: {}", snapshot_path.display(), e))
            })?
        } else {
            Vec::new()
        };

        let positions = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        info!(
            dir = %dir.display(),
            entries = entries.len(),
            "opened vector index"
        );

        Ok(Self {
            entries,
            positions,
            snapshot_path,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed and store chunks, overwriting entries with matching ids.
    ///
    /// All chunk texts are embedded as one batch (a single round trip for
    /// remote providers). Each entry is written atomically, the full tuple
    /// or nothing, but the batch as a whole is not transactional: a
    /// failure aborts the remaining batch and surfaces to the caller.
    /// An overwrite keeps the entry's original position, so tie order under
    /// re-ingestion is unchanged. Returns the number of chunks stored.
    pub async fn upsert(
        &mut self,
        chunks: &[Chunk],
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_many(&texts).await?;

        let now = chrono::Utc::now();
        for (chunk, vector) in chunks.iter().zip(vectors) {
            let id = content_address(
                &chunk.text,
                &chunk.metadata.source_id,
                chunk.metadata.chunk_index,
            );
            let entry = IndexEntry {
                id: id.clone(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                ingested_at: now,
            };

            match self.positions.get(&id).copied() {
                Some(pos) => {
                    debug!(%id, source = %chunk.metadata.source_id, "overwriting entry");
                    self.entries[pos] = entry;
                }
                None => {
                    self.positions.insert(id, self.entries.len());
                    self.entries.push(entry);
                }
            }
        }

        self.save()?;
        Ok(chunks.len())
    }

    /// Embed the question and return the `k` most similar stored chunks.
    ///
    /// Results are ordered by descending cosine similarity, ties broken by
    /// original insertion order (stable sort). Fewer than `k` entries
    /// returns all of them; an empty index returns an empty sequence
    /// without error.
    pub async fn query(
        &self,
        question: &str,
        provider: &dyn EmbeddingProvider,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = provider.embed_one(question).await?;

        let mut results: Vec<RetrievedChunk> = self
            .entries
            .iter()
            .map(|entry| RetrievedChunk {
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    /// Write the snapshot via a temp file + rename.
    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| Error::Storage(format!("cannot serialize index: {}", e)))?;

        let tmp_path = self.snapshot_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| Error::Storage(format!("cannot write {}: {}", tmp_path.display(), e)))?;
        std::fs::rename(&tmp_path, &self.snapshot_path).map_err(|e| {
            Error::Storage(format!(
                "cannot replace {}: {}",
                self.snapshot_path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hash::HashEmbedder;
    use crate::models::ChunkMetadata;

    fn chunk(text: &str, source_id: &str, chunk_index: usize) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source_id: source_id.to_string(),
                chunk_index,
                chunk_size: text.chars().count(),
            },
        }
    }

    #[test]
    fn content_address_is_pure() {
        let a = content_address("some text", "doc.pdf", 0);
        let b = content_address("some text", "doc.pdf", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn content_address_depends_on_index_and_source() {
        let base = content_address("some text", "doc.pdf", 0);
        assert_ne!(base, content_address("some text", "doc.pdf", 1));
        assert_ne!(base, content_address("some text", "other.pdf", 0));
        assert_ne!(base, content_address("other text", "doc.pdf", 0));
    }

    #[test]
    fn cosine_identical_and_orthogonal() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);

        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_normalizes_unnormalized_inputs() {
        let a = vec![2.0, 0.0];
        let b = vec![7.5, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::open(tmp.path()).unwrap();
        let provider = HashEmbedder::new(64);

        let chunks = vec![chunk("retrieval is fun", "doc.pdf", 0)];
        index.upsert(&chunks, &provider).await.unwrap();
        index.upsert(&chunks, &provider).await.unwrap();

        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn query_ranks_by_similarity() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::open(tmp.path()).unwrap();
        let provider = HashEmbedder::new(256);

        let chunks = vec![
            chunk("the cat sat on the mat", "a.pdf", 0),
            chunk("rust memory safety and borrowing", "a.pdf", 1),
            chunk("completely unrelated gardening advice", "b.pdf", 0),
        ];
        index.upsert(&chunks, &provider).await.unwrap();

        let results = index
            .query("rust memory safety and borrowing", &provider, 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "rust memory safety and borrowing");
        assert!((results[0].score - 1.0).abs() < 1e-5);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn query_respects_k_and_index_size() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::open(tmp.path()).unwrap();
        let provider = HashEmbedder::new(64);

        let chunks = vec![
            chunk("one", "a.pdf", 0),
            chunk("two", "a.pdf", 1),
            chunk("three", "a.pdf", 2),
        ];
        index.upsert(&chunks, &provider).await.unwrap();

        let results = index.query("one", &provider, 2).await.unwrap();
        assert_eq!(results.len(), 2);

        let results = index.query("one", &provider, 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::open(tmp.path()).unwrap();
        let provider = HashEmbedder::new(64);

        // Identical text in two sources embeds to identical vectors.
        let chunks = vec![
            chunk("same words here", "first.pdf", 0),
            chunk("same words here", "second.pdf", 0),
        ];
        index.upsert(&chunks, &provider).await.unwrap();

        let results = index.query("same words here", &provider, 2).await.unwrap();
        assert_eq!(results[0].metadata.source_id, "first.pdf");
        assert_eq!(results[1].metadata.source_id, "second.pdf");
    }

    #[tokio::test]
    async fn empty_index_returns_empty_results() {
        let tmp = tempfile::tempdir().unwrap();
        let index = VectorIndex::open(tmp.path()).unwrap();
        let provider = HashEmbedder::new(64);

        let results = index.query("anything", &provider, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = HashEmbedder::new(64);

        {
            let mut index = VectorIndex::open(tmp.path()).unwrap();
            let chunks = vec![chunk("persisted content", "doc.pdf", 0)];
            index.upsert(&chunks, &provider).await.unwrap();
        }

        let index = VectorIndex::open(tmp.path()).unwrap();
        assert_eq!(index.len(), 1);

        let results = index.query("persisted content", &provider, 5).await.unwrap();
        assert_eq!(results[0].text, "persisted content");
    }
}
