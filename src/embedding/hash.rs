//! Deterministic hash-based embedding provider.
//!
//! Maps text to a fixed-dimension vector with no network dependency:
//! each whitespace-split word is hashed with SHA-256 and the first four
//! hash bytes are scattered into the vector at positions derived from the
//! hash value, then the vector is L2-normalized.
//!
//! Identical text always yields an identical vector, which makes this
//! provider useful for offline operation and for tests. It is explicitly
//! NOT semantically meaningful: similarity between two hash embeddings
//! reflects exact or near-exact word overlap, nothing more.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{l2_normalize, EmbeddingProvider};
use crate::error::Result;

/// Default dimension, matching common remote embedding sizes so the two
/// provider variants are interchangeable against the same index.
pub const DEFAULT_DIMS: usize = 1536;

/// Offline, deterministic embedding generator.
#[derive(Debug)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];

        for word in text.split_whitespace() {
            let digest = Sha256::digest(word.as_bytes());
            let first = [digest[0], digest[1], digest[2], digest[3]];
            let seed = u32::from_be_bytes(first) as usize;

            for (j, byte) in first.iter().enumerate() {
                vector[(seed + j) % self.dims] += f32::from(*byte) / 255.0;
            }
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMS)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    // There is no cheaper batch request for a local hash; the batch is the
    // per-text computation applied in order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn identical_text_yields_identical_vector() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed_one("the quick brown fox").await.unwrap();
        let b = embedder.embed_one("the quick brown fox").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn non_empty_text_has_unit_norm() {
        let embedder = HashEmbedder::default();
        for text in ["word", "a few more words", "Unicode wörds tøø"] {
            let v = embedder.embed_one(text).await.unwrap();
            assert!((norm(&v) - 1.0).abs() < 1e-6, "norm for {:?}", text);
        }
    }

    #[tokio::test]
    async fn whitespace_only_text_is_zero_vector() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed_one("   \n\t ").await.unwrap();
        assert_eq!(v.len(), DEFAULT_DIMS);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn dimension_is_fixed_per_instance() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(embedder.dims(), 64);
        let vs = embedder
            .embed_many(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();
        assert!(vs.iter().all(|v| v.len() == 64));
    }

    #[tokio::test]
    async fn different_text_yields_different_vector() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed_one("alpha").await.unwrap();
        let b = embedder.embed_one("beta").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn batch_matches_single_calls() {
        let embedder = HashEmbedder::default();
        let texts = vec!["first sentence".to_string(), "second sentence".to_string()];
        let batch = embedder.embed_many(&texts).await.unwrap();
        for (text, batched) in texts.iter().zip(&batch) {
            let single = embedder.embed_one(text).await.unwrap();
            assert_eq!(&single, batched);
        }
    }
}
