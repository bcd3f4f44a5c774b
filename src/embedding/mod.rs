//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and two interchangeable backends:
//!
//! - **[`hash::HashEmbedder`]**: deterministic, offline, hash-based vectors.
//! - **[`openai::OpenAiEmbedder`]**: calls the OpenAI embeddings API with
//!   batching, retry, and backoff.
//!
//! Use [`create_provider`] to instantiate the backend named in the
//! configuration. Both variants produce vectors of one fixed dimension per
//! provider instance.

pub mod hash;
pub mod openai;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for embedding providers.
///
/// `embed_many` is a true batch operation: backends that support batched
/// requests submit the whole slice in one call rather than looping the
/// single-text path.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Create the provider named in the configuration.
///
/// | Config value | Provider |
/// |--------------|----------|
/// | `"hash"`     | [`hash::HashEmbedder`] |
/// | `"openai"`   | [`openai::OpenAiEmbedder`] |
///
/// # Errors
///
/// Unknown provider names and a missing API credential for the OpenAI
/// provider are configuration errors.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "hash" => Ok(Box::new(hash::HashEmbedder::new(config.dims))),
        "openai" => Ok(Box::new(openai::OpenAiEmbedder::new(config)?)),
        other => Err(Error::Configuration(format!(
            "unknown embedding provider: '{}'. Must be hash or openai.",
            other
        ))),
    }
}

/// Scale a vector to unit L2 norm in place.
///
/// The zero vector is left untouched (division-by-zero guard); callers get
/// it back as all-zero rather than NaN.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
