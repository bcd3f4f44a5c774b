//! Remote embedding provider backed by the OpenAI embeddings API.
//!
//! Submits a whole batch of texts as one `POST /v1/embeddings` request and
//! retries transient failures (HTTP 429, 5xx, network errors) with
//! exponential backoff via [`RetryPolicy`]. The API credential must be
//! present at construction time; a missing key is a configuration error,
//! not a deferred failure.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, warn};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Embedding provider using the OpenAI API.
#[derive(Debug)]
pub struct OpenAiEmbedder {
    model: String,
    dims: usize,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `OPENAI_API_KEY` is not set or
    /// the HTTP client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
            api_key,
            client,
            retry: RetryPolicy::new(config.max_attempts),
        })
    }

    /// One batched request with retry/backoff, returning vectors in input
    /// order.
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
            }

            let resp = self
                .client
                .post(EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
                            Error::Embedding(format!("invalid embeddings response: {}", e))
                        })?;
                        return self.collect_vectors(parsed, texts.len());
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if self.retry.is_retryable(status) {
                        warn!(attempt, %status, "embedding request failed, will retry");
                        last_err = Some(format!("embeddings API error {}: {}", status, body_text));
                        continue;
                    }

                    error!(%status, "embedding request failed");
                    return Err(Error::Embedding(format!(
                        "embeddings API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    warn!(attempt, error = %e, "embedding request failed, will retry");
                    last_err = Some(e.to_string());
                    continue;
                }
            }
        }

        error!(
            attempts = self.retry.max_attempts,
            "embedding failed after retries"
        );
        Err(Error::Embedding(
            last_err.unwrap_or_else(|| "embedding failed after retries".to_string()),
        ))
    }

    /// Order response vectors by their `index` field and validate shape.
    fn collect_vectors(
        &self,
        parsed: EmbeddingsResponse,
        expected: usize,
    ) -> Result<Vec<Vec<f32>>> {
        if parsed.data.len() != expected {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                expected,
                parsed.data.len()
            )));
        }

        let mut ordered: Vec<Option<Vec<f32>>> = vec![None; expected];
        for item in parsed.data {
            if item.embedding.len() != self.dims {
                return Err(Error::Embedding(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dims,
                    item.embedding.len()
                )));
            }
            match ordered.get_mut(item.index) {
                Some(slot) => *slot = Some(item.embedding),
                None => {
                    return Err(Error::Embedding(format!(
                        "embedding index {} out of range",
                        item.index
                    )))
                }
            }
        }

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| Error::Embedding(format!("missing embedding at index {}", i)))
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }
}
