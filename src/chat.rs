//! Answer composition via the Anthropic messages API.
//!
//! The retrieval pipeline never generates natural-language answers itself;
//! when a chat provider is configured, this client receives the question
//! and the retrieved chunks, formats them as a context block, and asks the
//! model to answer with citations. Transient failures retry through
//! [`RetryPolicy`]; everything else converts immediately to
//! [`Error::AnswerGeneration`].

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::models::RetrievedChunk;
use crate::retry::RetryPolicy;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that answers questions based on \
the provided context. Always cite your sources using the chunk information provided. \
If you cannot answer the question based on the context, say so.";

/// One prior conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// Client for the Anthropic messages API.
#[derive(Debug)]
pub struct ChatClient {
    model: String,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ChatClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `ANTHROPIC_API_KEY` is not set
    /// or the HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            Error::Configuration("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
            client,
            retry: RetryPolicy::new(config.max_attempts),
        })
    }

    /// Answer a question from retrieved context, with optional prior turns.
    pub async fn answer(
        &self,
        question: &str,
        context_chunks: &[RetrievedChunk],
        history: &[ChatMessage],
    ) -> Result<String> {
        let context = format_context(context_chunks);

        let mut messages: Vec<ChatMessage> = history.to_vec();
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: format!(
                "Context:\n{}\n\nQuestion: {}\n\nPlease answer the question based on the \
                 context above. Include source citations in your answer.",
                context, question
            ),
        });

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": messages,
        });

        let mut last_err = None;

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
            }

            let resp = self
                .client
                .post(MESSAGES_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: MessagesResponse = response.json().await.map_err(|e| {
                            Error::AnswerGeneration(format!("invalid messages response: {}", e))
                        })?;
                        return parsed
                            .content
                            .into_iter()
                            .next()
                            .map(|block| block.text)
                            .ok_or_else(|| {
                                Error::AnswerGeneration("empty messages response".to_string())
                            });
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if self.retry.is_retryable(status) {
                        warn!(attempt, %status, "chat request failed, will retry");
                        last_err = Some(format!("messages API error {}: {}", status, body_text));
                        continue;
                    }

                    error!(%status, "chat request failed");
                    return Err(Error::AnswerGeneration(format!(
                        "messages API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    warn!(attempt, error = %e, "chat request failed, will retry");
                    last_err = Some(e.to_string());
                    continue;
                }
            }
        }

        error!(
            attempts = self.retry.max_attempts,
            "answer generation failed after retries"
        );
        Err(Error::AnswerGeneration(
            last_err.unwrap_or_else(|| "answer generation failed after retries".to_string()),
        ))
    }
}

/// Format retrieved chunks as a context block, one source header per chunk.
fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "Source: {} (Chunk {})\n{}\n",
                chunk.metadata.source_id, chunk.metadata.chunk_index, chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
