//! OpenAiEmbeddingClient -- concrete [`EmbeddingProvider`] for
//! OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed
//! while building the `Authorization` header.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use embedsync_core::embedder::EmbeddingProvider;
use embedsync_types::config::ProviderConfig;
use embedsync_types::embedding::EmbeddingBatch;
use embedsync_types::error::EmbeddingError;

use super::types::{EmbeddingRequest, EmbeddingResponse};

const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(500);

/// HTTP embedding client. One POST per batch.
///
/// Does not derive Debug; the key must never reach log output.
pub struct OpenAiEmbeddingClient {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    max_retries: u32,
    retry_base: Duration,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: SecretString::from(config.api_key.expose_secret().to_string()),
            url: config.url.clone(),
            max_retries: config.max_retries,
            retry_base: DEFAULT_RETRY_BASE,
        })
    }

    /// Override the first backoff delay (tests use a few milliseconds).
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_base * (1u32 << attempt.min(5))
    }

    async fn send_once(&self, inputs: &[String], model: &str) -> Result<EmbeddingBatch, EmbeddingError> {
        let body = EmbeddingRequest { input: inputs, model };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => EmbeddingError::AuthenticationFailed,
                StatusCode::TOO_MANY_REQUESTS => EmbeddingError::RateLimited(error_body),
                _ => EmbeddingError::Http {
                    status: status.as_u16(),
                    body: error_body,
                },
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EmbeddingError::Transport(format!("failed to read response: {e}")))?;
        let parsed: EmbeddingResponse = serde_json::from_slice(&bytes)
            .map_err(|e| EmbeddingError::Deserialization(format!("failed to parse response: {e}")))?;
        Ok(parsed.into())
    }
}

impl EmbeddingProvider for OpenAiEmbeddingClient {
    async fn embed(&self, inputs: &[String], model: &str) -> Result<EmbeddingBatch, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(EmbeddingBatch {
                items: Vec::new(),
                total_tokens: 0,
            });
        }

        let mut attempt = 0u32;
        loop {
            match self.send_once(inputs, model).await {
                Ok(batch) => {
                    tracing::debug!(
                        inputs = inputs.len(),
                        total_tokens = batch.total_tokens,
                        "embedding request succeeded"
                    );
                    return Ok(batch);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "embedding request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
