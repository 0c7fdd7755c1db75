//! Wire types for the OpenAI-compatible embeddings endpoint.
//!
//! Unknown response fields are ignored; missing required fields fail
//! deserialization.

use serde::{Deserialize, Serialize};

use embedsync_types::embedding::{EmbeddingBatch, EmbeddingItem};

/// Request body for `POST /v1/embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a [String],
    pub model: &'a str,
}

/// Response body of a successful embeddings call.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    pub usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingUsage {
    pub total_tokens: u64,
}

impl From<EmbeddingResponse> for EmbeddingBatch {
    fn from(response: EmbeddingResponse) -> Self {
        EmbeddingBatch {
            items: response
                .data
                .into_iter()
                .map(|d| EmbeddingItem {
                    index: d.index,
                    embedding: d.embedding,
                })
                .collect(),
            total_tokens: response.usage.total_tokens,
        }
    }
}
