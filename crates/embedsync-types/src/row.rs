//! Source and destination row shapes.

use chrono::{DateTime, Utc};

/// A source row still waiting for its embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// Source key rendered as text (integer keys in decimal).
    pub key: String,
    /// Text to embed, exactly as stored.
    pub text: String,
}

impl SourceRow {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// One row of the destination table. Written once, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRow {
    pub key: String,
    /// Little-endian f32 blob.
    pub embedding: Vec<u8>,
    /// Position of the row within its provider request.
    pub batch_index: i64,
    /// Tokens billed for the whole request the row belonged to.
    pub usage_tokens_batch: i64,
    pub created_at: DateTime<Utc>,
    pub model: String,
}
