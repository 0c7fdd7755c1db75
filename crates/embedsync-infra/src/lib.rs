//! Infrastructure implementations for embedsync.
//!
//! - [`sql`]: `sqlx` reader/writer pools and the SQL-backed `EmbeddingStore`
//! - [`openai`]: OpenAI-compatible HTTP `EmbeddingProvider`

pub mod openai;
pub mod sql;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
