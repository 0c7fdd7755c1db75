//! OpenAI-compatible embeddings endpoint.

pub mod client;
pub mod types;
