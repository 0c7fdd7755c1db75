//! Incremental embedding pipeline for embedsync.
//!
//! This crate defines the ports (`EmbeddingStore`, `EmbeddingProvider`) that
//! the infrastructure layer implements, plus everything between them: batch
//! fetching, text normalization, result alignment, binary packing and the
//! pipeline loop. It depends only on `embedsync-types` -- never on
//! `embedsync-infra` or any database/HTTP crate.

pub mod batch;
pub mod embedder;
pub mod packer;
pub mod pipeline;
pub mod store;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;
