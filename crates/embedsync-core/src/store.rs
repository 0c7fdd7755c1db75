//! Store trait definition (port).
//!
//! Implementations live in embedsync-infra (e.g., `SqlEmbeddingStore`).
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use futures_util::stream::BoxStream;

use embedsync_types::error::StoreError;
use embedsync_types::row::{DestinationRow, SourceRow};
use embedsync_types::run::StoreStatus;

/// Stream of source rows that have no destination row yet.
///
/// Owned (`'static`) so the pipeline can keep draining it while writing
/// results through the same store.
pub type PendingRows = BoxStream<'static, Result<SourceRow, StoreError>>;

/// Access to the source table and the destination table of one run.
pub trait EmbeddingStore: Send + Sync {
    /// Create the destination table if it does not exist. Idempotent.
    fn ensure_schema(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Source rows whose key is absent from the destination table, at most `limit`.
    ///
    /// No ordering is guaranteed.
    fn pending_rows(
        &self,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<PendingRows, StoreError>> + Send;

    /// Insert all rows of one batch. Returns the number of rows written.
    fn insert_embeddings(
        &self,
        rows: &[DestinationRow],
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Pending and embedded row counts.
    fn status(&self) -> impl std::future::Future<Output = Result<StoreStatus, StoreError>> + Send;
}
