//! Reports produced by a run or a status query.

use serde::Serialize;

/// Outcome of one complete pass over the pending rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Provider requests made.
    pub batches: usize,
    /// Destination rows inserted.
    pub rows_written: usize,
    /// Sum of `usage.total_tokens` across all requests.
    pub total_tokens: u64,
    /// Packing width, if at least one batch ran.
    pub dimensions: Option<usize>,
}

/// Snapshot of how far the destination table lags the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Source rows with text and without a destination row.
    pub pending: u64,
    /// Rows present in the destination table.
    pub embedded: u64,
}
