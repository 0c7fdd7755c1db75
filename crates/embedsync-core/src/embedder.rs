//! Embedding provider trait and result alignment.
//!
//! Implementations (e.g., the OpenAI-compatible HTTP client) live in
//! embedsync-infra.

use embedsync_types::embedding::{EmbeddingBatch, EmbeddingItem};
use embedsync_types::error::EmbeddingError;

/// Trait for turning a batch of texts into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `inputs` with `model` in a single request.
    ///
    /// Each returned item carries the position of its input; items may come
    /// back in any order.
    fn embed(
        &self,
        inputs: &[String],
        model: &str,
    ) -> impl std::future::Future<Output = Result<EmbeddingBatch, EmbeddingError>> + Send;
}

/// Sort provider items by their reported index and check that they map
/// one-to-one onto `expected` inputs.
///
/// After this returns, item `i` belongs to input `i`.
pub fn order_by_index(
    mut items: Vec<EmbeddingItem>,
    expected: usize,
) -> Result<Vec<EmbeddingItem>, EmbeddingError> {
    if items.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: items.len(),
        });
    }

    items.sort_by_key(|item| item.index);
    if items.iter().enumerate().any(|(pos, item)| item.index != pos) {
        return Err(EmbeddingError::IndexMismatch {
            expected,
            indices: items.iter().map(|item| item.index).collect(),
        });
    }

    Ok(items)
}
