//! Embedding provider results.

/// One embedding returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingItem {
    /// Position of the corresponding input in the submitted batch.
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// Provider response for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingBatch {
    pub items: Vec<EmbeddingItem>,
    /// Tokens billed for the whole request.
    pub total_tokens: u64,
}
