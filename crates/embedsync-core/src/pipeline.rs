//! The incremental embedding pipeline.
//!
//! One call to [`EmbeddingPipeline::run`] is one full pass:
//!
//! 1. ensure the destination table exists
//! 2. open the stream of pending rows (anti-join against the destination)
//! 3. drain it in chunks, embedding each chunk with one provider request
//! 4. pack every vector to the run's fixed width
//! 5. insert the chunk's destination rows, then move to the next chunk
//!
//! Any error stops the run. Chunks already written stay written; the failed
//! chunk's rows are still pending and get picked up by the next run.

use chrono::Utc;

use embedsync_types::config::BatchConfig;
use embedsync_types::error::PipelineError;
use embedsync_types::row::{DestinationRow, SourceRow};
use embedsync_types::run::{RunSummary, StoreStatus};

use crate::batch::BatchFetcher;
use crate::embedder::{EmbeddingProvider, order_by_index};
use crate::packer::BinaryPacker;
use crate::store::EmbeddingStore;
use crate::text::normalize_text;

/// Sequential select -> embed -> pack -> insert loop over one table pair.
pub struct EmbeddingPipeline<S, P> {
    store: S,
    provider: P,
    model: String,
    batch: BatchConfig,
}

impl<S, P> EmbeddingPipeline<S, P>
where
    S: EmbeddingStore,
    P: EmbeddingProvider,
{
    pub fn new(store: S, provider: P, model: impl Into<String>, batch: BatchConfig) -> Self {
        Self {
            store,
            provider,
            model: model.into(),
            batch,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one full pass over the pending rows.
    #[tracing::instrument(
        name = "embedding_run",
        skip(self),
        fields(model = %self.model, limit = self.batch.limit, batch_size = self.batch.batch_size)
    )]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.store.ensure_schema().await?;

        let pending = self.store.pending_rows(self.batch.limit).await?;
        let mut fetcher = BatchFetcher::new(pending, self.batch.batch_size, self.batch.limit);
        let mut packer = match self.batch.expected_dimensions {
            Some(width) => BinaryPacker::with_width(width),
            None => BinaryPacker::new(),
        };

        let mut summary = RunSummary::default();
        loop {
            let rows = fetcher.next_batch().await?;
            if rows.is_empty() {
                break;
            }
            let tokens = self
                .embed_and_write(summary.batches, &rows, &mut packer)
                .await?;
            summary.batches += 1;
            summary.rows_written += rows.len();
            summary.total_tokens += tokens;
        }
        summary.dimensions = packer.width();

        if summary.rows_written == 0 {
            tracing::info!("no pending rows; nothing to embed");
        } else {
            tracing::info!(
                batches = summary.batches,
                rows_written = summary.rows_written,
                total_tokens = summary.total_tokens,
                dimensions = ?summary.dimensions,
                "embedding run complete"
            );
        }
        Ok(summary)
    }

    /// Pending and embedded counts, after making sure the destination exists.
    pub async fn status(&self) -> Result<StoreStatus, PipelineError> {
        self.store.ensure_schema().await?;
        Ok(self.store.status().await?)
    }

    /// Embed one chunk and persist it. Returns the tokens billed.
    ///
    /// Nothing is written unless every vector of the chunk packs cleanly.
    async fn embed_and_write(
        &self,
        batch_number: usize,
        rows: &[SourceRow],
        packer: &mut BinaryPacker,
    ) -> Result<u64, PipelineError> {
        let inputs: Vec<String> = rows.iter().map(|row| normalize_text(&row.text)).collect();
        tracing::debug!(batch = batch_number, size = rows.len(), "requesting embeddings");

        let response = self.provider.embed(&inputs, &self.model).await?;
        let items = order_by_index(response.items, rows.len())?;

        let usage_tokens_batch = i64::try_from(response.total_tokens).unwrap_or(i64::MAX);
        let created_at = Utc::now();
        let mut destination = Vec::with_capacity(rows.len());
        for (row, item) in rows.iter().zip(items) {
            destination.push(DestinationRow {
                key: row.key.clone(),
                embedding: packer.pack(&item.embedding)?,
                batch_index: item.index as i64,
                usage_tokens_batch,
                created_at,
                model: self.model.clone(),
            });
        }

        let written = self.store.insert_embeddings(&destination).await?;
        tracing::info!(
            batch = batch_number,
            rows = written,
            tokens = response.total_tokens,
            "batch written"
        );
        Ok(response.total_tokens)
    }
}
