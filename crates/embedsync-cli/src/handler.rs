//! Invocation entry point: one full pipeline pass per call.
//!
//! Wires the concrete SQL store and HTTP client into the core pipeline.
//! Connections are opened per invocation and closed before returning.

use serde::Deserialize;

use embedsync_core::pipeline::EmbeddingPipeline;
use embedsync_infra::openai::client::OpenAiEmbeddingClient;
use embedsync_infra::sql::pool::DatabasePool;
use embedsync_infra::sql::store::SqlEmbeddingStore;
use embedsync_types::config::PipelineConfig;
use embedsync_types::error::PipelineError;
use embedsync_types::run::{RunSummary, StoreStatus};

/// Payload the scheduler passed to the invocation. Not interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct InvocationEvent(pub serde_json::Value);

/// Metadata about the current invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    /// Context for a run started from the command line.
    pub fn local() -> Self {
        Self {
            request_id: format!("local-{}", std::process::id()),
        }
    }
}

type ConcretePipeline = EmbeddingPipeline<SqlEmbeddingStore, OpenAiEmbeddingClient>;

async fn build_pipeline(config: &PipelineConfig) -> Result<ConcretePipeline, PipelineError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let store = SqlEmbeddingStore::new(pool, &config.tables);
    let client = OpenAiEmbeddingClient::new(&config.provider)?;
    Ok(EmbeddingPipeline::new(
        store,
        client,
        config.provider.model.clone(),
        config.batch.clone(),
    ))
}

/// Embed every pending row up to the configured limit.
///
/// Errors propagate to the caller; rows of a failed batch stay pending.
#[tracing::instrument(name = "invocation", skip_all, fields(request_id = %context.request_id))]
pub async fn handler(
    event: &InvocationEvent,
    context: &InvocationContext,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    tracing::debug!(event = %event.0, "invocation received");

    let pipeline = build_pipeline(config).await?;
    let result = pipeline.run().await;
    pipeline.store().pool().close().await;
    result
}

/// Pending and embedded row counts for the configured table pair.
pub async fn store_status(config: &PipelineConfig) -> Result<StoreStatus, PipelineError> {
    let pipeline = build_pipeline(config).await?;
    let result = pipeline.status().await;
    pipeline.store().pool().close().await;
    result
}
