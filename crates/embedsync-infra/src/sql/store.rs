//! SQL implementation of the `EmbeddingStore` port.
//!
//! Reads go through the reader pool, DDL and inserts through the writer pool.

use futures_util::{StreamExt, TryStreamExt};
use sqlx::any::AnyRow;
use sqlx::{Any, QueryBuilder, Row};

use embedsync_core::store::{EmbeddingStore, PendingRows};
use embedsync_types::config::TableConfig;
use embedsync_types::error::StoreError;
use embedsync_types::row::{DestinationRow, SourceRow};
use embedsync_types::run::StoreStatus;

use super::pool::DatabasePool;
use super::statements::Statements;

/// Rows per INSERT statement. Six binds per row keeps every statement under
/// SQLite's 32766 bind-parameter ceiling; larger batches are split inside
/// one transaction.
const MAX_ROWS_PER_STATEMENT: usize = 5000;

/// Source/destination table pair behind a [`DatabasePool`].
pub struct SqlEmbeddingStore {
    pool: DatabasePool,
    statements: Statements,
}

impl SqlEmbeddingStore {
    pub fn new(pool: DatabasePool, tables: &TableConfig) -> Self {
        Self {
            pool,
            statements: Statements::new(tables),
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn query_error(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// Keys are copied into a text column; integer keys are rendered in decimal.
fn decode_key(row: &AnyRow) -> Result<String, StoreError> {
    if let Ok(key) = row.try_get::<String, _>(0) {
        return Ok(key);
    }
    if let Ok(key) = row.try_get::<i64, _>(0) {
        return Ok(key.to_string());
    }
    row.try_get::<f64, _>(0)
        .map(|key| key.to_string())
        .map_err(|e| StoreError::Decode(format!("unsupported key column type: {e}")))
}

fn decode_source_row(row: &AnyRow) -> Result<SourceRow, StoreError> {
    let key = decode_key(row)?;
    let text: String = row
        .try_get(1)
        .map_err(|e| StoreError::Decode(format!("text column for key {key}: {e}")))?;
    Ok(SourceRow { key, text })
}

fn format_timestamp(row: &DestinationRow) -> String {
    row.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// EmbeddingStore implementation
// ---------------------------------------------------------------------------

impl EmbeddingStore for SqlEmbeddingStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&self.statements.create_destination)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn pending_rows(&self, limit: u64) -> Result<PendingRows, StoreError> {
        let reader = self.pool.reader.clone();
        let sql = self.statements.select_pending.clone();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let stream = async_stream::stream! {
            let mut rows = sqlx::query(&sql).bind(limit).fetch(&reader);
            loop {
                let next: Result<SourceRow, StoreError> = match rows.try_next().await {
                    Ok(Some(row)) => decode_source_row(&row),
                    Ok(None) => break,
                    Err(e) => Err(query_error(e)),
                };
                let failed = next.is_err();
                yield next;
                if failed {
                    break;
                }
            }
        };
        Ok(stream.boxed())
    }

    async fn insert_embeddings(&self, rows: &[DestinationRow]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;
        let mut written = 0u64;
        for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Any> =
                QueryBuilder::new(self.statements.insert_prefix.as_str());
            builder.push_values(chunk, |mut values, row| {
                values
                    .push_bind(row.key.clone())
                    .push_bind(row.embedding.clone())
                    .push_bind(row.batch_index)
                    .push_bind(row.usage_tokens_batch)
                    .push_bind(format_timestamp(row))
                    .push_bind(row.model.clone());
            });
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            written += result.rows_affected();
        }
        tx.commit().await.map_err(query_error)?;

        tracing::debug!(rows = written, "inserted destination rows");
        Ok(written)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let pending: i64 = sqlx::query_scalar(&self.statements.count_pending)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        let embedded: i64 = sqlx::query_scalar(&self.statements.count_embedded)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(StoreStatus {
            pending: pending.max(0) as u64,
            embedded: embedded.max(0) as u64,
        })
    }
}
