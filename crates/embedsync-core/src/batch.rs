//! Chunked draining of the pending-row stream.

use futures_util::StreamExt;

use embedsync_types::error::StoreError;
use embedsync_types::row::SourceRow;

use crate::store::PendingRows;

/// Pulls pending rows in chunks of at most `batch_size`, never yielding more
/// than `limit` rows in total.
///
/// An empty chunk means the stream is drained.
pub struct BatchFetcher {
    rows: PendingRows,
    batch_size: usize,
    remaining: u64,
}

impl BatchFetcher {
    pub fn new(rows: PendingRows, batch_size: usize, limit: u64) -> Self {
        Self {
            rows,
            batch_size: batch_size.max(1),
            remaining: limit,
        }
    }

    /// Fetch the next chunk.
    pub async fn next_batch(&mut self) -> Result<Vec<SourceRow>, StoreError> {
        let cap = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(self.batch_size);
        let mut batch = Vec::with_capacity(cap);

        while batch.len() < cap {
            match self.rows.next().await {
                Some(row) => batch.push(row?),
                None => {
                    self.remaining = 0;
                    break;
                }
            }
        }

        self.remaining = self.remaining.saturating_sub(batch.len() as u64);
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn rows(n: usize) -> PendingRows {
        stream::iter((0..n).map(|i| Ok(SourceRow::new(i.to_string(), format!("text {i}"))))).boxed()
    }

    #[tokio::test]
    async fn test_chunks_until_empty() {
        let mut fetcher = BatchFetcher::new(rows(5), 2, 100);
        let sizes = [
            fetcher.next_batch().await.unwrap().len(),
            fetcher.next_batch().await.unwrap().len(),
            fetcher.next_batch().await.unwrap().len(),
            fetcher.next_batch().await.unwrap().len(),
        ];
        assert_eq!(sizes, [2, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_preserves_stream_order() {
        let mut fetcher = BatchFetcher::new(rows(3), 10, 10);
        let keys: Vec<String> = fetcher
            .next_batch()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.key)
            .collect();
        assert_eq!(keys, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_limit_caps_total_rows() {
        let mut fetcher = BatchFetcher::new(rows(10), 3, 5);
        assert_eq!(fetcher.next_batch().await.unwrap().len(), 3);
        assert_eq!(fetcher.next_batch().await.unwrap().len(), 2);
        assert!(fetcher.next_batch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_error_is_propagated() {
        let failing: PendingRows = stream::iter(vec![
            Ok(SourceRow::new("a", "x")),
            Err(StoreError::Decode("bad key".to_string())),
        ])
        .boxed();
        let mut fetcher = BatchFetcher::new(failing, 10, 10);
        let err = fetcher.next_batch().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
