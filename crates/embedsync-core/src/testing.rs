//! In-memory store and scripted provider used by the pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;
use futures_util::stream;

use embedsync_types::embedding::{EmbeddingBatch, EmbeddingItem};
use embedsync_types::error::{EmbeddingError, StoreError};
use embedsync_types::row::{DestinationRow, SourceRow};
use embedsync_types::run::StoreStatus;

use crate::embedder::EmbeddingProvider;
use crate::store::{EmbeddingStore, PendingRows};

/// Source and destination tables held in memory.
#[derive(Default)]
pub(crate) struct MemoryStore {
    source: Mutex<Vec<SourceRow>>,
    destination: Mutex<Vec<DestinationRow>>,
    schema_calls: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with_rows(rows: Vec<SourceRow>) -> Self {
        Self {
            source: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub(crate) fn numbered(n: usize) -> Self {
        Self::with_rows(
            (0..n)
                .map(|i| SourceRow::new(format!("r{i}"), format!("review number {i}")))
                .collect(),
        )
    }

    pub(crate) fn add_source(&self, row: SourceRow) {
        self.source.lock().unwrap().push(row);
    }

    pub(crate) fn destination(&self) -> Vec<DestinationRow> {
        self.destination.lock().unwrap().clone()
    }

    pub(crate) fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }

    fn embedded_keys(&self) -> HashSet<String> {
        self.destination
            .lock()
            .unwrap()
            .iter()
            .map(|row| row.key.clone())
            .collect()
    }
}

impl EmbeddingStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pending_rows(&self, limit: u64) -> Result<PendingRows, StoreError> {
        let done = self.embedded_keys();
        let pending: Vec<Result<SourceRow, StoreError>> = self
            .source
            .lock()
            .unwrap()
            .iter()
            .filter(|row| !done.contains(&row.key))
            .take(limit as usize)
            .cloned()
            .map(Ok)
            .collect();
        Ok(stream::iter(pending).boxed())
    }

    async fn insert_embeddings(&self, rows: &[DestinationRow]) -> Result<u64, StoreError> {
        self.destination.lock().unwrap().extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let done = self.embedded_keys();
        let pending = self
            .source
            .lock()
            .unwrap()
            .iter()
            .filter(|row| !done.contains(&row.key))
            .count();
        Ok(StoreStatus {
            pending: pending as u64,
            embedded: self.destination.lock().unwrap().len() as u64,
        })
    }
}

/// Provider returning deterministic vectors and recording every request.
pub(crate) struct ScriptedProvider {
    dims_per_call: Vec<usize>,
    vectors: HashMap<String, Vec<f32>>,
    reverse: bool,
    drop_last: bool,
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<(Vec<String>, String)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            dims_per_call: vec![dims],
            vectors: HashMap::new(),
            reverse: false,
            drop_last: false,
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Use `dims[i]` for call `i`; the last entry repeats.
    pub(crate) fn with_dims_per_call(mut self, dims: Vec<usize>) -> Self {
        self.dims_per_call = dims;
        self
    }

    pub(crate) fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Return items in reverse order (indices still correct).
    pub(crate) fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub(crate) fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub(crate) fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub(crate) fn requests(&self) -> Vec<(Vec<String>, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl EmbeddingProvider for ScriptedProvider {
    async fn embed(&self, inputs: &[String], model: &str) -> Result<EmbeddingBatch, EmbeddingError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((inputs.to_vec(), model.to_string()));
            requests.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(EmbeddingError::Http {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }

        let dims = self
            .dims_per_call
            .get(call)
            .or(self.dims_per_call.last())
            .copied()
            .unwrap_or(1);
        let mut items: Vec<EmbeddingItem> = inputs
            .iter()
            .enumerate()
            .map(|(index, text)| EmbeddingItem {
                index,
                embedding: self
                    .vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| vec![text.len() as f32; dims]),
            })
            .collect();
        if self.reverse {
            items.reverse();
        }
        if self.drop_last {
            items.pop();
        }

        Ok(EmbeddingBatch {
            items,
            total_tokens: inputs.iter().map(|t| t.split_whitespace().count() as u64).sum(),
        })
    }
}
