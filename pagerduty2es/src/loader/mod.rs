//! Loader module for the exporter.
//!
//! Consumer side of the scrape pipeline: accumulates mapped operations
//! into fixed-size batches and writes each batch with one bulk request,
//! retrying the whole batch with a fixed delay until the configured
//! attempts are spent. A partial batch left at stream end is still
//! flushed; every consumed operation lands in exactly one batch, in
//! arrival order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::errors::PipelineError;
use crate::metrics::ExporterMetrics;
use pagerduty2es_repository::{BulkIndexStore, BulkOperation};

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per bulk request.
    pub batch_count: usize,
    /// Attempts per batch before the failure becomes fatal.
    pub retry_count: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_count: 50,
            retry_count: 5,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Loader that writes batches into the index store.
pub struct BulkLoader {
    store: Arc<dyn BulkIndexStore>,
    config: LoaderConfig,
    pending: Vec<BulkOperation>,
    metrics: Arc<ExporterMetrics>,
}

impl BulkLoader {
    /// Create a new loader.
    pub fn new(
        store: Arc<dyn BulkIndexStore>,
        config: LoaderConfig,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        let batch_count = config.batch_count.max(1);
        Self {
            store,
            config: LoaderConfig {
                batch_count,
                ..config
            },
            pending: Vec::with_capacity(batch_count),
            metrics,
        }
    }

    /// Consume the pipeline queue until the producer closes it, then
    /// flush the remaining partial batch.
    pub async fn drain(
        mut self,
        mut rx: mpsc::Receiver<BulkOperation>,
    ) -> Result<(), PipelineError> {
        while let Some(operation) = rx.recv().await {
            self.push(operation).await?;
        }
        self.flush().await
    }

    /// Buffer one operation, flushing when the batch threshold is reached.
    pub async fn push(&mut self, operation: BulkOperation) -> Result<(), PipelineError> {
        self.pending.push(operation);
        if self.pending.len() >= self.config.batch_count {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write the pending batch, retrying the whole batch on failure.
    ///
    /// Counting convention: every attempt increments the attempts counter,
    /// and every failed attempt (including the final one) increments the
    /// retries counter. Exhaustion is fatal.
    #[instrument(skip(self), fields(pending = self.pending.len()))]
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let batch: Vec<BulkOperation> = self.pending.drain(..).collect();
        let max_attempts = self.config.retry_count.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.metrics.record_index_attempt();

            match self.store.bulk_index(&batch).await {
                Ok(()) => {
                    debug!(count = batch.len(), attempt, "Indexed batch");
                    return Ok(());
                }
                Err(e) => {
                    self.metrics.record_index_retry();
                    if attempt >= max_attempts {
                        return Err(PipelineError::IndexingExhausted {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Bulk request failed, retrying batch"
                    );
                    sleep(self.config.retry_delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pagerduty2es_repository::StoreError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Mock store that records batches and fails a configured number of
    /// leading attempts.
    struct MockStore {
        batches: Mutex<Vec<Vec<String>>>,
        failures_remaining: AtomicU32,
    }

    impl MockStore {
        fn new() -> Self {
            Self::failing(0)
        }

        fn failing(failures: u32) -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                failures_remaining: AtomicU32::new(failures),
            }
        }

        fn batches(&self) -> Vec<Vec<String>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BulkIndexStore for MockStore {
        async fn bulk_index(&self, operations: &[BulkOperation]) -> Result<(), StoreError> {
            if self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::transport("injected failure"));
            }
            self.batches
                .lock()
                .unwrap()
                .push(operations.iter().map(|o| o.document_id.clone()).collect());
            Ok(())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn operation(id: usize) -> BulkOperation {
        BulkOperation {
            index: "pagerduty".to_string(),
            document_id: format!("incident-P{id}"),
            body: json!({"n": id}),
        }
    }

    fn config(batch_count: usize, retry_count: u32) -> LoaderConfig {
        LoaderConfig {
            batch_count,
            retry_count,
            retry_delay: Duration::from_millis(1),
        }
    }

    async fn drain_operations(
        store: Arc<MockStore>,
        config: LoaderConfig,
        metrics: Arc<ExporterMetrics>,
        count: usize,
    ) -> Result<(), PipelineError> {
        let loader = BulkLoader::new(store, config, metrics);
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(loader.drain(rx));
        for id in 0..count {
            tx.send(operation(id)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap()
    }

    #[tokio::test]
    async fn test_batches_split_at_threshold_preserving_order() {
        let store = Arc::new(MockStore::new());
        let metrics = Arc::new(ExporterMetrics::new().unwrap());

        drain_operations(store.clone(), config(3, 5), metrics, 7)
            .await
            .unwrap();

        let batches = store.batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 1);

        let flattened: Vec<String> = batches.into_iter().flatten().collect();
        let expected: Vec<String> = (0..7).map(|id| format!("incident-P{id}")).collect();
        assert_eq!(flattened, expected);
    }

    #[tokio::test]
    async fn test_exact_multiple_leaves_no_partial_batch() {
        let store = Arc::new(MockStore::new());
        let metrics = Arc::new(ExporterMetrics::new().unwrap());

        drain_operations(store.clone(), config(3, 5), metrics, 6)
            .await
            .unwrap();

        let batches = store.batches();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|batch| batch.len() == 3));
    }

    #[tokio::test]
    async fn test_retry_until_success_counts_attempts_and_retries() {
        let store = Arc::new(MockStore::failing(2));
        let metrics = Arc::new(ExporterMetrics::new().unwrap());

        drain_operations(store.clone(), config(10, 5), metrics.clone(), 2)
            .await
            .unwrap();

        // Failed on attempts 1 and 2, succeeded on attempt 3.
        assert_eq!(metrics.index_attempt_count(), 3);
        assert_eq!(metrics.index_retry_count(), 2);
        assert_eq!(store.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_fatal() {
        let store = Arc::new(MockStore::failing(u32::MAX));
        let metrics = Arc::new(ExporterMetrics::new().unwrap());

        let result = drain_operations(store, config(10, 3), metrics.clone(), 1).await;

        assert!(matches!(
            result,
            Err(PipelineError::IndexingExhausted { attempts: 3, .. })
        ));
        assert_eq!(metrics.index_attempt_count(), 3);
        assert_eq!(metrics.index_retry_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_stream_flushes_nothing() {
        let store = Arc::new(MockStore::new());
        let metrics = Arc::new(ExporterMetrics::new().unwrap());

        drain_operations(store.clone(), config(3, 5), metrics.clone(), 0)
            .await
            .unwrap();

        assert!(store.batches().is_empty());
        assert_eq!(metrics.index_attempt_count(), 0);
    }
}
