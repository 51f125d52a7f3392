//! Orchestrator module for the exporter.
//!
//! Drives scrape cycles: either exactly one (single-run mode) or a
//! scrape-then-sleep loop that only ends with the process (daemon mode).
//! Each cycle wires the scraper (producer) to a fresh loader (consumer)
//! over a bounded queue whose capacity equals the batch size; the full
//! queue is what throttles fetching to the indexing rate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::loader::{BulkLoader, LoaderConfig};
use crate::metrics::ExporterMetrics;
use crate::scraper::IncidentScraper;
use pagerduty2es_repository::{BulkIndexStore, BulkOperation};

/// Configuration for the scrape scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Lookback window: each cycle scrapes incidents since `now - date_range`.
    pub date_range: chrono::Duration,
    /// Sleep between cycles. `None` selects single-run mode.
    pub interval: Option<Duration>,
}

/// Scheduler that runs scrape cycles.
pub struct ScrapeScheduler {
    scraper: IncidentScraper,
    store: Arc<dyn BulkIndexStore>,
    loader_config: LoaderConfig,
    config: SchedulerConfig,
    metrics: Arc<ExporterMetrics>,
}

impl ScrapeScheduler {
    /// Create a new scheduler.
    pub fn new(
        scraper: IncidentScraper,
        store: Arc<dyn BulkIndexStore>,
        loader_config: LoaderConfig,
        config: SchedulerConfig,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            scraper,
            store,
            loader_config,
            config,
            metrics,
        }
    }

    /// Run the scheduler.
    ///
    /// In daemon mode this never returns `Ok`: it loops until a cycle
    /// fails, and a failure is fatal to the process. In single-run mode it
    /// returns after one cycle.
    pub async fn run(&self) -> Result<(), PipelineError> {
        match self.config.interval {
            Some(interval) => loop {
                self.run_cycle().await?;
                debug!(seconds = interval.as_secs(), "Sleeping until next scrape");
                sleep(interval).await;
            },
            None => self.run_cycle().await,
        }
    }

    /// Run one scrape cycle end to end.
    ///
    /// The producer closes the queue by dropping the sender once
    /// pagination ends; the consumer drains what is buffered, flushes the
    /// final partial batch, and only then is the cycle's duration
    /// recorded.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<(), PipelineError> {
        info!("Starting scrape cycle");
        let started = Instant::now();
        let since = Utc::now() - self.config.date_range;

        let (tx, rx) = mpsc::channel::<BulkOperation>(self.loader_config.batch_count.max(1));

        let loader = BulkLoader::new(
            self.store.clone(),
            self.loader_config.clone(),
            self.metrics.clone(),
        );
        let consumer = tokio::spawn(loader.drain(rx));

        let produced = self.scraper.run(&since, &tx).await;
        drop(tx);

        let consumed = consumer
            .await
            .map_err(|e| PipelineError::channel(format!("indexing task failed: {e}")))?;

        // The consumer's failure is the root cause when the queue closed
        // under the producer.
        consumed?;
        produced?;

        let duration = started.elapsed();
        self.metrics.set_scrape_duration(duration);
        info!(
            duration_secs = format!("{:.3}", duration.as_secs_f64()),
            "Scrape cycle complete"
        );
        Ok(())
    }
}
