//! # PagerDuty2es
//!
//! PagerDuty to Elasticsearch exporter - scrapes incidents and their log
//! entries from the PagerDuty REST API and writes them as documents into
//! time-partitioned indices with batched bulk requests.
//!
//! ## Architecture
//!
//! One scrape cycle runs two concurrent tasks joined by a bounded queue:
//!
//! 1. **Scraper** (producer): paginates the incident API, fetches each
//!    incident's log entries, maps records to documents
//! 2. **Loader** (consumer): accumulates documents into fixed-size
//!    batches and bulk-indexes each batch with bounded retries
//! 3. **Scheduler**: drives a single cycle or a scrape-then-sleep loop
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`scraper`]: PagerDuty client and pagination producer
//! - [`processor`]: Maps records into index documents
//! - [`loader`]: Batch accumulation and bulk retry discipline
//! - [`orchestrator`]: Scrape cycle and scheduling
//! - [`metrics`]: Exporter counters and gauges
//! - [`server`]: Metrics/health HTTP endpoint
//! - [`errors`]: Fatal pipeline error types

pub mod config;
pub mod errors;
pub mod loader;
pub mod metrics;
pub mod orchestrator;
pub mod processor;
pub mod scraper;
pub mod server;

pub use config::{Dependencies, Settings};
pub use errors::PipelineError;

use thiserror::Error;

/// Errors that can occur during exporter initialization or execution.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] PipelineError),

    /// Index store error.
    #[error("Store error: {0}")]
    StoreError(#[from] pagerduty2es_repository::StoreError),

    /// Metrics registration error.
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExporterError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
