//! Dependency initialization and wiring for the exporter.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Settings;
use crate::metrics::ExporterMetrics;
use crate::orchestrator::{SchedulerConfig, ScrapeScheduler};
use crate::processor::DocumentMapper;
use crate::scraper::{IncidentScraper, PagerDutyClient};
use crate::loader::LoaderConfig;
use crate::ExporterError;
use pagerduty2es_repository::{BulkIndexStore, ElasticsearchStore, StoreConfig, StoreError};
use pagerduty2es_shared::IndexTemplate;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured scheduler ready to run.
    pub scheduler: ScrapeScheduler,
    /// The metric set shared with the HTTP endpoint.
    pub metrics: Arc<ExporterMetrics>,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// Verifies index-store reachability before returning; the scheduler
    /// never starts against a store that failed every startup probe.
    pub async fn new(settings: Settings) -> Result<Self, ExporterError> {
        let metrics = Arc::new(ExporterMetrics::new()?);

        let store = Arc::new(ElasticsearchStore::new(&StoreConfig {
            addresses: settings.elasticsearch.addresses.clone(),
            username: settings.elasticsearch.username.clone(),
            password: settings.elasticsearch.password.clone(),
        })?);

        verify_connectivity(
            store.as_ref(),
            settings.elasticsearch.startup_probe_attempts,
            settings.elasticsearch.retry_delay,
        )
        .await?;

        let source = Arc::new(PagerDutyClient::new(
            &settings.pagerduty.api_url,
            &settings.pagerduty.auth_token,
            settings.pagerduty.max_connections,
        )?);

        let template = IndexTemplate::new(settings.elasticsearch.index_template.clone());
        let mapper = DocumentMapper::new(template, metrics.clone());
        let scraper = IncidentScraper::new(source, mapper);

        let loader_config = LoaderConfig {
            batch_count: settings.elasticsearch.batch_count,
            retry_count: settings.elasticsearch.retry_count,
            retry_delay: settings.elasticsearch.retry_delay,
        };

        let date_range = chrono::Duration::from_std(settings.pagerduty.date_range)
            .map_err(|e| ExporterError::config(format!("invalid date range: {e}")))?;

        let scheduler = ScrapeScheduler::new(
            scraper,
            store,
            loader_config,
            SchedulerConfig {
                date_range,
                interval: settings.scrape_interval,
            },
            metrics.clone(),
        );

        info!("Dependencies initialized");

        Ok(Self { scheduler, metrics })
    }
}

/// Probe the index store until it answers, up to `attempts` tries.
pub async fn verify_connectivity(
    store: &dyn BulkIndexStore,
    attempts: u32,
    delay: Duration,
) -> Result<(), StoreError> {
    let attempts = attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match store.ping().await {
            Ok(()) => {
                info!("Index store reachable");
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "Index store not reachable yet");
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
