//! Exporter metrics.
//!
//! Pure side-channel: counters and a duration gauge observed by the
//! pipeline stages, rendered by the HTTP endpoint. The registry is owned
//! here and passed around explicitly; nothing registers into a process
//! global.

use std::time::Duration;

use prometheus::{Gauge, IntCounter, Registry};

/// Counters and gauges for one exporter process.
pub struct ExporterMetrics {
    registry: Registry,
    incidents: IntCounter,
    incident_log_entries: IntCounter,
    index_requests: IntCounter,
    index_request_retries: IntCounter,
    scrape_duration_seconds: Gauge,
}

impl ExporterMetrics {
    /// Create and register the exporter metric set.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let incidents = IntCounter::new(
            "pagerduty2es_incident_total",
            "Incidents scraped from the PagerDuty API",
        )?;
        let incident_log_entries = IntCounter::new(
            "pagerduty2es_incident_logentry_total",
            "Incident log entries scraped from the PagerDuty API",
        )?;
        let index_requests = IntCounter::new(
            "pagerduty2es_elasticsearch_request_total",
            "Bulk index request attempts",
        )?;
        let index_request_retries = IntCounter::new(
            "pagerduty2es_elasticsearch_request_retries_total",
            "Failed bulk index request attempts",
        )?;
        let scrape_duration_seconds = Gauge::new(
            "pagerduty2es_scrape_duration_seconds",
            "Wall-clock duration of the last scrape cycle in seconds",
        )?;

        registry.register(Box::new(incidents.clone()))?;
        registry.register(Box::new(incident_log_entries.clone()))?;
        registry.register(Box::new(index_requests.clone()))?;
        registry.register(Box::new(index_request_retries.clone()))?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            incidents,
            incident_log_entries,
            index_requests,
            index_request_retries,
            scrape_duration_seconds,
        })
    }

    /// Count one mapped incident.
    pub fn record_incident(&self) {
        self.incidents.inc();
    }

    /// Count one mapped log entry.
    pub fn record_log_entry(&self) {
        self.incident_log_entries.inc();
    }

    /// Count one bulk request attempt, successful or not.
    pub fn record_index_attempt(&self) {
        self.index_requests.inc();
    }

    /// Count one failed bulk request attempt.
    pub fn record_index_retry(&self) {
        self.index_request_retries.inc();
    }

    /// Record the wall-clock duration of a completed scrape cycle.
    pub fn set_scrape_duration(&self, duration: Duration) {
        self.scrape_duration_seconds.set(duration.as_secs_f64());
    }

    /// Gather all registered metric families for rendering.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Current incident count.
    pub fn incident_count(&self) -> u64 {
        self.incidents.get()
    }

    /// Current log-entry count.
    pub fn log_entry_count(&self) -> u64 {
        self.incident_log_entries.get()
    }

    /// Current bulk attempt count.
    pub fn index_attempt_count(&self) -> u64 {
        self.index_requests.get()
    }

    /// Current bulk retry count.
    pub fn index_retry_count(&self) -> u64 {
        self.index_request_retries.get()
    }

    /// Duration of the last completed scrape cycle, in seconds.
    pub fn scrape_duration(&self) -> f64 {
        self.scrape_duration_seconds.get()
    }
}
