//! Scraper module for the exporter.
//!
//! Pulls incidents and their log entries from the incident API page by
//! page, maps them to index documents, and feeds the bounded pipeline
//! queue. Fetching is strictly sequential; concurrency exists only
//! between this producer and the indexing consumer.

mod pagerduty_client;
pub mod records;

pub use pagerduty_client::PagerDutyClient;
pub use records::{Incident, IncidentPage, LogEntry, LogEntryPage};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::processor::DocumentMapper;
use pagerduty2es_repository::BulkOperation;

/// Number of incidents requested per page (the API caps pages at 100).
pub const INCIDENT_PAGE_LIMIT: usize = 100;

/// Abstracts the incident API.
///
/// Implementations are injected into the scraper to enable testing with
/// mock sources. Both calls are read-only; errors are fatal to the
/// enclosing scrape cycle.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Fetch one page of incidents created since the given RFC3339 cutoff.
    async fn list_incidents(
        &self,
        since: &str,
        limit: usize,
        offset: usize,
    ) -> Result<IncidentPage, PipelineError>;

    /// Fetch the log-entry listing for one incident.
    async fn list_incident_log_entries(
        &self,
        incident_id: &str,
    ) -> Result<LogEntryPage, PipelineError>;
}

/// Producer side of the scrape pipeline.
///
/// Paginates the incident API with a fixed page limit, fetches each
/// incident's log entries, and sends mapped operations into the bounded
/// queue. The queue applies backpressure: when the indexing consumer
/// falls behind by more than one batch, `send` suspends the producer.
pub struct IncidentScraper {
    source: Arc<dyn IncidentSource>,
    mapper: DocumentMapper,
    page_limit: usize,
}

impl IncidentScraper {
    /// Create a scraper with the default page limit.
    pub fn new(source: Arc<dyn IncidentSource>, mapper: DocumentMapper) -> Self {
        Self::with_page_limit(source, mapper, INCIDENT_PAGE_LIMIT)
    }

    /// Create a scraper with a custom page limit.
    pub fn with_page_limit(
        source: Arc<dyn IncidentSource>,
        mapper: DocumentMapper,
        page_limit: usize,
    ) -> Self {
        Self {
            source,
            mapper,
            page_limit,
        }
    }

    /// Scrape everything since the cutoff into the queue.
    ///
    /// The offset advances by exactly the page limit per request,
    /// regardless of how many records the page actually carried; the loop
    /// ends when the API reports `more = false`. Dropping the sender after
    /// this returns is the stream-end signal for the consumer.
    #[instrument(skip(self, tx))]
    pub async fn run(
        &self,
        since: &DateTime<Utc>,
        tx: &mpsc::Sender<BulkOperation>,
    ) -> Result<(), PipelineError> {
        let since = since.to_rfc3339();
        let mut offset = 0;

        loop {
            let page = self
                .source
                .list_incidents(&since, self.page_limit, offset)
                .await?;

            for mut incident in page.incidents {
                incident.id = incident
                    .effective_id()
                    .ok_or(PipelineError::MissingIdentifier { kind: "incident" })?;
                debug!(incident = %incident.id, "Scraped incident");

                let operation = self.mapper.map_incident(&incident)?;
                self.send(tx, operation).await?;

                let listing = self
                    .source
                    .list_incident_log_entries(&incident.id)
                    .await?;

                for mut entry in listing.log_entries {
                    entry.id = entry
                        .effective_id()
                        .ok_or(PipelineError::MissingIdentifier { kind: "log entry" })?;
                    debug!(incident = %incident.id, log_entry = %entry.id, "Scraped log entry");

                    let operation = self.mapper.map_log_entry(&incident.id, &entry)?;
                    self.send(tx, operation).await?;
                }
            }

            if !page.more {
                break;
            }
            offset += self.page_limit;
        }

        Ok(())
    }

    async fn send(
        &self,
        tx: &mpsc::Sender<BulkOperation>,
        operation: BulkOperation,
    ) -> Result<(), PipelineError> {
        tx.send(operation)
            .await
            .map_err(|_| PipelineError::channel("bulk queue closed before scrape finished"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ExporterMetrics;
    use pagerduty2es_shared::IndexTemplate;
    use serde_json::json;
    use std::sync::Mutex;

    struct PagedSource {
        pages: Vec<IncidentPage>,
        requested_offsets: Mutex<Vec<usize>>,
    }

    impl PagedSource {
        fn new(pages: Vec<IncidentPage>) -> Self {
            Self {
                pages,
                requested_offsets: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IncidentSource for PagedSource {
        async fn list_incidents(
            &self,
            _since: &str,
            limit: usize,
            offset: usize,
        ) -> Result<IncidentPage, PipelineError> {
            let mut offsets = self.requested_offsets.lock().unwrap();
            offsets.push(offset);
            let index = offset / limit;
            Ok(self.pages[index].clone())
        }

        async fn list_incident_log_entries(
            &self,
            _incident_id: &str,
        ) -> Result<LogEntryPage, PipelineError> {
            Ok(LogEntryPage {
                log_entries: Vec::new(),
            })
        }
    }

    fn incident(id: &str) -> Incident {
        serde_json::from_value(json!({
            "id": id,
            "created_at": "2023-06-15T08:30:00Z"
        }))
        .unwrap()
    }

    fn page(ids: &[&str], more: bool) -> IncidentPage {
        IncidentPage {
            incidents: ids.iter().map(|id| incident(id)).collect(),
            more,
        }
    }

    fn mapper() -> DocumentMapper {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        DocumentMapper::new(IndexTemplate::new("pagerduty-%y-%m"), metrics)
    }

    #[tokio::test]
    async fn test_offsets_advance_by_limit_until_more_is_false() {
        let source = Arc::new(PagedSource::new(vec![
            page(&["P1", "P2"], true),
            page(&["P3", "P4"], true),
            page(&["P5"], false),
        ]));
        let scraper = IncidentScraper::with_page_limit(source.clone(), mapper(), 2);

        let (tx, mut rx) = mpsc::channel(16);
        let since = Utc::now();
        scraper.run(&since, &tx).await.unwrap();
        drop(tx);

        assert_eq!(*source.requested_offsets.lock().unwrap(), vec![0, 2, 4]);

        let mut ids = Vec::new();
        while let Some(operation) = rx.recv().await {
            ids.push(operation.document_id);
        }
        assert_eq!(
            ids,
            vec![
                "incident-P1",
                "incident-P2",
                "incident-P3",
                "incident-P4",
                "incident-P5"
            ]
        );
    }

    #[tokio::test]
    async fn test_record_without_identifier_is_fatal() {
        let broken = IncidentPage {
            incidents: vec![serde_json::from_value(json!({
                "created_at": "2023-06-15T08:30:00Z"
            }))
            .unwrap()],
            more: false,
        };
        let source = Arc::new(PagedSource::new(vec![broken]));
        let scraper = IncidentScraper::with_page_limit(source, mapper(), 2);

        let (tx, _rx) = mpsc::channel(16);
        let result = scraper.run(&Utc::now(), &tx).await;
        assert!(matches!(
            result,
            Err(PipelineError::MissingIdentifier { kind: "incident" })
        ));
    }

    #[tokio::test]
    async fn test_identifier_fallback_reaches_the_mapper() {
        let fallback_page = IncidentPage {
            incidents: vec![serde_json::from_value(json!({
                "created_at": "2023-06-15T08:30:00Z",
                "self": "https://api.pagerduty.com/incidents/PFALL"
            }))
            .unwrap()],
            more: false,
        };
        let source = Arc::new(PagedSource::new(vec![fallback_page]));
        let scraper = IncidentScraper::with_page_limit(source, mapper(), 2);

        let (tx, mut rx) = mpsc::channel(16);
        scraper.run(&Utc::now(), &tx).await.unwrap();
        drop(tx);

        let operation = rx.recv().await.unwrap();
        assert_eq!(operation.document_id, "incident-PFALL");
    }
}
