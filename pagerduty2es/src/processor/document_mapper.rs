//! Document mapper implementation.
//!
//! Pure transform stage: one fetched record in, one bulk operation out.
//! The record's creation timestamp is parsed as RFC3339 and re-serialized
//! in UTC rather than passed through verbatim, and the target index is
//! resolved from that timestamp, so replayed historical records land in
//! the historically correct partition. A timestamp the mapper cannot
//! parse is fatal to the scrape cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::PipelineError;
use crate::metrics::ExporterMetrics;
use crate::scraper::{Incident, LogEntry};
use pagerduty2es_repository::BulkOperation;
use pagerduty2es_shared::{IndexDocument, IndexTemplate, RecordKind};

/// Maps fetched records into bulk index operations.
pub struct DocumentMapper {
    template: IndexTemplate,
    metrics: Arc<ExporterMetrics>,
}

impl DocumentMapper {
    /// Create a mapper for the given index template.
    pub fn new(template: IndexTemplate, metrics: Arc<ExporterMetrics>) -> Self {
        Self { template, metrics }
    }

    /// Map one incident. The incident's id must already be normalized.
    pub fn map_incident(&self, incident: &Incident) -> Result<BulkOperation, PipelineError> {
        self.metrics.record_incident();
        self.map_record(
            RecordKind::Incident,
            &incident.id,
            &incident.created_at,
            &incident.id,
            incident,
        )
    }

    /// Map one log entry belonging to the given incident.
    pub fn map_log_entry(
        &self,
        incident_id: &str,
        entry: &LogEntry,
    ) -> Result<BulkOperation, PipelineError> {
        self.metrics.record_log_entry();
        self.map_record(
            RecordKind::LogEntry,
            &entry.id,
            &entry.created_at,
            incident_id,
            entry,
        )
    }

    fn map_record<T: Serialize>(
        &self,
        kind: RecordKind,
        record_id: &str,
        created_at: &str,
        incident_id: &str,
        record: &T,
    ) -> Result<BulkOperation, PipelineError> {
        let created = DateTime::parse_from_rfc3339(created_at)
            .map_err(|source| PipelineError::MalformedTimestamp {
                record_id: record_id.to_string(),
                value: created_at.to_string(),
                source,
            })?
            .with_timezone(&Utc);

        let payload = to_payload(record)?;
        let document = IndexDocument::new(kind, record_id, created, incident_id, payload);
        let index = self.template.render(&created);

        BulkOperation::from_document(index, &document)
            .map_err(|e| PipelineError::SerializationError(e.to_string()))
    }
}

/// Serialize a record into its top-level field map.
fn to_payload<T: Serialize>(record: &T) -> Result<Map<String, Value>, PipelineError> {
    let value = serde_json::to_value(record)
        .map_err(|e| PipelineError::SerializationError(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PipelineError::SerializationError(format!(
            "record serialized to non-object JSON: {other}"
        ))),
    }
}
