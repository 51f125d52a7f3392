//! Document types for the search index.
//!
//! This module defines the document structure that is written to the index
//! store: the origin record's fields merged at the top level, plus the
//! `@timestamp` / `@incident` overlay used for time partitioning and
//! incident correlation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// The role of an origin record, used to derive stable document ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A PagerDuty incident.
    Incident,
    /// A log entry belonging to an incident.
    LogEntry,
}

impl RecordKind {
    /// Short tag prefixed to record ids to form document ids.
    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::Incident => "incident",
            RecordKind::LogEntry => "logentry",
        }
    }
}

/// Document representation for the search index.
///
/// The origin record's full field set is carried in `payload` and is
/// flattened to the top level on serialization, so the indexed document
/// looks like the origin record plus the overlay fields. The document id
/// is not part of the body; it travels in the bulk action metadata line.
///
/// Document ids are deterministic (`incident-<id>` / `logentry-<id>`), so
/// re-scraping the same records overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexDocument {
    /// Stable identifier for idempotent re-indexing. Not serialized into
    /// the document body.
    #[serde(skip)]
    pub document_id: String,
    /// Record creation time, re-serialized as RFC3339 in UTC.
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    /// The id of the incident this document belongs to. For incident
    /// documents this is the incident's own id.
    #[serde(rename = "@incident")]
    pub incident_id: String,
    /// The origin record's fields, merged at the top level.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl IndexDocument {
    /// Build a document from an origin record.
    ///
    /// # Arguments
    ///
    /// * `kind` - Whether the record is an incident or a log entry
    /// * `record_id` - The record's (normalized, non-empty) identifier
    /// * `created_at` - The record's parsed creation time
    /// * `incident_id` - The owning incident's identifier
    /// * `payload` - The origin record's full field set
    pub fn new(
        kind: RecordKind,
        record_id: &str,
        created_at: DateTime<Utc>,
        incident_id: &str,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            document_id: format!("{}-{}", kind.tag(), record_id),
            timestamp: created_at.to_rfc3339(),
            incident_id: incident_id.to_string(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_document_id_is_stable() {
        let a = IndexDocument::new(RecordKind::Incident, "PABC123", created_at(), "PABC123", Map::new());
        let b = IndexDocument::new(RecordKind::Incident, "PABC123", created_at(), "PABC123", Map::new());
        assert_eq!(a.document_id, "incident-PABC123");
        assert_eq!(a.document_id, b.document_id);

        let log = IndexDocument::new(RecordKind::LogEntry, "Q1", created_at(), "PABC123", Map::new());
        assert_eq!(log.document_id, "logentry-Q1");
    }

    #[test]
    fn test_payload_is_flattened_with_overlay() {
        let mut payload = Map::new();
        payload.insert("id".to_string(), json!("PABC123"));
        payload.insert("status".to_string(), json!("resolved"));

        let doc = IndexDocument::new(RecordKind::Incident, "PABC123", created_at(), "PABC123", payload);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["@timestamp"], json!("2023-06-15T08:30:00+00:00"));
        assert_eq!(value["@incident"], json!("PABC123"));
        // Origin fields land at the top level, not nested.
        assert_eq!(value["id"], json!("PABC123"));
        assert_eq!(value["status"], json!("resolved"));
        // The document id stays out of the body.
        assert!(value.get("document_id").is_none());
        assert!(value.get("_id").is_none());
    }
}
