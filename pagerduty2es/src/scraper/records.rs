//! Raw record types returned by the incident API.
//!
//! Only the fields the pipeline inspects are typed; every other field
//! rides along in `extra` and ends up merged into the indexed document
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One incident as returned by `GET /incidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    /// Canonical API URL of the record; its trailing path segment doubles
    /// as a fallback identifier.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One log entry as returned by `GET /incidents/{id}/log_entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of incidents plus the pagination continuation flag.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentPage {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub more: bool,
}

/// The log-entry listing for one incident. A single page is sufficient.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntryPage {
    #[serde(default)]
    pub log_entries: Vec<LogEntry>,
}

/// Last non-empty path segment of an API object URL.
fn trailing_path_segment(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

impl Incident {
    /// The record's identifier, falling back to the `self` URL's trailing
    /// segment when the primary field came back empty.
    pub fn effective_id(&self) -> Option<String> {
        effective_id(&self.id, self.self_url.as_deref())
    }
}

impl LogEntry {
    /// The record's identifier, falling back to the `self` URL's trailing
    /// segment when the primary field came back empty.
    pub fn effective_id(&self) -> Option<String> {
        effective_id(&self.id, self.self_url.as_deref())
    }
}

fn effective_id(id: &str, self_url: Option<&str>) -> Option<String> {
    if !id.is_empty() {
        return Some(id.to_string());
    }
    self_url
        .and_then(trailing_path_segment)
        .map(str::to_string)
}
