//! Request types for the index store.

use pagerduty2es_shared::IndexDocument;
use serde_json::{json, Value};

use crate::errors::StoreError;

/// One bulk index operation: the unit behind the wire protocol's
/// action-metadata/document line pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    /// Resolved target index name.
    pub index: String,
    /// Stable document identifier.
    pub document_id: String,
    /// The serialized document body.
    pub body: Value,
}

impl BulkOperation {
    /// Build an operation for a mapped document and its resolved index.
    pub fn from_document(
        index: impl Into<String>,
        document: &IndexDocument,
    ) -> Result<Self, StoreError> {
        let body = serde_json::to_value(document)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Ok(Self {
            index: index.into(),
            document_id: document.document_id.clone(),
            body,
        })
    }

    /// The action-metadata line that precedes the document body on the wire.
    pub fn action_line(&self) -> Value {
        json!({
            "index": {
                "_index": self.index,
                "_id": self.document_id,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pagerduty2es_shared::RecordKind;
    use serde_json::Map;

    #[test]
    fn test_action_line_shape() {
        let op = BulkOperation {
            index: "pagerduty-2023-06".to_string(),
            document_id: "incident-PABC123".to_string(),
            body: json!({"status": "resolved"}),
        };

        assert_eq!(
            op.action_line(),
            json!({"index": {"_index": "pagerduty-2023-06", "_id": "incident-PABC123"}})
        );
    }

    #[test]
    fn test_from_document_carries_id_and_body() {
        let created = Utc.with_ymd_and_hms(2023, 6, 15, 8, 0, 0).unwrap();
        let mut payload = Map::new();
        payload.insert("status".to_string(), json!("triggered"));
        let document = IndexDocument::new(RecordKind::Incident, "P1", created, "P1", payload);

        let op = BulkOperation::from_document("pagerduty", &document).unwrap();
        assert_eq!(op.document_id, "incident-P1");
        assert_eq!(op.body["@incident"], json!("P1"));
        assert_eq!(op.body["status"], json!("triggered"));
    }
}
