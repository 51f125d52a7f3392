//! Elasticsearch store implementation.
//!
//! This module provides the concrete implementation of [`BulkIndexStore`]
//! over the `opensearch` client crate, which speaks the same bulk wire
//! protocol: per document, one JSON action-metadata line followed by one
//! JSON document line.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::BulkIndexStore;
use crate::types::BulkOperation;

/// Connection settings for the index store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store addresses. The transport pins the first one.
    pub addresses: Vec<String>,
    /// Optional basic-auth username.
    pub username: Option<String>,
    /// Optional basic-auth password.
    pub password: Option<String>,
}

/// Index store backed by the Elasticsearch bulk API.
pub struct ElasticsearchStore {
    client: OpenSearch,
}

impl ElasticsearchStore {
    /// Create a new store client from connection settings.
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticsearchStore)` - A new client instance
    /// * `Err(StoreError)` - If no address is configured or transport setup fails
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let address = config
            .addresses
            .first()
            .ok_or_else(|| StoreError::connection("no store address configured"))?;

        let parsed_url =
            Url::parse(address).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }

        let transport = builder
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(address = %address, "Created index store client");

        Ok(Self { client })
    }
}

/// Build the alternating action/document lines for a batch.
///
/// Exposed at module level so the wire framing can be tested without a
/// live store.
pub(crate) fn bulk_lines(operations: &[BulkOperation]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(operations.len() * 2);
    for operation in operations {
        lines.push(operation.action_line());
        lines.push(operation.body.clone());
    }
    lines
}

#[async_trait]
impl BulkIndexStore for ElasticsearchStore {
    async fn bulk_index(&self, operations: &[BulkOperation]) -> Result<(), StoreError> {
        let body: Vec<JsonBody<Value>> = bulk_lines(operations).into_iter().map(Into::into).collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(StoreError::ResponseError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let report: Value = response
            .json()
            .await
            .map_err(|e| StoreError::malformed(e.to_string()))?;

        // The bulk API can answer 200 while individual items fail; the
        // batch is atomic for retry purposes, so any item failure fails
        // the whole request.
        if report.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            let detail = first_item_error(&report).unwrap_or_else(|| "unknown item failure".to_string());
            error!(detail = %detail, "Bulk response reported item failures");
            return Err(StoreError::bulk_rejected(detail));
        }

        debug!(count = operations.len(), "Bulk request acknowledged");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(StoreError::ResponseError {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        Ok(())
    }
}

/// Pull the first item-level error out of a bulk response body.
fn first_item_error(report: &Value) -> Option<String> {
    report
        .get("items")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("index"))
        .find_map(|index| index.get("error"))
        .map(|error| error.to_string())
}
