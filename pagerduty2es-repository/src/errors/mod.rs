//! Error types for the index store.
//!
//! Every variant here is retriable from the pipeline's point of view: the
//! loader retries the whole batch a bounded number of times and only then
//! escalates to a fatal pipeline error.

use thiserror::Error;

/// Errors that can occur during index-store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to build the client or its transport.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or the response never arrived.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The store answered with a non-success status.
    #[error("Response status {status}: {body}")]
    ResponseError { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The bulk response reported item-level failures.
    #[error("Bulk request rejected: {0}")]
    BulkRejected(String),

    /// A document could not be serialized for the wire.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a malformed-response error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a bulk-rejection error.
    pub fn bulk_rejected(msg: impl Into<String>) -> Self {
        Self::BulkRejected(msg.into())
    }
}

impl From<opensearch::Error> for StoreError {
    fn from(err: opensearch::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}
