//! Error types for the scrape pipeline.
//!
//! Everything in [`PipelineError`] is fatal: by the time one of these
//! reaches the scheduler, the scrape cycle is lost and the process exits
//! non-zero. The retriable class lives in the repository crate as
//! `StoreError`; the loader converts it into `IndexingExhausted` only
//! after the configured attempts are spent.

use pagerduty2es_repository::StoreError;
use thiserror::Error;

/// Fatal errors that abort a scrape cycle and the process.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A page or log-entry fetch from the incident API failed.
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// A fetched record carries a timestamp the pipeline cannot parse.
    #[error("Record {record_id} has malformed timestamp {value:?}")]
    MalformedTimestamp {
        record_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A fetched record has no usable identifier, even after fallback.
    #[error("Fetched {kind} record has no usable identifier")]
    MissingIdentifier { kind: &'static str },

    /// A record could not be serialized into a document body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Bulk indexing failed on every configured attempt.
    #[error("Indexing failed after {attempts} attempts")]
    IndexingExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The pipeline queue closed unexpectedly.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl PipelineError {
    /// Create a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        Self::FetchError(err.to_string())
    }
}
