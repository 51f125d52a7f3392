//! # PagerDuty2es Repository
//!
//! This crate provides traits and implementations for interacting with the
//! index store. It includes definitions for errors, interfaces, and a
//! concrete implementation backed by the Elasticsearch bulk API.

pub mod elasticsearch;
pub mod errors;
pub mod interfaces;
pub mod types;

pub use elasticsearch::{ElasticsearchStore, StoreConfig};
pub use errors::StoreError;
pub use interfaces::BulkIndexStore;
pub use types::BulkOperation;
