//! Elasticsearch implementation of the bulk index store.

mod store;

pub use store::{ElasticsearchStore, StoreConfig};
