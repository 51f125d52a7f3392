//! Interface definitions for the index store.

mod bulk_index_store;

pub use bulk_index_store::BulkIndexStore;
