//! Bulk index store trait definition.
//!
//! This module defines the abstract interface for bulk document writes,
//! allowing for different backend implementations (Elasticsearch,
//! OpenSearch, etc.) and for mock stores in tests.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::types::BulkOperation;

/// Abstracts the underlying index store.
///
/// Implementations are injected into the loader to enable dependency
/// injection and easy testing with mock implementations. A batch is atomic
/// from the caller's point of view: `bulk_index` either succeeds for the
/// whole batch or fails for the whole batch; callers never retry a subset.
#[async_trait]
pub trait BulkIndexStore: Send + Sync {
    /// Write a batch of documents in one bulk request.
    ///
    /// The implementation sends the batch exactly once; retrying is the
    /// caller's responsibility.
    ///
    /// # Arguments
    ///
    /// * `operations` - The batch, in the order the documents were produced
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the store acknowledged every operation
    /// * `Err(StoreError)` - On transport failure, a non-success status, a
    ///   malformed response, or reported item failures
    async fn bulk_index(&self, operations: &[BulkOperation]) -> Result<(), StoreError>;

    /// Probe store reachability.
    ///
    /// Used once at process startup before the scheduler starts.
    async fn ping(&self) -> Result<(), StoreError>;
}
