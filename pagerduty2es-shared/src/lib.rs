//! # PagerDuty2es Shared
//!
//! This crate defines shared data structures and types used across the exporter.
//! It includes the indexable document model and the dated index-name template.

pub mod types;

pub use types::document::{IndexDocument, RecordKind};
pub use types::template::IndexTemplate;
