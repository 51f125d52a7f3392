//! This module defines the core data structures used across the exporter.
//! It re-exports specific types like `IndexDocument` and `IndexTemplate`.

pub mod document;
pub mod template;

pub use document::{IndexDocument, RecordKind};
pub use template::IndexTemplate;
