//! Processor module for the exporter.
//!
//! Transforms fetched records into bulk index operations.

mod document_mapper;

pub use document_mapper::DocumentMapper;
