//! Configuration and dependency initialization for the exporter.

mod dependencies;
mod settings;

pub use dependencies::{verify_connectivity, Dependencies};
pub use settings::{ElasticsearchSettings, PagerDutySettings, Settings};
