//! Environment-driven settings.
//!
//! All options are read once into one immutable [`Settings`] value and
//! passed explicitly into component constructors; no component reads the
//! environment afterwards.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::ExporterError;

/// Default PagerDuty API base URL.
const DEFAULT_PAGERDUTY_API_URL: &str = "https://api.pagerduty.com";

/// Default lookback window: 168h.
const DEFAULT_DATE_RANGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Default connection pool size towards the PagerDuty API.
const DEFAULT_MAX_CONNECTIONS: usize = 4;

/// Default index-name template.
const DEFAULT_INDEX_TEMPLATE: &str = "pagerduty";

/// Default documents per bulk request.
const DEFAULT_BATCH_COUNT: usize = 50;

/// Default bulk attempts per batch.
const DEFAULT_RETRY_COUNT: u32 = 5;

/// Default delay between bulk attempts.
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Default startup connectivity probe attempts.
const DEFAULT_STARTUP_PROBE_ATTEMPTS: u32 = 3;

/// Default scrape interval. Zero selects single-run mode.
const DEFAULT_SCRAPE_TIME_SECS: u64 = 300;

/// Default bind address for the metrics/health endpoint.
const DEFAULT_SERVER_BIND: &str = "0.0.0.0:8080";

/// PagerDuty API settings.
#[derive(Debug, Clone)]
pub struct PagerDutySettings {
    pub auth_token: String,
    pub api_url: String,
    /// Lookback window for the `since` cutoff.
    pub date_range: Duration,
    pub max_connections: usize,
}

/// Index store settings.
#[derive(Debug, Clone)]
pub struct ElasticsearchSettings {
    /// Space-separated list of store URLs.
    pub addresses: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Index-name template (`%y`/`%m`/`%d` placeholders).
    pub index_template: String,
    pub batch_count: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub startup_probe_attempts: u32,
}

/// All exporter settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pagerduty: PagerDutySettings,
    pub elasticsearch: ElasticsearchSettings,
    /// Sleep between scrape cycles; `None` selects single-run mode.
    pub scrape_interval: Option<Duration>,
    pub server_bind: SocketAddr,
}

impl Settings {
    /// Read all settings from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PAGERDUTY_AUTH_TOKEN`: REST API token (required)
    /// - `PAGERDUTY_API_URL`: API base URL
    /// - `PAGERDUTY_DATE_RANGE_SECS`: lookback window (default: 168h)
    /// - `PAGERDUTY_MAX_CONNECTIONS`: connection pool size (default: 4)
    /// - `ELASTICSEARCH_ADDRESS`: space-separated store URLs (required)
    /// - `ELASTICSEARCH_USERNAME` / `ELASTICSEARCH_PASSWORD`: basic auth
    /// - `ELASTICSEARCH_INDEX`: index template (default: "pagerduty")
    /// - `ELASTICSEARCH_BATCH_COUNT`: documents per bulk request (default: 50)
    /// - `ELASTICSEARCH_RETRY_COUNT`: attempts per batch (default: 5)
    /// - `ELASTICSEARCH_RETRY_DELAY_SECS`: delay between attempts (default: 5)
    /// - `ELASTICSEARCH_STARTUP_PROBE_ATTEMPTS`: startup probes (default: 3)
    /// - `SCRAPE_TIME_SECS`: scrape interval; 0 selects single-run (default: 300)
    /// - `SERVER_BIND`: metrics/health bind address (default: 0.0.0.0:8080)
    pub fn from_env() -> Result<Self, ExporterError> {
        let auth_token = require_var("PAGERDUTY_AUTH_TOKEN")?;
        let api_url = env::var("PAGERDUTY_API_URL")
            .unwrap_or_else(|_| DEFAULT_PAGERDUTY_API_URL.to_string());

        let addresses = parse_addresses(&require_var("ELASTICSEARCH_ADDRESS")?);
        if addresses.is_empty() {
            return Err(ExporterError::config("ELASTICSEARCH_ADDRESS is empty"));
        }

        let scrape_time_secs = parse_var(
            "SCRAPE_TIME_SECS",
            env::var("SCRAPE_TIME_SECS").ok(),
            DEFAULT_SCRAPE_TIME_SECS,
        )?;

        Ok(Self {
            pagerduty: PagerDutySettings {
                auth_token,
                api_url,
                date_range: Duration::from_secs(parse_var(
                    "PAGERDUTY_DATE_RANGE_SECS",
                    env::var("PAGERDUTY_DATE_RANGE_SECS").ok(),
                    DEFAULT_DATE_RANGE_SECS,
                )?),
                max_connections: parse_var(
                    "PAGERDUTY_MAX_CONNECTIONS",
                    env::var("PAGERDUTY_MAX_CONNECTIONS").ok(),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            elasticsearch: ElasticsearchSettings {
                addresses,
                username: env::var("ELASTICSEARCH_USERNAME").ok(),
                password: env::var("ELASTICSEARCH_PASSWORD").ok(),
                index_template: env::var("ELASTICSEARCH_INDEX")
                    .unwrap_or_else(|_| DEFAULT_INDEX_TEMPLATE.to_string()),
                batch_count: parse_var(
                    "ELASTICSEARCH_BATCH_COUNT",
                    env::var("ELASTICSEARCH_BATCH_COUNT").ok(),
                    DEFAULT_BATCH_COUNT,
                )?,
                retry_count: parse_var(
                    "ELASTICSEARCH_RETRY_COUNT",
                    env::var("ELASTICSEARCH_RETRY_COUNT").ok(),
                    DEFAULT_RETRY_COUNT,
                )?,
                retry_delay: Duration::from_secs(parse_var(
                    "ELASTICSEARCH_RETRY_DELAY_SECS",
                    env::var("ELASTICSEARCH_RETRY_DELAY_SECS").ok(),
                    DEFAULT_RETRY_DELAY_SECS,
                )?),
                startup_probe_attempts: parse_var(
                    "ELASTICSEARCH_STARTUP_PROBE_ATTEMPTS",
                    env::var("ELASTICSEARCH_STARTUP_PROBE_ATTEMPTS").ok(),
                    DEFAULT_STARTUP_PROBE_ATTEMPTS,
                )?,
            },
            scrape_interval: if scrape_time_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(scrape_time_secs))
            },
            server_bind: parse_var(
                "SERVER_BIND",
                env::var("SERVER_BIND").ok(),
                SocketAddr::from_str(DEFAULT_SERVER_BIND)
                    .map_err(|e| ExporterError::config(e.to_string()))?,
            )?,
        })
    }
}

fn require_var(name: &str) -> Result<String, ExporterError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ExporterError::config(format!("{name} is required")))
}

/// Parse an optional raw value, falling back to a default when unset.
fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, ExporterError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| ExporterError::config(format!("invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Split a space-separated address list, dropping empty entries.
fn parse_addresses(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_uses_default_when_unset() {
        let value: u64 = parse_var("X", None, 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_parses_set_value() {
        let value: u64 = parse_var("X", Some("7".to_string()), 42).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        let result: Result<u64, _> = parse_var("X", Some("soon".to_string()), 42);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_addresses_splits_on_whitespace() {
        let addresses = parse_addresses("http://es1:9200  http://es2:9200");
        assert_eq!(addresses, vec!["http://es1:9200", "http://es2:9200"]);
        assert!(parse_addresses("   ").is_empty());
    }
}
