//! PagerDuty REST API client.
//!
//! Implements [`IncidentSource`] over the v2 REST API. Errors here are
//! fetch errors: fatal to the enclosing scrape cycle, never retried at
//! this layer.

use reqwest::{header, Client as ReqwestClient};
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::scraper::records::{IncidentPage, LogEntryPage};
use crate::scraper::IncidentSource;

/// REST API v2 content negotiation header.
const ACCEPT_HEADER: &str = "application/vnd.pagerduty+json;version=2";

/// PagerDuty REST API client.
pub struct PagerDutyClient {
    http: ReqwestClient,
    base_url: String,
    auth_token: String,
}

impl PagerDutyClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL (e.g. "https://api.pagerduty.com")
    /// * `auth_token` - REST API token
    /// * `max_connections` - Connection pool size towards the API host
    pub fn new(
        base_url: &str,
        auth_token: &str,
        max_connections: usize,
    ) -> Result<Self, PipelineError> {
        let http = ReqwestClient::builder()
            .pool_max_idle_per_host(max_connections)
            .build()?;

        info!(base_url = %base_url, max_connections, "Created PagerDuty client");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(header::ACCEPT, ACCEPT_HEADER)
            .header(
                header::AUTHORIZATION,
                format!("Token token={}", self.auth_token),
            )
    }
}

#[async_trait::async_trait]
impl IncidentSource for PagerDutyClient {
    async fn list_incidents(
        &self,
        since: &str,
        limit: usize,
        offset: usize,
    ) -> Result<IncidentPage, PipelineError> {
        let url = format!("{}/incidents", self.base_url);
        debug!(since = %since, limit, offset, "Requesting incident page");

        let response = self
            .request(&url)
            .query(&[
                ("since", since),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(format!(
                "incident page request failed with status {status}"
            )));
        }

        Ok(response.json::<IncidentPage>().await?)
    }

    async fn list_incident_log_entries(
        &self,
        incident_id: &str,
    ) -> Result<LogEntryPage, PipelineError> {
        let url = format!("{}/incidents/{}/log_entries", self.base_url, incident_id);
        debug!(incident = %incident_id, "Requesting incident log entries");

        let response = self.request(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(format!(
                "log entry request for incident {incident_id} failed with status {status}"
            )));
        }

        Ok(response.json::<LogEntryPage>().await?)
    }
}
