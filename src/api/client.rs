//! Authenticated HTTP client for the Fleet API
//!
//! Wraps reqwest::Client with bearer token injection from the
//! CredentialManager.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::auth::CredentialManager;
use crate::error::ExporterError;
use crate::models::{LiveStatus, LiveStatusEnvelope};

/// Client bound to a single energy site.
pub struct FleetClient {
    http: reqwest::Client,
    live_status_url: String,
    credentials: Arc<CredentialManager>,
}

impl FleetClient {
    pub fn new(
        api_base: &Url,
        site_id: &str,
        timeout: Duration,
        credentials: Arc<CredentialManager>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            live_status_url: live_status_url(api_base, site_id),
            credentials,
        })
    }

    /// Fetch the current live status of the site.
    pub async fn fetch_snapshot(&self) -> Result<LiveStatus, ExporterError> {
        let token = self.credentials.get_valid_token().await?;
        let url = &self.live_status_url;
        tracing::debug!("Fleet GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ExporterError::Upstream(format!("GET {} failed: {}", url, e)))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked early server-side; make the next scrape refresh.
            self.credentials.invalidate().await;
        }
        let resp = check_response(resp, url).await?;

        let body = resp
            .bytes()
            .await
            .map_err(|e| ExporterError::Upstream(format!("reading body of {}: {}", url, e)))?;

        parse_live_status(&body)
    }
}

fn live_status_url(api_base: &Url, site_id: &str) -> String {
    format!(
        "{}/api/1/energy_sites/{}/live_status",
        api_base.as_str().trim_end_matches('/'),
        site_id
    )
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(
    resp: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, ExporterError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ExporterError::Upstream(format!(
            "HTTP {} for {}: {}",
            status.as_u16(),
            url,
            body.trim()
        )));
    }
    Ok(resp)
}

fn parse_live_status(body: &[u8]) -> Result<LiveStatus, ExporterError> {
    let envelope: LiveStatusEnvelope =
        serde_json::from_slice(body).map_err(|e| ExporterError::Decode(e.to_string()))?;

    envelope
        .response
        .ok_or_else(|| ExporterError::Decode("missing 'response' object".to_string()))
}
