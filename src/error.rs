//! Errors surfaced by a single scrape

use thiserror::Error;

/// Failure of one credential refresh or live-status fetch.
///
/// None of these are fatal to the process; the HTTP layer reports them to
/// the scraper and the next scrape starts from scratch.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Refresh token file missing, unreadable, empty or not writable.
    #[error("refresh token store: {0}")]
    CredentialStore(String),

    /// Token endpoint rejected the exchange or returned something unusable.
    #[error("token refresh failed: {0}")]
    Auth(String),

    /// Live-status call failed or returned a non-success status.
    #[error("live status request failed: {0}")]
    Upstream(String),

    /// Live-status body was not the expected JSON shape.
    #[error("malformed live status response: {0}")]
    Decode(String),
}
