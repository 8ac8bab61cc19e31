//! Access token cache with lazy, serialized refresh

use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;

use super::oauth::{build_client, exchange_refresh_token, FleetOAuthClient};
use super::tokens::{Clock, StoredToken, TokenStore};
use super::AuthConfig;
use crate::error::ExporterError;

/// Owns the in-memory access token and the persisted refresh token.
///
/// All reads and refreshes go through one async mutex, so concurrent scrapes
/// that find the token stale wait for a single exchange instead of each
/// spending the refresh token.
pub struct CredentialManager {
    client: FleetOAuthClient,
    store: Box<dyn TokenStore>,
    clock: Box<dyn Clock>,
    timeout: Duration,
    cached: Mutex<Option<StoredToken>>,
}

impl CredentialManager {
    pub fn new(
        auth_config: &AuthConfig,
        store: impl TokenStore + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(auth_config)?,
            store: Box::new(store),
            clock: Box::new(clock),
            timeout: auth_config.timeout,
            cached: Mutex::new(None),
        })
    }

    /// Return a bearer token that has not reached its early expiry,
    /// refreshing first if needed.
    pub async fn get_valid_token(&self) -> Result<String, ExporterError> {
        let mut cached = self.cached.lock().await;

        let now = self.clock.now();
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired(now)) {
            return Ok(token.token.clone());
        }

        tracing::info!("Access token missing or expired, refreshing...");
        let token = self.refresh_locked(&mut cached).await?;
        Ok(token.token.clone())
    }

    /// Unconditionally exchange the stored refresh token.
    #[allow(dead_code)]
    pub async fn refresh(&self) -> Result<(), ExporterError> {
        let mut cached = self.cached.lock().await;
        self.refresh_locked(&mut cached).await.map(|_| ())
    }

    /// Drop the cached access token so the next request refreshes.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        if cached.take().is_some() {
            tracing::debug!("Cached access token invalidated");
        }
    }

    async fn refresh_locked<'a>(
        &self,
        cached: &'a mut Option<StoredToken>,
    ) -> Result<&'a StoredToken, ExporterError> {
        let refresh_token = self.store.load_refresh_token()?;

        let grant = tokio::time::timeout(
            self.timeout,
            exchange_refresh_token(&self.client, refresh_token),
        )
        .await
        .map_err(|_| {
            ExporterError::Auth(format!(
                "token endpoint did not answer within {}s",
                self.timeout.as_secs()
            ))
        })??;

        let token = StoredToken::new(grant.access_token, self.clock.now(), grant.expires_in);

        // Persist before touching memory: the old refresh token may already
        // be dead on the server side.
        let rotated = match grant.refresh_token {
            Some(new_rt) => {
                self.store.save_refresh_token(&new_rt)?;
                true
            }
            None => false,
        };

        tracing::info!(
            "Token refreshed, expires in {}s{}",
            grant.expires_in,
            if rotated { " (refresh token rotated)" } else { "" }
        );

        Ok(cached.insert(token))
    }
}
