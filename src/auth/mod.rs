//! Authentication module for the Tesla Fleet API
//!
//! Keeps a short-lived access token in memory and renews it through the
//! OAuth2 refresh-token grant, persisting rotated refresh tokens to disk.

pub mod manager;
pub mod oauth;
pub mod tokens;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::time::Duration;

use url::Url;

pub use manager::CredentialManager;
pub use tokens::{Clock, FileTokenStore, StoredToken, SystemClock, TokenStore};

/// OAuth2 client configuration for the token exchange
#[derive(Clone)]
pub struct AuthConfig {
    /// Fleet API application client ID
    pub client_id: String,
    /// Fleet API application client secret
    pub client_secret: String,
    /// Token endpoint accepting the refresh_token grant
    pub token_url: Url,
    /// Upper bound on a single token exchange
    pub timeout: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
