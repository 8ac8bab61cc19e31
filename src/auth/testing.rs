//! In-memory doubles for the credential seams, shared by unit tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;
use wiremock::MockServer;

use super::tokens::{Clock, TokenStore};
use super::AuthConfig;
use crate::error::ExporterError;

pub const TOKEN_PATH: &str = "/oauth2/v3/token";

pub fn auth_config(server: &MockServer) -> AuthConfig {
    AuthConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        token_url: Url::parse(&format!("{}{}", server.uri(), TOKEN_PATH)).unwrap(),
        timeout: Duration::from_secs(5),
    }
}

pub fn token_body(access_token: &str, expires_in: u64, refresh_token: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    });
    if let Some(rt) = refresh_token {
        body["refresh_token"] = serde_json::Value::String(rt.to_string());
    }
    body
}

#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.inner.lock().unwrap().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_refresh_token(&self) -> Result<String, ExporterError> {
        self.current()
            .ok_or_else(|| ExporterError::CredentialStore("no refresh token".to_string()))
    }

    fn save_refresh_token(&self, token: &str) -> Result<(), ExporterError> {
        *self.inner.lock().unwrap() = Some(token.to_string());
        Ok(())
    }
}

/// Hands out a refresh token but cannot persist a rotated one.
#[derive(Clone)]
pub struct FailingSaveStore;

impl TokenStore for FailingSaveStore {
    fn load_refresh_token(&self) -> Result<String, ExporterError> {
        Ok("rt-old".to_string())
    }

    fn save_refresh_token(&self, _token: &str) -> Result<(), ExporterError> {
        Err(ExporterError::CredentialStore("disk full".to_string()))
    }
}

#[derive(Clone)]
pub struct FakeClock {
    now: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn at(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
