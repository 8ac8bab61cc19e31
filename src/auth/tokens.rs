//! Token storage and management

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExporterError;

/// Access tokens are treated as expired this many seconds early.
pub const EXPIRY_MARGIN_SECS: u64 = 300;

/// Cached access token
#[derive(Clone)]
pub struct StoredToken {
    pub token: String,
    /// Unix seconds after which the token is considered stale.
    pub expires_at: u64,
}

impl StoredToken {
    pub fn new(token: String, issued_at: u64, expires_in_secs: u64) -> Self {
        let expires_at = issued_at
            .saturating_add(expires_in_secs)
            .saturating_sub(EXPIRY_MARGIN_SECS);

        Self { token, expires_at }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of the current time in unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Durable home of the refresh token
pub trait TokenStore: Send + Sync {
    fn load_refresh_token(&self) -> Result<String, ExporterError>;
    fn save_refresh_token(&self, token: &str) -> Result<(), ExporterError>;
}

/// Refresh token kept as the raw contents of a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load_refresh_token(&self) -> Result<String, ExporterError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ExporterError::CredentialStore(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let token = content.trim();
        if token.is_empty() {
            return Err(ExporterError::CredentialStore(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        Ok(token.to_string())
    }

    fn save_refresh_token(&self, token: &str) -> Result<(), ExporterError> {
        let write_err = |e: std::io::Error| {
            ExporterError::CredentialStore(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        };

        // Write beside the target and rename so a crash never leaves a
        // truncated token behind.
        let staging = self.staging_path();
        fs::write(&staging, token).map_err(write_err)?;

        // Restrictive permissions (file holds a long-lived credential)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&staging, perms).map_err(write_err)?;
        }

        fs::rename(&staging, &self.path).map_err(write_err)?;
        Ok(())
    }
}
