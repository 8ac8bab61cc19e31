//! Runtime configuration from environment variables and flags

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use url::Url;

use crate::auth::AuthConfig;

pub const DEFAULT_API_BASE: &str = "https://fleet-api.prd.eu.vn.cloud.tesla.com";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.tesla.com/oauth2/v3/token";
pub const DEFAULT_REFRESH_TOKEN_FILE: &str = "/data/refresh_token";
pub const DEFAULT_PORT: u16 = 9998;

/// Exporter configuration
#[derive(Clone, Args)]
pub struct Config {
    /// Fleet API application client ID
    #[arg(long, env = "TESLA_CLIENT_ID")]
    pub client_id: String,

    /// Fleet API application client secret
    #[arg(long, env = "TESLA_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Energy site to export
    #[arg(long, env = "TESLA_SITE_ID")]
    pub site_id: String,

    /// Regional Fleet API base URL
    #[arg(long, env = "TESLA_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: Url,

    /// OAuth2 token endpoint
    #[arg(long, env = "TESLA_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: Url,

    /// File holding the current refresh token (rewritten on rotation)
    #[arg(long, env = "TESLA_REFRESH_TOKEN_FILE", default_value = DEFAULT_REFRESH_TOKEN_FILE)]
    pub refresh_token_file: PathBuf,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_addr: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Timeout for each outbound request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            token_url: self.token_url.clone(),
            timeout: self.request_timeout(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("site_id", &self.site_id)
            .field("api_base", &self.api_base.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("refresh_token_file", &self.refresh_token_file)
            .field("listen_addr", &self.listen_addr)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
