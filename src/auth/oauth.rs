//! OAuth2 refresh-token grant against the Tesla auth server

use std::time::Duration;

use anyhow::{Context, Result};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AccessToken, AuthType, AuthUrl, Client, ClientId, ClientSecret, RefreshToken,
    RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

use super::AuthConfig;
use crate::error::ExporterError;

/// Never visited: the exporter only ever uses the refresh grant, but the
/// oauth2 client requires an authorization endpoint.
const AUTHORIZE_URL: &str = "https://auth.tesla.com/oauth2/v3/authorize";

/// Token endpoint reply.
///
/// Only `access_token` is mandatory; the Tesla endpoint is not relied on to
/// send `token_type`, which the stock oauth2 response type would insist on.
#[derive(Debug, Serialize, Deserialize)]
pub struct FleetTokenResponse {
    access_token: AccessToken,
    #[serde(default = "bearer")]
    token_type: BasicTokenType,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
}

fn bearer() -> BasicTokenType {
    BasicTokenType::Bearer
}

impl TokenResponse<BasicTokenType> for FleetTokenResponse {
    fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    fn token_type(&self) -> &BasicTokenType {
        &self.token_type
    }

    fn expires_in(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }

    fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    fn scopes(&self) -> Option<&Vec<Scope>> {
        None
    }
}

/// oauth2 client speaking the refresh grant with `FleetTokenResponse`
pub type FleetOAuthClient = Client<
    BasicErrorResponse,
    FleetTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

/// Result of a successful token exchange
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    /// Present when the server rotated the refresh token.
    pub refresh_token: Option<String>,
}

/// Build the OAuth2 client from an AuthConfig
///
/// Client credentials travel in the form body alongside the refresh token,
/// which is what the Tesla token endpoint expects.
pub fn build_client(auth_config: &AuthConfig) -> Result<FleetOAuthClient> {
    let auth_url = AuthUrl::new(AUTHORIZE_URL.to_string()).context("Invalid authorize URL")?;
    let token_url =
        TokenUrl::new(auth_config.token_url.to_string()).context("Invalid token URL")?;

    Ok(FleetOAuthClient::new(
        ClientId::new(auth_config.client_id.clone()),
        Some(ClientSecret::new(auth_config.client_secret.clone())),
        auth_url,
        Some(token_url),
    )
    .set_auth_type(AuthType::RequestBody))
}

/// Exchange a refresh token for a fresh access token.
pub async fn exchange_refresh_token(
    client: &FleetOAuthClient,
    refresh_token: String,
) -> Result<TokenGrant, ExporterError> {
    let token_response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(describe_token_error)?;

    let expires_in = token_response
        .expires_in()
        .map(|d| d.as_secs())
        .ok_or_else(|| ExporterError::Auth("token response missing expires_in".to_string()))?;

    Ok(TokenGrant {
        access_token: token_response.access_token().secret().to_string(),
        expires_in,
        refresh_token: token_response
            .refresh_token()
            .map(|rt| rt.secret().to_string()),
    })
}

fn describe_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> ExporterError
where
    RE: std::error::Error + 'static,
{
    let message = match err {
        RequestTokenError::ServerResponse(resp) => format!("server rejected refresh: {}", resp),
        RequestTokenError::Request(e) => format!("request failed: {}", e),
        RequestTokenError::Parse(e, body) => format!(
            "unexpected response ({}): {}",
            e,
            String::from_utf8_lossy(&body)
        ),
        RequestTokenError::Other(msg) => msg,
    };
    ExporterError::Auth(message)
}
