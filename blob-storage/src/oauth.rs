use std::time::Duration;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("oauth: endpoint is not configured")]
    EmptyEndpoint,

    #[error("oauth: invalid credentials")]
    InvalidCredentials,

    #[error("oauth: bad request ({0})")]
    BadRequest(StatusCode),

    #[error("oauth: server error ({0})")]
    Server(StatusCode),

    #[error("oauth: unable to parse response")]
    Parse(#[source] serde_json::Error),

    #[error("oauth: request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Issues access tokens for the keeper API.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    url: String,
    client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, OAuthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Exchanges a username and password for a token (password grant).
    pub async fn password_token(&self, username: &str, password: &str) -> Result<TokenResponse, OAuthError> {
        if self.url.is_empty() {
            return Err(OAuthError::EmptyEndpoint);
        }

        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ];
        let response = self
            .client
            .post(format!("{}/oauth/token", self.url))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(OAuthError::InvalidCredentials);
        }
        if status.is_client_error() {
            return Err(OAuthError::BadRequest(status));
        }
        if status.is_server_error() {
            return Err(OAuthError::Server(status));
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(OAuthError::Parse)?;
        tracing::debug!("issued {} token expiring in {}s", token.token_type, token.expires_in);
        Ok(token)
    }
}
