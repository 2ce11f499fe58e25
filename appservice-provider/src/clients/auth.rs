//! Bearer tokens for resource manager requests

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::arm::ApiError;
use crate::config::{ConfigError, ProviderConfig};

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

pub enum TokenCredential {
    /// A pre-issued token, used as is
    Static(String),
    ClientSecret(ClientSecretCredential),
}

impl TokenCredential {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        if let Some(token) = &config.access_token {
            return Ok(Self::Static(token.clone()));
        }

        let tenant_id = config
            .tenant_id
            .clone()
            .ok_or(ConfigError::Missing("ARM_TENANT_ID"))?;
        let client_id = config
            .client_id
            .clone()
            .ok_or(ConfigError::Missing("ARM_CLIENT_ID"))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or(ConfigError::Missing("ARM_CLIENT_SECRET"))?;

        let token_url = Url::parse(&format!(
            "{}/{}/oauth2/v2.0/token",
            config.environment.login_endpoint(),
            tenant_id
        ))?;
        let scope = format!(
            "{}/.default",
            config.resource_manager_url()?.as_str().trim_end_matches('/')
        );

        Ok(Self::ClientSecret(ClientSecretCredential {
            http: reqwest::Client::new(),
            token_url,
            client_id,
            client_secret,
            scope,
            cached: Mutex::new(None),
        }))
    }

    pub async fn token(&self) -> Result<String, ApiError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ClientSecret(credential) => credential.token().await,
        }
    }
}

pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

// v1 endpoints send the lifetime as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn as_duration(&self) -> Duration {
        match self {
            Self::Seconds(s) => Duration::from_secs(*s),
            Self::Text(s) => Duration::from_secs(s.parse().unwrap_or_default()),
        }
    }
}

impl ClientSecretCredential {
    async fn token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Instant::now())
        {
            return Ok(token.access_token.clone());
        }

        log::debug!("requesting a new access token from {}", self.token_url);
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "token request failed (HTTP {}): {}",
                status, body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        let token = CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now() + parsed.expires_in.as_duration(),
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
