//! OAuth2 token acquisition and caching
//!
//! Implements the client-credentials flow against the PayPal token
//! endpoint. Credentials are cached per environment so sandbox and live
//! tokens never mix, and a refresh runs under the write lock so
//! concurrent callers trigger at most one token request.

use super::types::Credential;
use crate::error::{Error, Result};
use crate::types::Environment;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Lifetime assumed when the token response omits `expires_in`.
/// PayPal issues nine-hour tokens.
const DEFAULT_EXPIRES_IN: i64 = 32_400;

/// Connection settings for the token endpoint
#[derive(Debug, Clone)]
pub struct TokenCacheConfig {
    /// Full URL of the OAuth2 token endpoint
    pub token_url: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Timeout for token requests
    pub timeout: Duration,
}

/// Cached OAuth2 credentials, one per environment
pub struct TokenCache {
    config: TokenCacheConfig,
    credentials: Arc<RwLock<HashMap<Environment, Credential>>>,
    http: Client,
}

impl TokenCache {
    /// Create a token cache with its own HTTP client
    pub fn new(config: TokenCacheConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;
        Ok(Self::with_client(config, http))
    }

    /// Create a token cache that issues requests through `http`
    pub fn with_client(config: TokenCacheConfig, http: Client) -> Self {
        Self {
            config,
            credentials: Arc::new(RwLock::new(HashMap::new())),
            http,
        }
    }

    /// Return a token valid for `environment`, fetching one if needed
    pub async fn get_valid_token(&self, environment: Environment) -> Result<String> {
        {
            let credentials = self.credentials.read().await;
            if let Some(credential) = credentials.get(&environment) {
                if !credential.is_stale() {
                    debug!(environment = %environment, "token cache hit");
                    return Ok(credential.token.clone());
                }
            }
        }

        let mut credentials = self.credentials.write().await;

        // Double-check after acquiring the write lock; another task may
        // have refreshed while we waited
        if let Some(credential) = credentials.get(&environment) {
            if !credential.is_stale() {
                return Ok(credential.token.clone());
            }
        }

        info!(environment = %environment, "fetching new access token");
        let credential = self.fetch_credential().await?;
        let token = credential.token.clone();
        credentials.insert(environment, credential);

        Ok(token)
    }

    /// Drop the cached credential for `environment`
    ///
    /// The next read for that environment fetches a fresh token.
    pub async fn invalidate(&self, environment: Environment) {
        let mut credentials = self.credentials.write().await;
        credentials.remove(&environment);
    }

    /// Request a fresh token via the client-credentials grant
    async fn fetch_credential(&self) -> Result<Credential> {
        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| Error::token_acquisition(None, format!("Token request failed: {e}")))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_acquisition(
                status,
                format!("Token request failed with status {status}: {body}"),
            ));
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        debug!(
            expires_in = token_response.expires_in,
            "access token obtained"
        );

        Ok(Credential::expires_in(
            token_response.access_token,
            token_response.expires_in,
        ))
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.config.token_url)
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}

/// Successful response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN
}
