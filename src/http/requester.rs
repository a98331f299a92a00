//! Authorized requests with bounded retries
//!
//! Every resource call goes through here: acquire a bearer token, issue
//! the request, and classify the outcome. Transient failures (5xx,
//! timeouts, refused connections) are retried with exponential backoff
//! up to a fixed number of total attempts. A 401 is handled separately:
//! it is a credential problem solvable by exactly one forced token
//! refresh, not a transient condition solvable by waiting, so it gets
//! one retry outside the backoff budget and is terminal after that.

use crate::auth::TokenCache;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::{BackoffType, Environment, JsonValue, Method};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the requester
#[derive(Debug, Clone)]
pub struct RequesterConfig {
    /// Base URL all resource paths are resolved against
    pub base_url: String,
    /// Total attempts per call, first try included
    pub max_retries: u32,
    /// Initial delay for backoff
    pub base_delay: Duration,
    /// Maximum delay for backoff
    pub max_delay: Duration,
    /// Type of backoff strategy
    pub backoff: BackoffType,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            base_url: Environment::Sandbox.base_url().to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            backoff: BackoffType::Exponential,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Issues bearer-authorized calls against the upstream API
pub struct RetryingRequester {
    client: Client,
    tokens: Arc<TokenCache>,
    config: RequesterConfig,
}

impl RetryingRequester {
    /// Create a requester with its own HTTP client
    pub fn new(config: RequesterConfig, tokens: Arc<TokenCache>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;
        Ok(Self::with_client(config, tokens, client))
    }

    /// Create a requester that sends through `client`
    pub fn with_client(config: RequesterConfig, tokens: Arc<TokenCache>, client: Client) -> Self {
        Self {
            client,
            tokens,
            config,
        }
    }

    /// Execute one authorized call and return the parsed JSON body
    ///
    /// Token acquisition failures propagate immediately; they are not
    /// covered by the retry budget.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        environment: Environment,
    ) -> Result<JsonValue> {
        let url = self.build_url(path);
        let mut reauthed = false;
        let mut attempt = 0;
        let mut last_failure: Option<String> = None;

        while attempt < self.config.max_retries {
            let token = self.tokens.get_valid_token(environment).await?;

            let mut request = self
                .client
                .request(method.into(), &url)
                .bearer_auth(&token)
                .timeout(self.config.timeout);
            if !query.is_empty() {
                request = request.query(query);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED {
                        if !reauthed {
                            warn!(%url, "got 401, invalidating token and retrying once");
                            self.tokens.invalidate(environment).await;
                            reauthed = true;
                            // Not counted against the retry budget
                            continue;
                        }
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::authentication(format!(
                            "Still unauthorized after forced token refresh: {body}"
                        )));
                    }

                    if is_retryable_status(status.as_u16()) {
                        let body = response.text().await.unwrap_or_default();
                        warn!(
                            "{} {} returned {} (attempt {}/{})",
                            method,
                            url,
                            status.as_u16(),
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_failure =
                            Some(format!("upstream returned {}: {body}", status.as_u16()));
                    } else if status.is_client_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::upstream_client(status.as_u16(), body));
                    } else {
                        let body = response.json().await.map_err(Error::Http)?;
                        debug!("{} {} succeeded", method, url);
                        return Ok(body);
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    warn!(
                        "{} {} failed: {} (attempt {}/{})",
                        method,
                        url,
                        e,
                        attempt + 1,
                        self.config.max_retries
                    );
                    last_failure = Some(e.to_string());
                }
                Err(e) => return Err(Error::Http(e)),
            }

            attempt += 1;
            if attempt < self.config.max_retries {
                let delay = self.calculate_backoff(attempt - 1);
                debug!("retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
        }

        let detail = last_failure.unwrap_or_else(|| "no attempt completed".to_string());
        Err(Error::upstream_unavailable(format!(
            "giving up after {} attempts: {detail}",
            self.config.max_retries
        )))
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff {
            BackoffType::Constant => self.config.base_delay,
            BackoffType::Linear => self.config.base_delay * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.base_delay * factor
            }
        };

        std::cmp::min(delay, self.config.max_delay)
    }

    /// Build full URL from a resource path
    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for RetryingRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingRequester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
