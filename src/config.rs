//! Runtime configuration
//!
//! Settings are read from environment variables (with `.env` support via
//! the binary entrypoint) and validated once at startup. Missing or empty
//! credentials are a fatal startup error, never a runtime one.

use crate::error::{Error, Result};
use crate::types::Environment;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Settings
// ============================================================================

/// Validated runtime settings for the facade
#[derive(Debug, Clone)]
pub struct Settings {
    /// PayPal REST client id
    pub client_id: String,

    /// PayPal REST client secret
    pub client_secret: String,

    /// Environment the facade talks to (selects the API host)
    pub mode: Environment,

    /// Port the facade listens on
    pub port: u16,

    /// Per-caller admission quota, requests per minute
    pub rate_limit_per_minute: u32,

    /// Total upstream attempts per resource call (first try included)
    pub max_retries: u32,

    /// Initial retry delay in milliseconds; doubles per attempt
    pub retry_base_delay_ms: u64,

    /// Timeout for resource requests, seconds
    pub request_timeout_secs: u64,

    /// Timeout for token-endpoint requests, seconds
    pub token_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            mode: Environment::default(),
            port: default_port(),
            rate_limit_per_minute: default_rate_limit(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            request_timeout_secs: default_request_timeout(),
            token_timeout_secs: default_token_timeout(),
        }
    }
}

fn default_port() -> u16 {
    8000
}

fn default_rate_limit() -> u32 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    30
}

fn default_token_timeout() -> u64 {
    5
}

impl Settings {
    /// Load settings from the process environment and validate them
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            client_id: required_var("PAYPAL_CLIENT_ID")?,
            client_secret: required_var("PAYPAL_CLIENT_SECRET")?,
            mode: parsed_var("PAYPAL_MODE", Environment::default())?,
            port: parsed_var("PORT", default_port())?,
            rate_limit_per_minute: parsed_var("RATE_LIMIT_PER_MINUTE", default_rate_limit())?,
            max_retries: parsed_var("MAX_RETRIES", default_max_retries())?,
            retry_base_delay_ms: parsed_var(
                "RETRY_BASE_DELAY_MS",
                default_retry_base_delay_ms(),
            )?,
            request_timeout_secs: parsed_var("REQUEST_TIMEOUT_SECS", default_request_timeout())?,
            token_timeout_secs: parsed_var("TOKEN_TIMEOUT_SECS", default_token_timeout())?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate field values and the derived URLs
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::config("PAYPAL_CLIENT_ID must not be empty"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::config("PAYPAL_CLIENT_SECRET must not be empty"));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(Error::config("RATE_LIMIT_PER_MINUTE must be at least 1"));
        }
        if self.max_retries == 0 {
            return Err(Error::config("MAX_RETRIES must be at least 1"));
        }
        if self.request_timeout_secs == 0 || self.token_timeout_secs == 0 {
            return Err(Error::config("Timeouts must be at least 1 second"));
        }
        url::Url::parse(self.base_url())?;
        Ok(())
    }

    /// Base URL of the PayPal REST API for the configured mode
    pub fn base_url(&self) -> &'static str {
        self.mode.base_url()
    }

    /// Token endpoint URL for the configured mode
    pub fn token_url(&self) -> String {
        format!("{}/v1/oauth2/token", self.base_url())
    }

    /// Resource request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token request timeout
    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }

    /// Initial retry delay
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Length of one rate-limit window
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(60)
    }
}

// ============================================================================
// Environment helpers
// ============================================================================

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!(
            "Missing required environment variable {name}"
        ))),
    }
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
