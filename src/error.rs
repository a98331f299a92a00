//! Error types for the PayPal facade
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The main error type for the PayPal facade
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Caller Input Errors
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Token acquisition failed: {message}")]
    TokenAcquisition {
        status: Option<u16>,
        message: String,
    },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ============================================================================
    // Upstream Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream HTTP {status}: {body}")]
    UpstreamClient { status: u16, body: String },

    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    // ============================================================================
    // Local Admission Errors
    // ============================================================================
    #[error("Rate limit exceeded, window resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    // ============================================================================
    // Serialization / I/O Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a token-acquisition error
    pub fn token_acquisition(status: impl Into<Option<u16>>, message: impl Into<String>) -> Self {
        Self::TokenAcquisition {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an upstream client error (4xx other than 401)
    pub fn upstream_client(status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamClient {
            status,
            body: body.into(),
        }
    }

    /// Create an upstream-unavailable error
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Only transient upstream conditions qualify: 5xx responses and
    /// transport-level failures (timeout, connection refused). Credential
    /// and caller-input failures never retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::UpstreamUnavailable { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    (500..=599).contains(&status)
}

/// Result type alias for the PayPal facade
pub type Result<T> = std::result::Result<T, Error>;
