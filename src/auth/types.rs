//! Credential types
//!
//! A credential pairs an access token with the instant PayPal stops
//! accepting it. Staleness is judged with a safety buffer so the token
//! is replaced shortly before the upstream would reject it.

use chrono::{DateTime, Duration, Utc};

/// Seconds before actual expiry at which a token counts as stale
pub const REFRESH_BUFFER_SECONDS: i64 = 60;

/// An access token together with its expiry instant
#[derive(Debug, Clone)]
pub struct Credential {
    /// The bearer access token
    pub token: String,
    /// When the upstream stops accepting the token
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential with an explicit expiry instant
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Create a credential that expires N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + Duration::seconds(seconds);
        Self { token, expires_at }
    }

    /// Check whether the token is within the refresh buffer of expiry
    pub fn is_stale(&self) -> bool {
        let buffer = Duration::seconds(REFRESH_BUFFER_SECONDS);
        Utc::now() + buffer >= self.expires_at
    }
}
