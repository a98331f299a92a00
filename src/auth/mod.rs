//! OAuth2 authentication
//!
//! PayPal issues access tokens through the client-credentials flow. The
//! `TokenCache` fetches one credential per environment, caches it until
//! shortly before expiry, and hands out bearer tokens to the HTTP layer.

mod token_cache;
mod types;

pub use token_cache::{TokenCache, TokenCacheConfig};
pub use types::{Credential, REFRESH_BUFFER_SECONDS};

#[cfg(test)]
mod tests;
