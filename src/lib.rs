// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # PayPal Reporting Facade
//!
//! A resilient, server-side facade over the PayPal Reporting API.
//! Callers get normalized JSON and predictable failure modes; the facade
//! owns credentials, token refresh, retries, and admission control.
//!
//! ## Features
//!
//! - **OAuth2 Token Lifecycle**: Acquire, cache, and refresh client-credentials tokens
//! - **Bounded Retries**: Exponential backoff for transient upstream failures
//! - **Rate Limiting**: Fixed-window admission control per caller
//! - **Response Normalization**: Recursive camelCase to snake_case key rewriting
//! - **Date-Range Splitting**: Transparent chunking of queries beyond the 31-day cap
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paypal_facade::client::{PayPalClient, TransactionQuery};
//! use paypal_facade::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> paypal_facade::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let client = PayPalClient::new(&settings)?;
//!
//!     // Current account balance, keys normalized to snake_case
//!     let balance = client.get_balance().await?;
//!
//!     // Ranges past 31 days are split, fetched concurrently, and merged
//!     let query = TransactionQuery::new("2025-01-01", "2025-03-01");
//!     let transactions = client.get_transactions(&query).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        HTTP Facade                         │
//! │   GET /health      GET /balance      GET /transactions     │
//! └────────────────────────────┬───────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴──┬───────────────┬────────────┐
//! │  Rate Limit  │     Client     │     HTTP      │    Auth    │
//! ├──────────────┼────────────────┼───────────────┼────────────┤
//! │ Fixed window │ Range split    │ Retry loop    │ OAuth2     │
//! │ Per-IP keys  │ Chunk merge    │ Backoff       │ Cache      │
//! │ Quota headers│ Normalize      │ 401 recovery  │ Refresh    │
//! └──────────────┴────────────────┴───────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the facade
pub mod error;

/// Common types and type aliases
pub mod types;

/// Environment-driven configuration
pub mod config;

/// Response key normalization
pub mod normalize;

/// Fixed-window rate limiting
pub mod rate_limit;

/// OAuth2 token acquisition and caching
pub mod auth;

/// Retrying HTTP requester
pub mod http;

/// High-level reporting client
pub mod client;

/// HTTP facade router and handlers
pub mod server;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{PayPalClient, TransactionQuery};
pub use config::Settings;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
