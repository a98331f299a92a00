//! HTTP facade
//!
//! The boundary layer: an axum router exposing the two read operations
//! plus a health probe. Rate-limit admission runs per client IP before
//! any upstream work begins, and terminal client errors are mapped onto
//! externally visible status codes.
//!
//! # Routes
//!
//! - `GET /health` - liveness probe, never rate limited
//! - `GET /balance` - normalized balance document
//! - `GET /transactions` - normalized transaction search

mod handlers;
mod middleware;
mod router;

pub use router::{router, serve, AppState};
