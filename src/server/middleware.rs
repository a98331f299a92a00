//! Admission control middleware
//!
//! Runs in front of the API routes, keyed by client IP. Denials are
//! answered locally with 429 before any upstream I/O; admitted requests
//! and denials alike carry quota metadata in `X-RateLimit-*` headers.

use super::AppState;
use crate::rate_limit::RateLimitDecision;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

/// Per-IP admission check
pub async fn admission(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = addr.ip().to_string();
    let decision = state.limiter.check(&key);

    if !decision.allowed {
        warn!(caller = %key, reset_at = %decision.reset_at, "rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "detail": {
                    "error": "rate_limit_exceeded",
                    "message": "Rate limit exceeded. Please wait before retrying.",
                    "reset_at": decision.reset_at.to_rfc3339(),
                }
            })),
        )
            .into_response();
        apply_quota_headers(&mut response, state.limiter.limit(), &decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_quota_headers(&mut response, state.limiter.limit(), &decision);
    response
}

fn apply_quota_headers(response: &mut Response, limit: u32, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}
