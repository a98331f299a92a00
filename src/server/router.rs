//! Router construction and server startup

use super::{handlers, middleware::admission};
use crate::client::PayPalClient;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::rate_limit::FixedWindowLimiter;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for all handlers
pub struct AppState {
    /// Upstream client owning the token cache and retry policy
    pub client: PayPalClient,
    /// Per-caller admission control
    pub limiter: FixedWindowLimiter,
}

impl AppState {
    /// Bundle an already-built client and limiter
    pub fn new(client: PayPalClient, limiter: FixedWindowLimiter) -> Self {
        Self { client, limiter }
    }

    /// Build the state a running server needs from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            PayPalClient::new(settings)?,
            FixedWindowLimiter::new(settings.rate_limit_per_minute, settings.rate_window()),
        ))
    }
}

/// Build the facade router
///
/// The two API routes sit behind the admission middleware; the health
/// probe does not.
pub fn router(state: Arc<AppState>) -> Router {
    // Allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/balance", get(handlers::balance))
        .route("/transactions", get(handlers::transactions))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admission,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and block until it exits
pub async fn serve(settings: &Settings) -> Result<()> {
    let state = Arc::new(AppState::from_settings(settings)?);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(mode = %settings.mode, "starting HTTP server on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {}: {e}", settings.port)))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}
