//! Route handlers and error mapping

use super::AppState;
use crate::client::TransactionQuery;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// `GET /balance`
pub async fn balance(State(state): State<Arc<AppState>>) -> Response {
    match state.client.get_balance().await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Query parameters for `GET /transactions`
#[derive(Debug, Deserialize)]
pub struct TransactionsParams {
    start_date: String,
    end_date: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    transaction_status: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl TransactionsParams {
    /// Check pagination bounds before any upstream work
    fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::invalid_argument("page must be at least 1"));
        }
        if self.page_size < 1 || self.page_size > 100 {
            return Err(Error::invalid_argument(
                "page_size must be between 1 and 100",
            ));
        }
        Ok(())
    }

    fn into_query(self) -> TransactionQuery {
        let mut query = TransactionQuery::new(self.start_date, self.end_date)
            .page(self.page)
            .page_size(self.page_size);
        if let Some(status) = self.transaction_status {
            query = query.status(status);
        }
        query
    }
}

/// `GET /transactions`
pub async fn transactions(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<TransactionsParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return error_response(&Error::invalid_argument(rejection.body_text())),
    };

    if let Err(e) = params.validate() {
        return error_response(&e);
    }

    match state.client.get_transactions(&params.into_query()).await {
        Ok(mut body) => {
            mask_transaction_ids(&mut body);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Map a terminal error onto an external status and JSON body
///
/// The body shape is always `{"detail": ...}`; upstream client errors
/// carry the upstream body through as the detail payload.
pub(super) fn error_response(error: &Error) -> Response {
    let (status, detail) = match error {
        Error::InvalidArgument { message } => (StatusCode::BAD_REQUEST, json!(message)),
        Error::Authentication { message } => (StatusCode::UNAUTHORIZED, json!(message)),
        Error::TokenAcquisition { status, message } => {
            let code = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            (code, json!(message))
        }
        Error::UpstreamClient { status, body } => {
            let code = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            let detail = serde_json::from_str(body).unwrap_or_else(|_| json!(body));
            (code, detail)
        }
        Error::UpstreamUnavailable { message } => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "service_unavailable", "message": message }),
        ),
        // Transport failures that bypass the retry loop, such as a reset
        // mid-response or an undecodable body
        Error::Http(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "service_unavailable", "message": e.to_string() }),
        ),
        Error::RateLimited { reset_at } => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": "rate_limit_exceeded", "reset_at": reset_at.to_rfc3339() }),
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, json!(other.to_string())),
    };

    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Mask the tail of every transaction id in a normalized document
///
/// The last five characters are replaced with asterisks so full ids
/// never leave the facade. Ids of five characters or fewer are left
/// alone. Operates on both the top-level `transaction_id` and the one
/// nested under `transaction_info`.
pub(super) fn mask_transaction_ids(document: &mut JsonValue) {
    let Some(transactions) = document
        .get_mut("transaction_details")
        .and_then(JsonValue::as_array_mut)
    else {
        return;
    };

    for tx in transactions {
        if let Some(info) = tx.get_mut("transaction_info") {
            mask_id_field(info);
        }
        mask_id_field(tx);
    }
}

fn mask_id_field(object: &mut JsonValue) {
    if let Some(id) = object.get_mut("transaction_id") {
        if let Some(masked) = masked_id(id.as_str()) {
            *id = JsonValue::String(masked);
        }
    }
}

fn masked_id(id: Option<&str>) -> Option<String> {
    let id = id?;
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 5 {
        return None;
    }
    let kept: String = chars[..chars.len() - 5].iter().collect();
    Some(format!("{kept}*****"))
}
