//! Integration tests using a mock upstream
//!
//! Tests the full end-to-end flow: HTTP request → admission → token
//! acquisition → upstream fetch → normalized JSON response

use paypal_facade::client::PayPalClient;
use paypal_facade::config::Settings;
use paypal_facade::rate_limit::FixedWindowLimiter;
use paypal_facade::server::{router, AppState};
use paypal_facade::types::Environment;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings() -> Settings {
    Settings {
        client_id: "integration-id".to_string(),
        client_secret: "integration-secret".to_string(),
        mode: Environment::Sandbox,
        port: 0,
        rate_limit_per_minute: 60,
        max_retries: 2,
        retry_base_delay_ms: 1,
        request_timeout_secs: 5,
        token_timeout_secs: 5,
    }
}

/// Serve the facade against `upstream` on an ephemeral port
async fn start_facade(upstream: &MockServer, limit: u32) -> SocketAddr {
    let settings = test_settings();
    let client = PayPalClient::with_base_url(&settings, upstream.uri()).unwrap();
    let limiter = FixedWindowLimiter::new(limit, Duration::from_secs(60));
    let app = router(Arc::new(AppState::new(client, limiter)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .and(basic_auth("integration-id", "integration-secret"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "integration-token",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Balance
// ============================================================================

#[tokio::test]
async fn test_balance_end_to_end() {
    let upstream = MockServer::start().await;
    mount_token_endpoint(&upstream).await;

    Mock::given(method("GET"))
        .and(path("/v1/reporting/balances"))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [
                {
                    "currency": "USD",
                    "totalBalance": {"currencyCode": "USD", "value": "100.00"},
                    "availableBalance": {"currencyCode": "USD", "value": "90.00"}
                }
            ],
            "accountId": "ACCT123"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_facade(&upstream, 60).await;
    let response = reqwest::get(format!("http://{addr}/balance")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-ratelimit-limit"], "60");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "59");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["account_id"], "ACCT123");
    assert_eq!(body["balances"][0]["total_balance"]["currency_code"], "USD");
    assert_eq!(body["balances"][0]["available_balance"]["value"], "90.00");
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_transactions_passthrough_end_to_end() {
    let upstream = MockServer::start().await;
    mount_token_endpoint(&upstream).await;

    Mock::given(method("GET"))
        .and(path("/v1/reporting/transactions"))
        .and(query_param("start_date", "2025-01-01T00:00:00Z"))
        .and(query_param("end_date", "2025-01-20T00:00:00Z"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionDetails": [
                {"transactionInfo": {"transactionId": "TX123456789", "transactionAmount": {"value": "5.00"}}}
            ],
            "totalItems": 1,
            "page": 2
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_facade(&upstream, 60).await;
    let url = format!(
        "http://{addr}/transactions?start_date=2025-01-01T00:00:00Z&end_date=2025-01-20T00:00:00Z&page=2&page_size=50"
    );
    let response = reqwest::get(url).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    // Keys normalized, transaction id masked on the way out
    assert_eq!(body["total_items"], 1);
    assert_eq!(
        body["transaction_details"][0]["transaction_info"]["transaction_id"],
        "TX1234*****"
    );
    assert_eq!(
        body["transaction_details"][0]["transaction_info"]["transaction_amount"]["value"],
        "5.00"
    );
}

#[tokio::test]
async fn test_wide_range_split_and_merged_end_to_end() {
    let upstream = MockServer::start().await;
    mount_token_endpoint(&upstream).await;

    // 50 days, so the facade fetches two chunks and merges them
    Mock::given(method("GET"))
        .and(path("/v1/reporting/transactions"))
        .and(query_param("start_date", "2025-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionDetails": [{"transactionInfo": {"transactionId": "FIRST000001"}}],
            "totalItems": 1
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/reporting/transactions"))
        .and(query_param("start_date", "2025-02-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionDetails": [{"transactionInfo": {"transactionId": "SECOND00002"}}],
            "totalItems": 1
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_facade(&upstream, 60).await;
    let url = format!("http://{addr}/transactions?start_date=2025-01-01&end_date=2025-02-20");
    let response = reqwest::get(url).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["_chunks"], 2);
    assert_eq!(body["_date_range_days"], 50);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["transaction_details"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["transaction_details"][0]["transaction_info"]["transaction_id"],
        "FIRST0*****"
    );
}

#[tokio::test]
async fn test_invalid_range_rejected_end_to_end() {
    let upstream = MockServer::start().await;
    let addr = start_facade(&upstream, 60).await;

    let url = format!("http://{addr}/transactions?start_date=not-a-date&end_date=2025-01-05");
    let response = reqwest::get(url).await.unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Invalid date format"));
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_end_to_end() {
    let upstream = MockServer::start().await;
    mount_token_endpoint(&upstream).await;

    Mock::given(method("GET"))
        .and(path("/v1/reporting/balances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balances": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_facade(&upstream, 1).await;

    let first = reqwest::get(format!("http://{addr}/balance")).await.unwrap();
    assert_eq!(first.status(), 200);

    let second = reqwest::get(format!("http://{addr}/balance")).await.unwrap();
    assert_eq!(second.status(), 429);
    assert_eq!(second.headers()["x-ratelimit-remaining"], "0");

    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["detail"]["error"], "rate_limit_exceeded");

    // The health probe stays reachable when the quota is spent
    let health = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(health.status(), 200);
}
