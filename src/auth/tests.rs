//! Tests for the auth module

use super::*;
use crate::error::Error;
use crate::types::Environment;
use base64::Engine;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cache_for(server: &MockServer) -> TokenCache {
    TokenCache::with_client(
        TokenCacheConfig {
            token_url: format!("{}/v1/oauth2/token", server.uri()),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            timeout: Duration::from_secs(5),
        },
        reqwest::Client::new(),
    )
}

fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    })
}

#[tokio::test]
async fn test_token_request_shape() {
    let mock_server = MockServer::start().await;

    let basic = base64::engine::general_purpose::STANDARD.encode("client-id:client-secret");

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .and(header("Authorization", format!("Basic {basic}").as_str()))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);
    let token = cache.get_valid_token(Environment::Sandbox).await.unwrap();

    assert_eq!(token, "token-1");
}

#[tokio::test]
async fn test_token_reused_while_fresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("cached", 3600)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);

    for _ in 0..3 {
        let token = cache.get_valid_token(Environment::Sandbox).await.unwrap();
        assert_eq!(token, "cached");
    }
}

#[tokio::test]
async fn test_stale_token_refetched() {
    let mock_server = MockServer::start().await;

    // expires_in of 30s is inside the 60s refresh buffer, so the cached
    // credential is stale as soon as it is stored
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short-lived", 30)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);

    cache.get_valid_token(Environment::Sandbox).await.unwrap();
    cache.get_valid_token(Environment::Sandbox).await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token", 3600)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);

    cache.get_valid_token(Environment::Sandbox).await.unwrap();
    cache.invalidate(Environment::Sandbox).await;
    cache.get_valid_token(Environment::Sandbox).await.unwrap();
}

#[tokio::test]
async fn test_environments_cached_separately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token", 3600)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);

    cache.get_valid_token(Environment::Sandbox).await.unwrap();
    cache.get_valid_token(Environment::Live).await.unwrap();
    // Both cached now; no further requests
    cache.get_valid_token(Environment::Sandbox).await.unwrap();
    cache.get_valid_token(Environment::Live).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_reads_share_one_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("shared", 3600)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = std::sync::Arc::new(cache_for(&mock_server));

    let a = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_valid_token(Environment::Sandbox).await })
    };
    let b = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_valid_token(Environment::Sandbox).await })
    };

    assert_eq!(a.await.unwrap().unwrap(), "shared");
    assert_eq!(b.await.unwrap().unwrap(), "shared");
}

#[tokio::test]
async fn test_rejected_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "Client Authentication failed"
        })))
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);
    let err = cache
        .get_valid_token(Environment::Sandbox)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TokenAcquisition {
            status: Some(401),
            ..
        }
    ));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_unreachable_token_endpoint() {
    let cache = TokenCache::with_client(
        TokenCacheConfig {
            token_url: "http://127.0.0.1:1/v1/oauth2/token".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            timeout: Duration::from_secs(1),
        },
        reqwest::Client::new(),
    );

    let err = cache
        .get_valid_token(Environment::Sandbox)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TokenAcquisition { status: None, .. }));
}

#[tokio::test]
async fn test_missing_expires_in_uses_paypal_default() {
    let mock_server = MockServer::start().await;

    // Response without expires_in; the nine-hour default keeps the
    // credential fresh, so a second read is served from cache
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "no-expiry",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = cache_for(&mock_server);

    cache.get_valid_token(Environment::Sandbox).await.unwrap();
    let token = cache.get_valid_token(Environment::Sandbox).await.unwrap();
    assert_eq!(token, "no-expiry");
}
