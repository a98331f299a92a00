//! PayPal client
//!
//! Composition root for the upstream side: wires the token cache and
//! the retrying requester together and exposes the two read operations,
//! balance lookup and transaction search. Transaction searches spanning
//! more than 31 days fan out into concurrent chunked calls whose
//! results are merged into a single document.

mod date_range;

use crate::auth::{TokenCache, TokenCacheConfig};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::http::{RequesterConfig, RetryingRequester};
use crate::normalize::snake_case_keys;
use crate::types::{BackoffType, Environment, JsonValue, Method};
use date_range::{parse_timestamp, span_days, split_date_range, MAX_DATE_RANGE_DAYS};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Upper bound on in-flight chunk requests per transaction search
const MAX_CONCURRENT_REQUESTS: usize = 2;

/// Parameters for a transaction search
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    /// Start of the queried range, as supplied by the caller
    pub start_date: String,
    /// End of the queried range, as supplied by the caller
    pub end_date: String,
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Optional status filter, passed through to the upstream
    pub transaction_status: Option<String>,
}

impl TransactionQuery {
    /// Create a query over `[start_date, end_date]` with default paging
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            page: 1,
            page_size: 20,
            transaction_status: None,
        }
    }

    /// Set the page number
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Filter by transaction status
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.transaction_status = Some(status.into());
        self
    }
}

/// Read-only client for the PayPal Reporting API
pub struct PayPalClient {
    requester: RetryingRequester,
    environment: Environment,
}

impl PayPalClient {
    /// Create a client targeting the environment's default host
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_base_url(settings, settings.base_url())
    }

    /// Create a client targeting `base_url` instead of the
    /// environment's default host
    pub fn with_base_url(settings: &Settings, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(Error::Http)?;

        let tokens = Arc::new(TokenCache::with_client(
            TokenCacheConfig {
                token_url: format!("{}/v1/oauth2/token", base_url.trim_end_matches('/')),
                client_id: settings.client_id.clone(),
                client_secret: settings.client_secret.clone(),
                timeout: settings.token_timeout(),
            },
            http.clone(),
        ));

        let requester = RetryingRequester::with_client(
            RequesterConfig {
                base_url,
                max_retries: settings.max_retries,
                base_delay: settings.retry_base_delay(),
                max_delay: Duration::from_secs(60),
                backoff: BackoffType::Exponential,
                timeout: settings.request_timeout(),
            },
            tokens,
            http,
        );

        Ok(Self {
            requester,
            environment: settings.mode,
        })
    }

    /// Fetch account balances, normalized to snake_case keys
    pub async fn get_balance(&self) -> Result<JsonValue> {
        let body = self
            .requester
            .call(
                Method::GET,
                "/v1/reporting/balances",
                &[],
                self.environment,
            )
            .await?;
        Ok(snake_case_keys(body))
    }

    /// Search transactions over a date range, normalized to snake_case
    ///
    /// Ranges wider than the upstream's 31-day cap are split into
    /// contiguous chunks fetched concurrently and merged. Any chunk
    /// failure fails the whole search; there is no partial result.
    pub async fn get_transactions(&self, query: &TransactionQuery) -> Result<JsonValue> {
        let start = parse_timestamp(&query.start_date).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Invalid date format. Expected ISO 8601 (e.g. '2025-12-29T21:00:00Z'), \
                 got start_date={}",
                query.start_date
            ))
        })?;
        let end = parse_timestamp(&query.end_date).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Invalid date format. Expected ISO 8601 (e.g. '2025-12-29T21:00:00Z'), \
                 got end_date={}",
                query.end_date
            ))
        })?;

        let days = span_days(start, end);
        if days <= MAX_DATE_RANGE_DAYS {
            debug!("date range is {days} days, single request");
            let body = self
                .fetch_chunk(&query.start_date, &query.end_date, query)
                .await?;
            return Ok(snake_case_keys(body));
        }

        let ranges = split_date_range(start, end);
        info!(
            "date range is {days} days, splitting into {} chunks",
            ranges.len()
        );

        let chunks: Vec<JsonValue> = stream::iter(ranges)
            .map(|(chunk_start, chunk_end)| async move {
                self.fetch_chunk(&chunk_start, &chunk_end, query)
                    .await
                    .map(snake_case_keys)
            })
            .buffered(MAX_CONCURRENT_REQUESTS)
            .try_collect()
            .await?;

        let merged = merge_chunks(&chunks, days);
        info!(
            "merged {} chunks into {} transactions",
            chunks.len(),
            merged["transaction_details"]
                .as_array()
                .map_or(0, Vec::len)
        );
        Ok(merged)
    }

    /// One upstream transaction call over a single in-cap range
    async fn fetch_chunk(
        &self,
        start_date: &str,
        end_date: &str,
        query: &TransactionQuery,
    ) -> Result<JsonValue> {
        let mut params = vec![
            ("start_date".to_string(), start_date.to_string()),
            ("end_date".to_string(), end_date.to_string()),
            ("page".to_string(), query.page.to_string()),
            ("page_size".to_string(), query.page_size.to_string()),
        ];
        if let Some(status) = &query.transaction_status {
            params.push(("transaction_status".to_string(), status.clone()));
        }

        self.requester
            .call(
                Method::GET,
                "/v1/reporting/transactions",
                &params,
                self.environment,
            )
            .await
    }
}

impl std::fmt::Debug for PayPalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalClient")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Merge normalized chunk responses into one transaction document
///
/// Transaction lists concatenate in chunk order and item counts sum.
/// Page metadata is collapsed since pagination is not meaningful across
/// merged chunks.
fn merge_chunks(chunks: &[JsonValue], days: i64) -> JsonValue {
    let mut transactions = Vec::new();
    let mut total_items: i64 = 0;

    for chunk in chunks {
        if let Some(details) = chunk.get("transaction_details").and_then(JsonValue::as_array) {
            transactions.extend(details.iter().cloned());
        }
        if let Some(count) = chunk.get("total_items").and_then(JsonValue::as_i64) {
            total_items += count;
        }
    }

    json!({
        "transaction_details": transactions,
        "total_items": total_items,
        "total_pages": 1,
        "_chunks": chunks.len(),
        "_date_range_days": days,
    })
}
