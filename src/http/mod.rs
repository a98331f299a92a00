//! Upstream HTTP layer
//!
//! One requester handles every call against the PayPal REST API:
//! bearer authorization, bounded retries with backoff, and a single
//! forced re-authentication on 401.

mod requester;

pub use requester::{RequesterConfig, RetryingRequester};
