//! Upstream HTTP client with timeout-aware retry and error classification.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{NonRetryableError, RetryPolicy};
