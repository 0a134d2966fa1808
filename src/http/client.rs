//! JSON client for upstream APIs with a bounded retry policy.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use super::retry::{NonRetryableError, RetryPolicy, check_retryable};

/// HTTP client that retries transient failures according to a [`RetryPolicy`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Wraps a reqwest client with the default policy (no retries).
    pub fn new(client: Client) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, url, query), fields(url = %url))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        self.with_retry("GET JSON", || async {
            let response = self
                .client
                .get(url.clone())
                .query(query)
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", url))?;

            let response = response.error_for_status().map_err(check_retryable)?;

            response
                .json::<T>()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url))
        })
        .await
    }

    /// Executes an async operation, retrying transient failures.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !is_retryable_error(&e) => {
                    debug!("{}: non-retryable error: {:#}", operation_name, e);
                    return Err(e);
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} failed ({:#}), retrying in {:?}...",
                        operation_name, attempt, attempts, e, self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
