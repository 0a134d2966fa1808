//! Upstream client configuration shared by `serve` and `generate`.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::http::{HttpClient, RetryPolicy};
use crate::provider::{GitHubProvider, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "opentofu/opentofu";

/// The upstream API rejects requests without an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "OpenTofu Releases Page";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub repo: RepoId,
    pub user_agent: String,
    pub token: Option<String>,
    /// `None` waits on the upstream indefinitely.
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl UpstreamConfig {
    /// Builds the shared reqwest client: user agent, optional bearer token
    /// and request timeout.
    pub fn client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("GITHUB_TOKEN is not a valid header value")?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication");
        }

        let mut builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().context("Failed to build HTTP client")
    }

    pub fn provider(&self, client: Client) -> Result<GitHubProvider> {
        let http_client = HttpClient::with_policy(client, self.retry);
        GitHubProvider::new(http_client, &self.api_url, self.repo.clone())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repo: RepoId {
                owner: "opentofu".to_string(),
                repo: "opentofu".to_string(),
            },
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            retry: RetryPolicy::default(),
        }
    }
}

/// Maps a timeout in seconds to a client timeout; 0 disables it.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
