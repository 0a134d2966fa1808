//! Release sources.
//!
//! Handlers and the static generator read releases through the
//! [`ReleaseSource`] trait; [`GitHubProvider`] is the production implementation.

mod github;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use github::{GitHubProvider, MAX_PAGES, PER_PAGE};

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format. Expected 'owner/repo'.")
        }
        Ok(RepoId {
            owner: parts[0].to_string(),
            repo: parts[1].to_string(),
        })
    }
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub download_url: String,
}

/// One tagged release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Release {
    /// Git tag, e.g. "v1.6.0"
    pub tag: String,
    /// Release title; upstream sets this to the tag for regular releases
    pub name: Option<String>,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Name shown to users: the release title, or the tag when the title is missing.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag,
        }
    }

    /// Version without its leading `v` ("v1.6.0" becomes "1.6.0").
    pub fn version(&self) -> &str {
        strip_version_prefix(self.display_name())
    }
}

/// Removes a single leading `v` from a version tag.
pub fn strip_version_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Read access to the releases of one repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the first page of releases, as the upstream orders them.
    async fn list_releases(&self) -> Result<Vec<Release>>;

    /// Fetch every release, following pagination.
    async fn list_all_releases(&self) -> Result<Vec<Release>>;

    /// Fetch a single release by version (without the `v` prefix).
    async fn get_release(&self, version: &str) -> Result<Release>;
}
