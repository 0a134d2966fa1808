//! GitHub releases API.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use crate::http::HttpClient;

use super::{Release, ReleaseAsset, ReleaseSource, RepoId};

/// Releases requested per page when paginating.
pub const PER_PAGE: usize = 100;

/// Upper bound on pages fetched by [`ReleaseSource::list_all_releases`].
pub const MAX_PAGES: usize = 10;

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        #[serde(default)]
        pub tag_name: String,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        pub browser_download_url: String,
    }
}

/// Reads releases of a single repository from the GitHub REST API.
pub struct GitHubProvider {
    http_client: HttpClient,
    api_url: Url,
    repo: RepoId,
}

impl GitHubProvider {
    pub fn new(http_client: HttpClient, api_url: &str, repo: RepoId) -> Result<Self> {
        let api_url =
            Url::parse(api_url).map_err(|e| anyhow!("Invalid API URL '{}': {}", api_url, e))?;
        if api_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL '{}': not a base URL", api_url);
        }
        Ok(Self {
            http_client,
            api_url,
            repo,
        })
    }

    /// `{api}/repos/{owner}/{repo}/releases`
    pub fn releases_url(&self) -> Url {
        self.endpoint(&["releases"])
    }

    /// `{api}/repos/{owner}/{repo}/releases/tags/v{version}`, with the tag
    /// percent-encoded as a single path segment.
    pub fn tag_url(&self, version: &str) -> Url {
        let tag = format!("v{}", version);
        self.endpoint(&["releases", "tags", tag.as_str()])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Checked in `new`: the URL can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.repo.as_str()])
                .extend(segments);
        }
        url
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<api::Release>> {
        let url = self.releases_url();
        debug!("Fetching releases page {} from {}...", page, url);

        let per_page = PER_PAGE.to_string();
        let page = page.to_string();
        self.http_client
            .get_json_with_query(url, &[("per_page", &per_page), ("page", &page)])
            .await
    }
}

#[async_trait]
impl ReleaseSource for GitHubProvider {
    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    async fn list_releases(&self) -> Result<Vec<Release>> {
        let url = self.releases_url();
        debug!("Fetching releases from {}...", url);

        let releases: Vec<api::Release> = self.http_client.get_json(url).await?;
        Ok(releases.into_iter().map(Release::from).collect())
    }

    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    async fn list_all_releases(&self) -> Result<Vec<Release>> {
        let mut releases = Vec::new();

        for page in 1..=MAX_PAGES {
            let parsed = self.fetch_page(page).await?;
            let len = parsed.len();
            releases.extend(parsed.into_iter().map(Release::from));

            if len < PER_PAGE {
                break;
            }
        }

        debug!("Fetched {} release(s) for {}", releases.len(), self.repo);
        Ok(releases)
    }

    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    async fn get_release(&self, version: &str) -> Result<Release> {
        let url = self.tag_url(version);
        debug!("Fetching release from {}...", url);

        let release: api::Release = self.http_client.get_json(url).await?;
        Ok(release.into())
    }
}

impl From<api::Release> for Release {
    fn from(r: api::Release) -> Self {
        Release {
            tag: r.tag_name,
            name: r.name,
            assets: r.assets.into_iter().map(ReleaseAsset::from).collect(),
        }
    }
}

impl From<api::Asset> for ReleaseAsset {
    fn from(a: api::Asset) -> Self {
        ReleaseAsset {
            name: a.name,
            download_url: a.browser_download_url,
        }
    }
}
