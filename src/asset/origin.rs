use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::body::Body;
use log::debug;
use reqwest::{Client, Url};

use super::{Asset, AssetStore};

/// Fetches assets from a static origin over HTTP.
///
/// The origin's status and body are passed through unchanged, so a 404 from
/// the origin reaches the client as a 404.
pub struct HttpAssetStore {
    client: Client,
    base: Url,
}

impl HttpAssetStore {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        let mut base =
            Url::parse(base).map_err(|e| anyhow!("Invalid asset origin '{}': {}", base, e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid asset path {}", path))
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<Asset> {
        let url = self.url_for(path)?;
        debug!("Fetching asset from {}...", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch asset from {}", url))?;

        Ok(Asset {
            status: response.status(),
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}
