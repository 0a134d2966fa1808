//! Static asset stores.
//!
//! An [`AssetStore`] resolves a request path such as `/install-opentofu.sh`
//! to a streamed body. Missing assets are not errors: the store answers with
//! the status it would serve, and the caller passes it through.

mod dir;
mod origin;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;

pub use dir::DirAssetStore;
pub use origin::HttpAssetStore;

/// A fetched asset: the store's status and an unbuffered body.
pub struct Asset {
    pub status: StatusCode,
    pub body: Body,
}

impl Asset {
    pub fn found(body: Body) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: Body::from("Not Found"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset").field("status", &self.status).finish()
    }
}

/// Fetch-by-path access to static files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Fetch the asset at `path`. Errors mean the store itself could not be
    /// reached; a missing asset is an `Ok` with a non-success status.
    async fn fetch(&self, path: &str) -> Result<Asset>;
}

/// Picks a store for a `--assets` value: URLs select [`HttpAssetStore`],
/// anything else is a local directory.
pub fn from_location(location: &str, client: reqwest::Client) -> Result<Box<dyn AssetStore>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpAssetStore::new(client, location)?))
    } else {
        Ok(Box::new(DirAssetStore::new(location)))
    }
}
