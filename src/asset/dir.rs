use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use futures_util::{Stream, stream};
use log::debug;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::{Asset, AssetStore};

const CHUNK_SIZE: usize = 16 * 1024;

/// Serves assets from a local directory.
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request path onto the root. Paths that would leave the root
    /// (`..`, absolute components) resolve to nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<Asset> {
        let Some(file_path) = self.resolve(path) else {
            debug!("Rejected asset path {}", path);
            return Ok(Asset::not_found());
        };

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Asset {:?} not found", file_path);
                return Ok(Asset::not_found());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open asset {:?}", file_path));
            }
        };

        let metadata = file
            .metadata()
            .await
            .with_context(|| format!("Failed to stat asset {:?}", file_path))?;
        if !metadata.is_file() {
            return Ok(Asset::not_found());
        }

        Ok(Asset::found(Body::from_stream(file_chunks(file))))
    }
}

/// Reads a file in fixed-size chunks without loading it whole.
fn file_chunks(file: File) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok::<_, io::Error>(Some((Bytes::from(buf), file)))
    })
}
