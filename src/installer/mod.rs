//! Installer script dispatch.
//!
//! One [`Installer`] describes which asset to pull from the store and what
//! filename the client downloads it as. Both depend on the client's
//! [`Platform`], so every response varies on `user-agent`.

use anyhow::Result;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use log::{debug, warn};

use crate::asset::AssetStore;
use crate::platform::Platform;

pub const SHELL_SCRIPT: &str = "text/x-shellscript";

/// Where the installer's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTarget {
    /// `<stem>.ps1` for Windows clients, `<stem>.sh` otherwise.
    PerPlatform(&'static str),
    /// The same asset for every platform.
    Fixed(&'static str),
}

/// A parameterized installer dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installer {
    pub target: AssetTarget,
    /// Download filename without extension.
    pub filename_stem: &'static str,
}

/// Served at `/install-opentofu` and its `.sh`/`.ps1` spellings.
pub const INSTALL_OPENTOFU: Installer = Installer {
    target: AssetTarget::PerPlatform("/install-opentofu"),
    filename_stem: "install-opentofu",
};

/// Served at `/`.
pub const OPENTOFU_INSTALL: Installer = Installer {
    target: AssetTarget::Fixed("/index.sh"),
    filename_stem: "opentofu-install",
};

impl Installer {
    pub fn asset_path(&self, platform: Platform) -> String {
        match self.target {
            AssetTarget::PerPlatform(stem) => format!("{}.{}", stem, platform.script_extension()),
            AssetTarget::Fixed(path) => path.to_string(),
        }
    }

    pub fn filename(&self, platform: Platform) -> String {
        format!("{}.{}", self.filename_stem, platform.script_extension())
    }

    /// Fetches the platform's script and wraps it as an attachment.
    ///
    /// A non-success answer from the store is passed through with its status
    /// and body. Errors reaching the store are returned to the caller.
    #[tracing::instrument(skip(self, store), fields(installer = self.filename_stem))]
    pub async fn dispatch(
        &self,
        store: &dyn AssetStore,
        user_agent: Option<&str>,
    ) -> Result<Response> {
        let platform = Platform::from_user_agent(user_agent);
        let path = self.asset_path(platform);
        debug!("Serving {} to {} client", path, platform);

        let asset = store.fetch(&path).await?;

        let mut builder = Response::builder()
            .status(asset.status)
            .header(header::VARY, HeaderValue::from_static("user-agent"));

        if asset.is_success() {
            builder = builder
                .header(header::CONTENT_TYPE, HeaderValue::from_static(SHELL_SCRIPT))
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", self.filename(platform)),
                );
        } else {
            warn!("Asset store answered {} for {}", asset.status, path);
        }

        Ok(builder.body(asset.body)?)
    }
}
