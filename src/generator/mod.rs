//! Static releases site.
//!
//! Renders every release into a directory tree that a plain file server can
//! host: `api.json`, a top-level `index.html` and one `<version>/index.html`
//! per release.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::provider::{Release, ReleaseSource, RepoId};
use crate::render::escape;

pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com";

/// Contents of `api.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub versions: Vec<Version>,
}

/// File list of a single version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub id: String,
    pub files: Vec<String>,
}

impl Index {
    pub fn from_releases(releases: &[Release]) -> Self {
        let versions = releases
            .iter()
            .filter_map(|release| {
                let tag = if release.tag.is_empty() {
                    release.display_name()
                } else {
                    release.tag.as_str()
                };
                let id = tag.trim_start_matches('v');
                if !is_safe_id(id) {
                    warn!("Skipping release with unusable tag {:?}", tag);
                    return None;
                }
                Some(Version {
                    id: id.to_string(),
                    files: release.assets.iter().map(|a| a.name.clone()).collect(),
                })
            })
            .collect();
        Self { versions }
    }
}

/// Version ids become directory names.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

/// Builds the site from a [`ReleaseSource`].
pub struct Generator<S> {
    source: S,
    repo: RepoId,
    download_url: String,
}

impl<S: ReleaseSource> Generator<S> {
    pub fn new(source: S, repo: RepoId, download_url: &str) -> Self {
        Self {
            source,
            repo,
            download_url: download_url.trim_end_matches('/').to_string(),
        }
    }

    /// Produces every file of the site, keyed by relative path.
    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    pub async fn generate(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        let releases = self
            .source
            .list_all_releases()
            .await
            .context("failed to fetch releases")?;
        let index = Index::from_releases(&releases);
        debug!("Rendering {} version(s)", index.versions.len());

        let mut files = BTreeMap::new();
        files.insert(
            "api.json".to_string(),
            serde_json::to_vec(&index).context("failed to serialize api.json")?,
        );
        files.insert("index.html".to_string(), self.index_page(&index).into_bytes());
        for version in &index.versions {
            files.insert(
                format!("{}/index.html", version.id),
                self.version_page(version).into_bytes(),
            );
        }
        Ok(files)
    }

    fn index_page(&self, index: &Index) -> String {
        let items: String = index
            .versions
            .iter()
            .map(|v| {
                let id = escape(&v.id);
                format!("<li><a href=\"/tofu/{0}/\">tofu_{0}</a></li>\n", id)
            })
            .collect();
        site_page(&format!("{} releases", self.repo.repo), &items)
    }

    fn version_page(&self, version: &Version) -> String {
        let mut items = String::from("<li><a href=\"../\">../</a></li>\n");
        for file in &version.files {
            items.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape(&self.download_link(&version.id, file)),
                escape(file)
            ));
        }
        site_page(&format!("{} {}", self.repo.repo, version.id), &items)
    }

    /// `{download}/{owner}/{repo}/releases/download/v{id}/{file}`
    pub fn download_link(&self, id: &str, file: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/v{}/{}",
            self.download_url, self.repo.owner, self.repo.repo, id, file
        )
    }
}

fn site_page(title: &str, items: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<ul>\n{}</ul>\n</body>\n</html>\n",
        escape(title),
        items
    )
}

/// Writes generated files below `dir`, creating directories as needed.
pub async fn write_site(dir: &Path, files: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    for (name, contents) in files {
        let target = dir.join(name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Could not create directory for file {:?}", target))?;
        }
        tokio::fs::write(&target, contents)
            .await
            .with_context(|| format!("Could not write file {:?}", target))?;
    }
    info!("Wrote {} file(s) to {:?}", files.len(), dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockReleaseSource, ReleaseAsset};
    use tempfile::tempdir;

    fn release(tag: &str, files: &[&str]) -> Release {
        Release {
            tag: tag.to_string(),
            name: Some(tag.to_string()),
            assets: files
                .iter()
                .map(|f| ReleaseAsset {
                    name: f.to_string(),
                    download_url: format!("https://example/{}", f),
                })
                .collect(),
        }
    }

    fn generator(releases: Vec<Release>) -> Generator<MockReleaseSource> {
        let mut source = MockReleaseSource::new();
        source
            .expect_list_all_releases()
            .times(1)
            .returning(move || Ok(releases.clone()));
        Generator::new(source, "opentofu/opentofu".parse().unwrap(), DEFAULT_DOWNLOAD_URL)
    }

    #[tokio::test]
    async fn test_generate_api_json() {
        let files = generator(vec![release("v1.0.0", &["tofu_v1.0.0.tar.gz"])])
            .generate()
            .await
            .unwrap();

        let api: serde_json::Value = serde_json::from_slice(&files["api.json"]).unwrap();
        assert_eq!(
            api,
            serde_json::json!({"versions": [{"id": "1.0.0", "files": ["tofu_v1.0.0.tar.gz"]}]})
        );
    }

    #[tokio::test]
    async fn test_generate_index() {
        let files = generator(vec![release("v1.0.0", &[]), release("v0.9.0", &[])])
            .generate()
            .await
            .unwrap();

        let index = String::from_utf8(files["index.html"].clone()).unwrap();
        assert!(index.contains(r#"<a href="/tofu/1.0.0/">tofu_1.0.0</a>"#));
        let first = index.find("tofu_1.0.0").unwrap();
        let second = index.find("tofu_0.9.0").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_generate_version_page() {
        let files = generator(vec![release("v1.0.0", &["tofu_v1.0.0.tar.gz"])])
            .generate()
            .await
            .unwrap();

        let page = String::from_utf8(files["1.0.0/index.html"].clone()).unwrap();
        assert!(page.contains(r#"<a href="../">../</a>"#));
        assert!(page.contains(
            r#"<a href="https://github.com/opentofu/opentofu/releases/download/v1.0.0/tofu_v1.0.0.tar.gz">tofu_v1.0.0.tar.gz</a>"#
        ));
    }

    #[tokio::test]
    async fn test_generate_without_releases() {
        let files = generator(vec![]).generate().await.unwrap();

        assert_eq!(files.len(), 2);
        let api: serde_json::Value = serde_json::from_slice(&files["api.json"]).unwrap();
        assert_eq!(api["versions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_generate_source_failure() {
        let mut source = MockReleaseSource::new();
        source
            .expect_list_all_releases()
            .returning(|| Err(anyhow::anyhow!("rate limited")));
        let generator = Generator::new(source, "o/r".parse().unwrap(), DEFAULT_DOWNLOAD_URL);

        let err = generator.generate().await.unwrap_err();
        assert_eq!(format!("{:#}", err), "failed to fetch releases: rate limited");
    }

    #[test]
    fn test_index_skips_unusable_tags() {
        let index = Index::from_releases(&[
            release("v", &[]),
            release("v1/../../etc", &[]),
            release("vv2.0.0", &[]),
        ]);
        let ids: Vec<&str> = index.versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["2.0.0"]);
    }

    #[test]
    fn test_download_link_trims_base() {
        let generator = Generator::new(
            MockReleaseSource::new(),
            "opentofu/opentofu".parse().unwrap(),
            "https://mirror.example.com/",
        );
        assert_eq!(
            generator.download_link("1.6.0", "tofu.zip"),
            "https://mirror.example.com/opentofu/opentofu/releases/download/v1.6.0/tofu.zip"
        );
    }

    #[tokio::test]
    async fn test_write_site() {
        let dir = tempdir().unwrap();
        let mut files = BTreeMap::new();
        files.insert("index.html".to_string(), b"root".to_vec());
        files.insert("1.0.0/index.html".to_string(), b"child".to_vec());

        write_site(dir.path(), &files).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("index.html")).unwrap(), b"root");
        assert_eq!(
            std::fs::read(dir.path().join("1.0.0/index.html")).unwrap(),
            b"child"
        );
    }
}
