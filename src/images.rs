//! Image downloads
//!
//! Avatars and covers land in a per-app folder under the system temp
//! directory, one random `.jpg` name per download so repeated supplies
//! never collide. The whole folder is wiped on shutdown.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::config::ImagesConfig;

pub struct ImageStore {
    http: reqwest::Client,
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(config: &ImagesConfig) -> Self {
        let dir = config
            .dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("vkdata"));
        Self {
            http: reqwest::Client::new(),
            dir,
        }
    }

    /// Reuse an existing HTTP client instead of building a fresh one
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch `url` into the store and return the saved path
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create image folder {}", self.dir.display()))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {url}"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("image fetch returned HTTP {status} for {url}");
        }
        let bytes = response.bytes().await.context("failed to read image body")?;

        let path = self.dir.join(format!("{}.jpg", Uuid::new_v4()));
        fs::write(&path, &bytes)
            .with_context(|| format!("failed to write image to {}", path.display()))?;
        debug!(url, path = %path.display(), "downloaded image");
        Ok(path)
    }

    /// Remove the folder and everything in it
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)
                .with_context(|| format!("failed to remove {}", self.dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(dir: PathBuf) -> ImageStore {
        ImageStore::new(&ImagesConfig { dir: Some(dir) })
    }

    #[test]
    fn configured_dir_overrides_the_temp_default() {
        let store = store_at(PathBuf::from("/custom/covers"));
        assert_eq!(store.dir(), Path::new("/custom/covers"));

        let default = ImageStore::new(&ImagesConfig::default());
        assert!(default.dir().starts_with(std::env::temp_dir()));
        assert!(default.dir().ends_with("vkdata"));
    }

    #[test]
    fn clear_removes_the_folder_and_its_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("covers");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("a.jpg"), b"jpg").unwrap();
        fs::write(dir.join("nested").join("b.jpg"), b"jpg").unwrap();

        let store = store_at(dir.clone());
        store.clear().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn clear_is_a_noop_when_the_folder_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_at(tmp.path().join("never-created"));
        store.clear().unwrap();
    }
}
