use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::config::StorageConfig;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Stores uploaded student images and builds their public URLs.
pub struct ImageService {
    dir: PathBuf,
    web_domain: String,
}

impl ImageService {
    pub fn new(dir: impl Into<PathBuf>, web_domain: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            web_domain: web_domain.into(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(&storage.image_dir, &storage.web_domain)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lower-cased extension when the filename names a supported image type.
    pub fn image_extension(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Write `bytes` under a fresh `<random>_<YYYYMMDD>.<ext>` name and return
    /// the public URL.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> ServiceResult<String> {
        let ext = Self::image_extension(original_name)
            .ok_or_else(|| ServiceError::validation("File is not an image"))?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let (random, _) = Uuid::new_v4().as_u64_pair();
        let filename = format!("{}_{}.{}", random, Utc::now().format("%Y%m%d"), ext);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;
        set_readable(&path).await?;

        info!("Stored image {} ({} bytes)", filename, bytes.len());
        Ok(self.public_url(&filename))
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/images/{}", self.web_domain.trim_end_matches('/'), filename)
    }
}

#[cfg(unix)]
async fn set_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await
}

#[cfg(not(unix))]
async fn set_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(ImageService::image_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(ImageService::image_extension("photo.png").as_deref(), Some("png"));
        assert_eq!(ImageService::image_extension("notes.pdf"), None);
        assert_eq!(ImageService::image_extension("no_extension"), None);
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageService::new(dir.path().join("images"), "https://cdn.example.com/");

        let url = images.save("me.jpeg", b"\xff\xd8\xff").await.unwrap();
        assert!(url.starts_with("https://cdn.example.com/images/"));
        assert!(url.ends_with(".jpeg"));

        let filename = url.rsplit('/').next().unwrap();
        let stored = std::fs::read(dir.path().join("images").join(filename)).unwrap();
        assert_eq!(stored, b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn save_rejects_other_types() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageService::new(dir.path(), "http://localhost");
        let result = images.save("script.sh", b"#!/bin/sh").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
