//! Settings Provider backed by a JSON file
//!
//! Reads presentation tunables from a small JSON document on every call,
//! so operators can edit the file while the loop is running and the next
//! sync pass picks the change up. A missing file or field falls back to
//! the documented defaults; clamping stays with the consumers.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    settings::{
        SettingsProvider, DEFAULT_IMAGE_DURATION_SECONDS, DEFAULT_UPDATE_INTERVAL_SECONDS,
    },
};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    image_duration_seconds: Option<u64>,
    #[serde(default)]
    update_interval_seconds: Option<u64>,
}

/// File-backed settings provider
///
/// The document shape:
///
/// ```json
/// {
///     "image_duration_seconds": 15,
///     "update_interval_seconds": 600
/// }
/// ```
pub struct JsonSettingsProvider {
    path: PathBuf,
}

impl JsonSettingsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> SettingsDocument {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return SettingsDocument::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), "unable to read settings: {}", e);
                return SettingsDocument::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %self.path.display(), "unable to parse settings: {}", e);
                SettingsDocument::default()
            }
        }
    }
}

#[async_trait]
impl SettingsProvider for JsonSettingsProvider {
    async fn image_duration_seconds(&self) -> Result<u64> {
        Ok(self
            .read_document()
            .await
            .image_duration_seconds
            .unwrap_or(DEFAULT_IMAGE_DURATION_SECONDS))
    }

    async fn update_interval_seconds(&self) -> Result<u64> {
        Ok(self
            .read_document()
            .await
            .update_interval_seconds
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_SECONDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("bridge-desktop-settings-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let provider = JsonSettingsProvider::new(temp_file());

        assert_eq!(
            provider.image_duration_seconds().await.unwrap(),
            DEFAULT_IMAGE_DURATION_SECONDS
        );
        assert_eq!(
            provider.update_interval_seconds().await.unwrap(),
            DEFAULT_UPDATE_INTERVAL_SECONDS
        );
    }

    #[tokio::test]
    async fn configured_values_are_returned() {
        let path = temp_file();
        std::fs::write(
            &path,
            br#"{"image_duration_seconds": 15, "update_interval_seconds": 600}"#,
        )
        .unwrap();

        let provider = JsonSettingsProvider::new(&path);
        assert_eq!(provider.image_duration_seconds().await.unwrap(), 15);
        assert_eq!(provider.update_interval_seconds().await.unwrap(), 600);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn partial_document_fills_in_defaults() {
        let path = temp_file();
        std::fs::write(&path, br#"{"image_duration_seconds": 20}"#).unwrap();

        let provider = JsonSettingsProvider::new(&path);
        assert_eq!(provider.image_duration_seconds().await.unwrap(), 20);
        assert_eq!(
            provider.update_interval_seconds().await.unwrap(),
            DEFAULT_UPDATE_INTERVAL_SECONDS
        );

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_document_yields_defaults() {
        let path = temp_file();
        std::fs::write(&path, b"{oops").unwrap();

        let provider = JsonSettingsProvider::new(&path);
        assert_eq!(
            provider.image_duration_seconds().await.unwrap(),
            DEFAULT_IMAGE_DURATION_SECONDS
        );

        let _ = std::fs::remove_file(&path);
    }
}
