//! Manifest persistence.
//!
//! One JSON manifest per synced folder, at a deterministic path under the
//! cache root: `<cache_root>/<folder_id>/manifest.json`. Reads never fail
//! the caller (a missing or corrupt manifest is an empty one); writes go
//! through a temp file and an atomic rename, the same promotion discipline
//! the engine applies to downloaded media.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Result, SyncError};
use crate::manifest::Manifest;

const MANIFEST_NAME: &str = "manifest.json";

/// Loads and saves per-folder manifests under a cache root.
///
/// The cache directory and manifest of a folder are single-writer: only
/// the sync engine for that folder mutates them.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    cache_root: PathBuf,
}

impl ManifestStore {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    /// Directory holding a folder's cached media and manifest.
    pub fn folder_dir(&self, folder_id: &str) -> PathBuf {
        self.cache_root.join(folder_id)
    }

    /// Path of a folder's manifest file.
    pub fn manifest_path(&self, folder_id: &str) -> PathBuf {
        self.folder_dir(folder_id).join(MANIFEST_NAME)
    }

    /// Load the manifest for a folder.
    ///
    /// Never fails: a missing, unreadable, or unparseable manifest is
    /// logged and treated as empty. The cache self-heals on the next pass.
    pub async fn load(&self, folder_id: &str) -> Manifest {
        let path = self.manifest_path(folder_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no manifest yet, starting empty");
                return Manifest::empty(folder_id);
            }
            Err(e) => {
                warn!(path = %path.display(), "unable to read manifest: {}", e);
                return Manifest::empty(folder_id);
            }
        };

        match serde_json::from_slice::<Manifest>(&bytes) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %path.display(), "unable to parse manifest: {}", e);
                Manifest::empty(folder_id)
            }
        }
    }

    /// Persist a manifest, replacing any previous one in place.
    ///
    /// Writes `manifest.json.tmp` first and renames it over the final path
    /// so a crash mid-write never leaves a truncated manifest behind.
    pub async fn save(&self, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path(&manifest.folder_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| persist_error(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(manifest)
            .map_err(|e| SyncError::Persist(format!("manifest serialization failed: {}", e)))?;

        let temp = path.with_extension("json.tmp");
        fs::write(&temp, &json)
            .await
            .map_err(|e| persist_error(&temp, e))?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(persist_error(&path, e));
        }

        debug!(path = %path.display(), entries = manifest.entries.len(), "manifest saved");
        Ok(())
    }
}

fn persist_error(path: &Path, e: std::io::Error) -> SyncError {
    SyncError::Persist(format!("{}: {}", path.display(), e))
}
