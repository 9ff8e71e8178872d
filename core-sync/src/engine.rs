//! # Sync Engine
//!
//! Drives one reconciliation pass against a remote media folder:
//!
//! 1. Ensure the folder's cache directory exists.
//! 2. Load the previous manifest (missing/corrupt reads as empty).
//! 3. List the remote folder, keep playable media only, sort by name.
//! 4. Diff each remote item against its manifest entry; changed or new
//!    items are downloaded to a temp file beside the destination and
//!    promoted with an atomic rename.
//! 5. Delete local copies of items that vanished remotely.
//! 6. Persist the new manifest and report a [`SyncResult`].
//!
//! A pass is all-or-nothing with respect to the manifest: the first failed
//! download aborts the pass and nothing is persisted. Items promoted
//! earlier in the aborted pass stay on disk and are recognized as
//! unchanged by the next pass.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_traits::source::{RemoteFolderSource, RemoteItem};
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::manifest::{safe_file_name, Manifest, ManifestEntry, SyncResult};
use crate::store::ManifestStore;

/// Reconciles a remote folder listing against the local cache.
pub struct SyncEngine {
    source: Arc<dyn RemoteFolderSource>,
    store: ManifestStore,
}

impl SyncEngine {
    pub fn new(source: Arc<dyn RemoteFolderSource>, store: ManifestStore) -> Self {
        Self { source, store }
    }

    /// The manifest store this engine persists through.
    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Run one reconciliation pass for `folder_id`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Listing`] when remote enumeration fails; the previous
    ///   manifest and cached files are untouched.
    /// - [`SyncError::Download`] when any single item fetch or promotion
    ///   fails; earlier promotions in the same pass are kept.
    /// - [`SyncError::Persist`] when the manifest write fails; the pass's
    ///   file changes stay on disk and the next pass self-corrects.
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    pub async fn sync_folder(&self, folder_id: &str) -> Result<SyncResult> {
        let folder_dir = self.store.folder_dir(folder_id);
        fs::create_dir_all(&folder_dir).await.map_err(|e| {
            SyncError::Persist(format!(
                "unable to create cache directory {}: {}",
                folder_dir.display(),
                e
            ))
        })?;

        debug!("sync pass started");
        let previous = self.store.load(folder_id).await;
        let previous_by_id: HashMap<&str, &ManifestEntry> = previous
            .entries
            .iter()
            .map(|entry| (entry.id.as_str(), entry))
            .collect();

        let mut remote = self
            .source
            .list_folder_items(folder_id)
            .await
            .map_err(|e| SyncError::Listing(e.to_string()))?;
        // Playable media only; non-media entries never reach the diff.
        remote.retain(|item| item.media_kind().is_some());
        remote.sort_by_key(|item| item.name.to_lowercase());
        debug!(remote_items = remote.len(), "listed playable remote items");

        let mut downloaded = 0usize;
        let mut entries = Vec::with_capacity(remote.len());

        for item in &remote {
            let target = folder_dir.join(safe_file_name(&item.id, &item.name));
            let existing = previous_by_id.get(item.id.as_str()).copied();

            if self.needs_download(existing, item, &target).await {
                self.download_and_promote(item, &target).await?;
                downloaded += 1;

                // The id-prefixed file name follows the display name; once
                // the new copy is in place, the superseded one goes.
                if let Some(prev) = existing {
                    if prev.local_path != target {
                        if let Err(e) = fs::remove_file(&prev.local_path).await {
                            warn!(
                                path = %prev.local_path.display(),
                                "failed to remove renamed local file: {}", e
                            );
                        }
                    }
                }
            }

            entries.push(ManifestEntry {
                id: item.id.clone(),
                name: item.name.clone(),
                mime_type: item.mime_type.clone(),
                size: item.size,
                modified_time: item.modified_time.clone(),
                content_hash: item.content_hash.clone(),
                local_path: target,
                last_synced_at: Utc::now().timestamp_millis(),
            });
        }

        let remote_ids: HashSet<&str> = remote.iter().map(|item| item.id.as_str()).collect();
        let mut evicted = 0usize;
        for stale in previous
            .entries
            .iter()
            .filter(|entry| !remote_ids.contains(entry.id.as_str()))
        {
            if let Err(e) = fs::remove_file(&stale.local_path).await {
                warn!(
                    path = %stale.local_path.display(),
                    "failed to remove evicted local file: {}", e
                );
            }
            evicted += 1;
        }

        let manifest = Manifest {
            folder_id: folder_id.to_string(),
            last_synced_at: Utc::now().timestamp_millis(),
            entries,
        };
        self.store.save(&manifest).await?;

        let playable_items = manifest.playable_items();
        let changed =
            downloaded > 0 || evicted > 0 || previous.entries.len() != manifest.entries.len();
        info!(
            downloaded,
            evicted,
            total = playable_items.len(),
            changed,
            "sync pass complete"
        );

        Ok(SyncResult {
            changed,
            downloaded,
            evicted,
            playable_items,
        })
    }

    /// Whether a remote item's local copy must be (re)fetched.
    async fn needs_download(
        &self,
        existing: Option<&ManifestEntry>,
        item: &RemoteItem,
        target: &Path,
    ) -> bool {
        let Some(entry) = existing else {
            return true;
        };
        if entry.size != item.size
            || entry.modified_time != item.modified_time
            || entry.content_hash != item.content_hash
            || entry.name != item.name
        {
            return true;
        }
        // A vanished local file invalidates an otherwise unchanged entry;
        // the manifest only records paths that exist when it is written.
        !fs::try_exists(target).await.unwrap_or(false)
    }

    /// Download `item` to a temp file beside `target`, then atomically
    /// replace `target`. A failure at any step leaves no partial file at
    /// the destination path.
    async fn download_and_promote(&self, item: &RemoteItem, target: &Path) -> Result<()> {
        let temp = temp_path(target);
        if fs::try_exists(&temp).await.unwrap_or(false) {
            fs::remove_file(&temp)
                .await
                .map_err(|e| download_error(item, format!("stale temp file: {}", e)))?;
        }

        if let Err(e) = self.source.download_item(item, &temp).await {
            let _ = fs::remove_file(&temp).await;
            return Err(download_error(item, e.to_string()));
        }

        if fs::try_exists(target).await.unwrap_or(false) {
            fs::remove_file(target)
                .await
                .map_err(|e| download_error(item, format!("replacing destination: {}", e)))?;
        }
        fs::rename(&temp, target)
            .await
            .map_err(|e| download_error(item, format!("promotion failed: {}", e)))?;

        debug!(item_id = %item.id, path = %target.display(), "downloaded and promoted");
        Ok(())
    }
}

fn download_error(item: &RemoteItem, message: String) -> SyncError {
    SyncError::Download {
        item_id: item.id.clone(),
        message,
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_sits_beside_target() {
        let target = Path::new("/cache/folder/a1_clip.mp4");
        let temp = temp_path(target);
        assert_eq!(temp, Path::new("/cache/folder/a1_clip.mp4.tmp"));
        assert_eq!(temp.parent(), target.parent());
    }
}
