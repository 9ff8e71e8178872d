//! Sync data model: the persisted manifest and its derived playlist view.
//!
//! The manifest is the engine's sole durable state. It is a cache record,
//! not a source of truth: when lost or corrupt it is rebuilt from the
//! remote listing on the next pass. Serialization is JSON with tolerant
//! deserialization so future engine versions can add optional fields
//! without breaking older manifests.

use bridge_traits::source::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One locally cached remote item.
///
/// Owned by the manifest store and mutated only by the sync engine during
/// a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Remote-assigned stable identifier.
    pub id: String,
    /// Display name at the time of the last sync.
    pub name: String,
    /// MIME type at the time of the last sync.
    pub mime_type: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    /// Absolute path of the cached copy.
    pub local_path: PathBuf,
    /// Unix milliseconds of the pass that last confirmed this entry.
    #[serde(default)]
    pub last_synced_at: i64,
}

/// The persisted per-folder manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub folder_id: String,
    /// Unix milliseconds of the last successful pass.
    #[serde(default)]
    pub last_synced_at: i64,
    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// An empty manifest for a folder that has never been synced (or whose
    /// manifest could not be read).
    pub fn empty(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            last_synced_at: 0,
            entries: Vec::new(),
        }
    }

    /// Derive the presentation playlist: one [`PlayableItem`] per entry,
    /// sorted case-insensitively by name.
    pub fn playable_items(&self) -> Vec<PlayableItem> {
        let mut items: Vec<PlayableItem> = self
            .entries
            .iter()
            .map(|entry| PlayableItem {
                id: entry.id.clone(),
                name: entry.name.clone(),
                mime_type: entry.mime_type.clone(),
                local_path: entry.local_path.clone(),
            })
            .collect();
        items.sort_by_key(|item| item.name.to_lowercase());
        items
    }
}

/// Presentation view of a cached item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub local_path: PathBuf,
}

impl PlayableItem {
    /// Playable media kind. Manifest entries are media by construction, so
    /// this only returns `None` for a manifest written by a foreign tool.
    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime_type(&self.mime_type)
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Whether the playable set changed (downloads, evictions, or a
    /// different entry count).
    pub changed: bool,
    /// Items downloaded this pass.
    pub downloaded: usize,
    /// Stale local copies removed this pass.
    pub evicted: usize,
    /// The full playlist after the pass, sorted by name.
    pub playable_items: Vec<PlayableItem>,
}

/// Derive the deterministic, filesystem-safe local file name for a remote
/// item. The id prefix keeps distinct remote items with equal display
/// names from colliding, and maps a remote item to the same local name on
/// every pass.
pub fn safe_file_name(id: &str, name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{}_{}", id, sanitized)
}
