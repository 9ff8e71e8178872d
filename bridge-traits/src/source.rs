//! Remote Folder Source Abstraction
//!
//! The sync engine consumes a remote folder through this trait. Concrete
//! providers (Google Drive, test doubles) handle transport, paging, and
//! authentication; the core only sees an immutable listing snapshot and a
//! download-to-path operation.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Playable media classification, derived from a MIME type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type, returning `None` for anything that is not
    /// directly playable (documents, folders, shortcuts, ...).
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// One entry of a remote folder listing.
///
/// An immutable snapshot of a single listing result. Identity is `id`,
/// which the remote assigns and keeps stable across passes; every other
/// field may change between listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Remote-assigned stable identifier.
    pub id: String,
    /// Display name, used for presentation ordering.
    pub name: String,
    /// MIME type as reported by the remote.
    pub mime_type: String,
    /// Content size in bytes, when the remote reports one.
    pub size: Option<u64>,
    /// Last modification time as an opaque remote timestamp string.
    pub modified_time: Option<String>,
    /// Content hash (e.g. MD5), when the remote reports one.
    pub content_hash: Option<String>,
    /// Opaque reference the provider resolves to fetch the content bytes.
    pub fetch_ref: String,
}

impl RemoteItem {
    /// Playable media kind, or `None` for non-media entries.
    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime_type(&self.mime_type)
    }
}

/// Capability trait for listing and fetching a remote media folder.
///
/// # Contract
///
/// - `list_folder_items` pages through the complete listing internally; a
///   single call returns every item currently in the folder. Folder and
///   shortcut entries must not appear in the result.
/// - `download_item` writes the full content to `destination`, failing on
///   transport errors, non-2xx statuses, and empty bodies. Any file handle
///   opened for `destination` is released before the call returns, on
///   success and on error alike.
#[async_trait]
pub trait RemoteFolderSource: Send + Sync {
    /// List every item in the given remote folder.
    async fn list_folder_items(&self, folder_id: &str) -> Result<Vec<RemoteItem>>;

    /// Download one item's content to `destination`.
    async fn download_item(&self, item: &RemoteItem, destination: &Path) -> Result<()>;
}
