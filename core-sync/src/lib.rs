//! # Sync Module
//!
//! Maintains a local, playable mirror of a remote media folder.
//!
//! ## Overview
//!
//! This module reconciles a remote folder listing against a persisted
//! manifest, downloading only changed content and evicting stale local
//! copies:
//! - Listing remote items via `RemoteFolderSource` (media only)
//! - Diffing against the previous manifest per item
//! - Downloading to temp files with atomic promotion
//! - Evicting entries that vanished remotely
//! - Persisting the manifest with the same temp-then-rename discipline
//!
//! ## Components
//!
//! - **Data Model** (`manifest`): Manifest, entries, playlist view, result summary
//! - **Manifest Store** (`store`): JSON persistence per folder, load-never-fails
//! - **Sync Engine** (`engine`): One reconciliation pass, all-or-nothing manifest write
//! - **Poll Loop** (`poller`): Sequential scheduling with exponential backoff

pub mod engine;
pub mod error;
pub mod manifest;
pub mod poller;
pub mod store;

pub use engine::SyncEngine;
pub use error::{Result, SyncError};
pub use manifest::{safe_file_name, Manifest, ManifestEntry, PlayableItem, SyncResult};
pub use poller::{next_backoff, SyncPoller, MAX_BACKOFF};
pub use store::ManifestStore;
