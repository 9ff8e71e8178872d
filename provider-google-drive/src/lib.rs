//! # Google Drive Provider
//!
//! Implements the `RemoteFolderSource` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated folder listing filtered to playable media
//! - Exclusion of subfolder and shortcut entries
//! - Streaming downloads straight to a destination file
//! - Exponential backoff on rate limits and server errors
//!
//! Authentication and token refresh stay with the host; the connector is
//! handed a ready-to-use access token.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};
