//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the signage core and its host.
//! Each trait represents a capability the core requires but that is
//! supplied from outside: remote folder access, on-screen rendering,
//! tunable settings, and HTTP transport for providers.
//!
//! ## Traits
//!
//! - [`RemoteFolderSource`](source::RemoteFolderSource) - Remote listing and content download
//! - [`Renderer`](render::Renderer) - Image/video presentation surface
//! - [`SettingsProvider`](settings::SettingsProvider) - Presentation tunables
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport used by providers
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host
//! implementations should convert platform-specific failures into it with
//! actionable messages; the core maps bridge failures into its own domain
//! errors at the seam.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so capabilities can be shared
//! across async tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod render;
pub mod settings;
pub mod source;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use render::{Renderer, RendererEvent};
pub use settings::SettingsProvider;
pub use source::{MediaKind, RemoteFolderSource, RemoteItem};
