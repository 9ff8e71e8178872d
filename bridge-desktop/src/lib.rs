//! # Desktop Bridge Implementations
//!
//! Desktop-ready default implementations of selected bridge traits:
//!
//! - [`ReqwestHttpClient`] - `HttpClient` over reqwest with retry and
//!   streamed downloads
//! - [`JsonSettingsProvider`] - `SettingsProvider` over a JSON document
//!
//! The remote folder source and renderer remain host concerns: the first
//! comes from a provider crate (e.g. `provider-google-drive`), the second
//! from the host's media stack.

pub mod http;
pub mod settings;

pub use http::ReqwestHttpClient;
pub use settings::JsonSettingsProvider;
