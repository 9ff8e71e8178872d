//! # Core Configuration Module
//!
//! Builder-based configuration for the signage core. The builder enforces
//! fail-fast validation: every capability the core needs (remote folder
//! source, renderer, settings provider) must be injected before
//! initialization, and missing capabilities produce actionable error
//! messages rather than panics deep inside the engine.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .cache_root("/var/cache/signage")
//!     .folder_source(Arc::new(MyFolderSource))
//!     .renderer(Arc::new(MyRenderer))
//!     .settings_provider(Arc::new(MySettings))
//!     .build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{RemoteFolderSource, Renderer, SettingsProvider};
use std::path::PathBuf;
use std::sync::Arc;

/// Core configuration for the signage engine.
///
/// Holds the cache location and the capability handles required to run a
/// presentation. Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root directory under which per-folder caches and manifests live
    pub cache_root: PathBuf,

    /// Remote folder listing/download capability (required)
    pub folder_source: Arc<dyn RemoteFolderSource>,

    /// On-screen presentation capability (required)
    pub renderer: Arc<dyn Renderer>,

    /// Presentation tunables capability (required)
    pub settings_provider: Arc<dyn SettingsProvider>,

    /// Buffer capacity of the event bus channel
    pub event_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("cache_root", &self.cache_root)
            .field("folder_source", &"RemoteFolderSource { ... }")
            .field("renderer", &"Renderer { ... }")
            .field("settings_provider", &"SettingsProvider { ... }")
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cache_root.as_os_str().is_empty() {
            return Err(Error::Config("Cache root cannot be empty".to_string()));
        }

        if self.event_capacity == 0 {
            return Err(Error::Config(
                "Event capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    cache_root: Option<PathBuf>,
    folder_source: Option<Arc<dyn RemoteFolderSource>>,
    renderer: Option<Arc<dyn Renderer>>,
    settings_provider: Option<Arc<dyn SettingsProvider>>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the cache root directory.
    ///
    /// Per-folder caches are laid out underneath it; the directory is
    /// created on first sync if missing.
    pub fn cache_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_root = Some(path.into());
        self
    }

    /// Sets the remote folder source implementation (required).
    pub fn folder_source(mut self, source: Arc<dyn RemoteFolderSource>) -> Self {
        self.folder_source = Some(source);
        self
    }

    /// Sets the renderer implementation (required).
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Sets the settings provider implementation (required).
    pub fn settings_provider(mut self, provider: Arc<dyn SettingsProvider>) -> Self {
        self.settings_provider = Some(provider);
        self
    }

    /// Sets the event bus buffer capacity. Default: 100.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns an error when a required capability is missing or a
    /// configuration value is invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let cache_root = self.cache_root.ok_or_else(|| {
            Error::Config("Cache root is required. Use .cache_root() to set it.".to_string())
        })?;

        let folder_source = self.folder_source.ok_or_else(|| Error::CapabilityMissing {
            capability: "RemoteFolderSource".to_string(),
            message: "No remote folder source provided. Inject a provider \
                      (e.g. the Google Drive connector) via .folder_source()."
                .to_string(),
        })?;

        let renderer = self.renderer.ok_or_else(|| Error::CapabilityMissing {
            capability: "Renderer".to_string(),
            message: "No renderer provided. Inject the host's presentation \
                      surface via .renderer()."
                .to_string(),
        })?;

        let settings_provider = self
            .settings_provider
            .ok_or_else(|| Error::CapabilityMissing {
                capability: "SettingsProvider".to_string(),
                message: "No settings provider provided. Inject the host's \
                          tunables source via .settings_provider()."
                    .to_string(),
            })?;

        let config = CoreConfig {
            cache_root,
            folder_source,
            renderer,
            settings_provider,
            event_capacity: self.event_capacity.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::{RendererEvent, RemoteItem};
    use std::path::Path;
    use tokio::sync::broadcast;

    struct MockSource;

    #[async_trait]
    impl RemoteFolderSource for MockSource {
        async fn list_folder_items(
            &self,
            _folder_id: &str,
        ) -> bridge_traits::error::Result<Vec<RemoteItem>> {
            Ok(Vec::new())
        }

        async fn download_item(
            &self,
            _item: &RemoteItem,
            _destination: &Path,
        ) -> bridge_traits::error::Result<()> {
            Err(BridgeError::NotAvailable("download_item".to_string()))
        }
    }

    struct MockRenderer {
        events: broadcast::Sender<RendererEvent>,
    }

    impl MockRenderer {
        fn new() -> Self {
            let (events, _) = broadcast::channel(8);
            Self { events }
        }
    }

    #[async_trait]
    impl Renderer for MockRenderer {
        async fn show_image(&self, _path: &Path) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        async fn play_video(
            &self,
            _path: &Path,
            _loop_single: bool,
        ) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        async fn stop(&self) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        fn subscribe_events(&self) -> broadcast::Receiver<RendererEvent> {
            self.events.subscribe()
        }
    }

    struct MockSettings;

    #[async_trait]
    impl SettingsProvider for MockSettings {
        async fn image_duration_seconds(&self) -> bridge_traits::error::Result<u64> {
            Ok(10)
        }

        async fn update_interval_seconds(&self) -> bridge_traits::error::Result<u64> {
            Ok(300)
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .cache_root("/cache")
            .folder_source(Arc::new(MockSource))
            .renderer(Arc::new(MockRenderer::new()))
            .settings_provider(Arc::new(MockSettings))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = full_builder().build().unwrap();

        assert_eq!(config.cache_root, PathBuf::from("/cache"));
        assert_eq!(config.event_capacity, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_cache_root() {
        let result = CoreConfig::builder()
            .folder_source(Arc::new(MockSource))
            .renderer(Arc::new(MockRenderer::new()))
            .settings_provider(Arc::new(MockSettings))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Cache root is required"));
    }

    #[test]
    fn test_builder_requires_folder_source() {
        let result = CoreConfig::builder()
            .cache_root("/cache")
            .renderer(Arc::new(MockRenderer::new()))
            .settings_provider(Arc::new(MockSettings))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("RemoteFolderSource"));
        assert!(err_msg.contains("folder_source"));
    }

    #[test]
    fn test_builder_requires_renderer() {
        let result = CoreConfig::builder()
            .cache_root("/cache")
            .folder_source(Arc::new(MockSource))
            .settings_provider(Arc::new(MockSettings))
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Renderer"));
    }

    #[test]
    fn test_builder_requires_settings_provider() {
        let result = CoreConfig::builder()
            .cache_root("/cache")
            .folder_source(Arc::new(MockSource))
            .renderer(Arc::new(MockRenderer::new()))
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SettingsProvider"));
    }

    #[test]
    fn test_builder_rejects_zero_event_capacity() {
        let result = full_builder().event_capacity(0).build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Event capacity must be greater than 0"));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = full_builder().event_capacity(16).build().unwrap();
        let cloned = config.clone();

        assert_eq!(cloned.cache_root, config.cache_root);
        assert_eq!(cloned.event_capacity, 16);
    }
}
