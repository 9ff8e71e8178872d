//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridge implementations (remote
//! folder source, renderer, settings) into the signage core: it owns the
//! event bus, the sync engine and its poll loop, the playback continuity
//! controller, and the plumbing between them. Hosts construct a
//! [`SignageService`] from a validated [`CoreConfig`], start it for one
//! folder, and forward lifecycle signals (`on_resume`, shutdown).
//!
//! Data flow once started:
//!
//! ```text
//! SyncPoller -> SyncEngine -> SyncResult channel -> PlaybackController -> Renderer
//!                                                        ^
//!                                  renderer completion events
//! ```
//!
//! A failed sync pass delivers nothing to the controller; whatever is on
//! screen keeps playing until a later pass succeeds.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::settings::SettingsProvider;
use core_playback::PlaybackController;
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_sync::{ManifestStore, SyncEngine, SyncPoller};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Capacity of the sync-result handoff channel. The poller blocks on a
/// full channel, which keeps passes strictly sequential from the
/// controller's point of view.
const RESULT_CHANNEL_CAPACITY: usize = 4;

struct RunningLoop {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Primary façade exposed to host applications.
pub struct SignageService {
    event_bus: EventBus,
    engine: Arc<SyncEngine>,
    controller: Arc<PlaybackController>,
    settings: Arc<dyn SettingsProvider>,
    running: Mutex<Option<RunningLoop>>,
}

impl SignageService {
    /// Build the service from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_capacity);
        let store = ManifestStore::new(&config.cache_root);
        let engine = Arc::new(SyncEngine::new(config.folder_source.clone(), store));
        let controller = PlaybackController::new(
            config.renderer.clone(),
            config.settings_provider.clone(),
            event_bus.clone(),
        );

        Ok(Self {
            event_bus,
            engine,
            controller,
            settings: config.settings_provider,
            running: Mutex::new(None),
        })
    }

    /// The event bus carrying sync and playback events.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Start the signage loop for one remote folder.
    ///
    /// Spawns the sync poll loop, the pump delivering successful sync
    /// results to the controller, and the pump forwarding renderer
    /// completion events back into it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyRunning`] if a loop is already active;
    /// call [`shutdown`](Self::shutdown) first to switch folders.
    pub async fn start(&self, folder_id: impl Into<String>) -> Result<()> {
        let folder_id = folder_id.into();
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(CoreError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let (results_tx, mut results_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        let poller = SyncPoller::new(
            self.engine.clone(),
            self.settings.clone(),
            self.event_bus.clone(),
            cancel.clone(),
        );
        let poll_task = poller.spawn(folder_id.clone(), results_tx);

        let controller = self.controller.clone();
        let pump_cancel = cancel.clone();
        let result_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = pump_cancel.cancelled() => break,
                    result = results_rx.recv() => match result {
                        Some(result) => controller.on_sync_result(result).await,
                        None => break,
                    }
                }
            }
            debug!("sync result pump stopped");
        });

        let renderer_task = self.controller.spawn_renderer_pump(cancel.clone());

        *running = Some(RunningLoop {
            cancel,
            tasks: vec![poll_task, result_task, renderer_task],
        });
        info!(folder_id = %folder_id, "signage loop started");
        Ok(())
    }

    /// Whether a signage loop is currently active.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// The presentation surface regained focus; re-assert the current
    /// item if its last presentation attempt did not complete.
    pub async fn on_resume(&self) {
        self.controller.on_resume().await;
    }

    /// Stop the signage loop and the presentation.
    ///
    /// Cancels the poll loop's pending sleep, the result and renderer
    /// pumps, and any armed image timer, then awaits task teardown. No
    /// callback survives into a torn-down controller. Idempotent.
    pub async fn shutdown(&self) {
        let stopped = self.running.lock().await.take();
        if let Some(run) = stopped {
            run.cancel.cancel();
            for task in run.tasks {
                let _ = task.await;
            }
        }
        self.controller.stop().await;
        info!("signage service shut down");
    }
}
