//! # Sync Poll Loop
//!
//! Runs the sync engine repeatedly for one folder. Passes are strictly
//! sequential: a pass finishes (success or failure) before the next one is
//! scheduled, so there are never overlapping passes for the same folder.
//!
//! Tunables are re-read (and clamped) before every pass. On success the
//! delay resets to the configured update interval and the `SyncResult` is
//! delivered to the consumer channel; on failure nothing is delivered, the
//! failure is logged and published on the event bus, and the next delay
//! doubles up to [`MAX_BACKOFF`]. The loop itself never terminates on a
//! sync failure, only on cancellation.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::settings::{
    clamp_update_interval, SettingsProvider, DEFAULT_UPDATE_INTERVAL_SECONDS,
};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::SyncEngine;
use crate::manifest::SyncResult;

/// Ceiling for the failure backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(600);

/// Next delay after a failed pass: double the previous delay, capped at
/// [`MAX_BACKOFF`]. One successful pass resets the delay to the configured
/// update interval.
pub fn next_backoff(previous: Duration) -> Duration {
    previous.saturating_mul(2).min(MAX_BACKOFF)
}

/// Schedules repeated reconciliation passes for a single folder.
pub struct SyncPoller {
    engine: Arc<SyncEngine>,
    settings: Arc<dyn SettingsProvider>,
    event_bus: EventBus,
    cancel: CancellationToken,
}

impl SyncPoller {
    pub fn new(
        engine: Arc<SyncEngine>,
        settings: Arc<dyn SettingsProvider>,
        event_bus: EventBus,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            settings,
            event_bus,
            cancel,
        }
    }

    /// Spawn the loop as a background task. Successful pass results are
    /// delivered through `results`; the loop stops when the cancellation
    /// token fires or the consumer side of the channel is dropped.
    pub fn spawn(self, folder_id: String, results: mpsc::Sender<SyncResult>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(&folder_id, results).await })
    }

    async fn run(self, folder_id: &str, results: mpsc::Sender<SyncResult>) {
        info!(folder_id, "sync poll loop started");
        let mut delay = self.refresh_interval().await;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let interval = self.refresh_interval().await;
            self.event_bus
                .emit(CoreEvent::Sync(SyncEvent::PassStarted {
                    folder_id: folder_id.to_string(),
                }))
                .ok();

            let started = Instant::now();
            match self.engine.sync_folder(folder_id).await {
                Ok(result) => {
                    self.event_bus
                        .emit(CoreEvent::Sync(SyncEvent::PassCompleted {
                            folder_id: folder_id.to_string(),
                            downloaded: result.downloaded as u64,
                            evicted: result.evicted as u64,
                            total_items: result.playable_items.len() as u64,
                            changed: result.changed,
                            duration_ms: started.elapsed().as_millis() as u64,
                        }))
                        .ok();

                    if results.send(result).await.is_err() {
                        debug!(folder_id, "sync result consumer gone, stopping poll loop");
                        break;
                    }
                    delay = interval;
                }
                Err(e) => {
                    delay = next_backoff(delay);
                    warn!(
                        folder_id,
                        "sync pass failed: {}; next attempt in {}s",
                        e,
                        delay.as_secs()
                    );
                    self.event_bus
                        .emit(CoreEvent::Sync(SyncEvent::PassFailed {
                            folder_id: folder_id.to_string(),
                            message: e.to_string(),
                            retry_in_secs: delay.as_secs(),
                        }))
                        .ok();
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }

        debug!(folder_id, "sync poll loop stopped");
    }

    async fn refresh_interval(&self) -> Duration {
        let seconds = match self.settings.update_interval_seconds().await {
            Ok(value) => clamp_update_interval(value),
            Err(e) => {
                debug!("settings unavailable, using default update interval: {}", e);
                DEFAULT_UPDATE_INTERVAL_SECONDS
            }
        };
        Duration::from_secs(seconds)
    }
}
