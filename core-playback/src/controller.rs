//! # Playback Continuity Controller
//!
//! Keeps an uninterrupted presentation running across repeated background
//! refreshes. The controller is a small state machine over `{Empty,
//! Showing}` driven by three external events:
//!
//! - `on_sync_result`: a refreshed playlist arrived from the sync loop
//! - `on_item_finished`: the current item ended (image timer elapsed or a
//!   video reached end of stream)
//! - `on_resume`: the presentation surface regained focus
//!
//! A refresh that does not touch the current item is transparent: the
//! playlist and index are updated but no presentation command is issued,
//! so ongoing playback continues without interruption. When the current
//! item's content was replaced under the same id, exactly that item is
//! restarted at its new position; when it disappeared, presentation
//! restarts at index 0.
//!
//! All events funnel through one async mutex, so updates are atomic with
//! respect to controller state no matter which execution context delivers
//! them. Image timers are one-shot tasks guarded by an epoch counter and a
//! cancellation token; a superseded or cancelled timer never mutates the
//! controller, and timer tasks hold only a weak reference so a dropped
//! controller cannot be called back.

use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;

use bridge_traits::render::{Renderer, RendererEvent};
use bridge_traits::settings::{
    clamp_image_duration, SettingsProvider, DEFAULT_IMAGE_DURATION_SECONDS,
};
use bridge_traits::source::MediaKind;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, RecvError};
use core_sync::manifest::{PlayableItem, SyncResult};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The item a presentation command was last issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CurrentItem {
    id: String,
    path: PathBuf,
}

/// Presentation phase. `Showing` carries the playlist payload; the initial
/// phase is `Empty`.
enum PresentationState {
    Empty,
    Showing {
        playlist: Vec<PlayableItem>,
        index: usize,
        current: CurrentItem,
    },
}

struct ControllerState {
    phase: PresentationState,
    /// Cancels the pending image timer, if one is armed.
    image_timer: Option<CancellationToken>,
    /// Bumped on every presentation and stop. A timer callback whose epoch
    /// no longer matches is stale and drops itself.
    epoch: u64,
    /// Whether the last presentation command for the current item
    /// succeeded. `on_resume` only re-presents when it did not.
    presented_ok: bool,
    /// Set once the controller is torn down; all further events are no-ops.
    stopped: bool,
}

/// Drives a [`Renderer`] from successive [`SyncResult`]s.
pub struct PlaybackController {
    renderer: Arc<dyn Renderer>,
    settings: Arc<dyn SettingsProvider>,
    event_bus: EventBus,
    state: Mutex<ControllerState>,
    /// Handed to timer tasks and the renderer pump so neither keeps the
    /// controller alive or calls into a dropped one.
    weak_self: Weak<PlaybackController>,
}

impl PlaybackController {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        settings: Arc<dyn SettingsProvider>,
        event_bus: EventBus,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            renderer,
            settings,
            event_bus,
            state: Mutex::new(ControllerState {
                phase: PresentationState::Empty,
                image_timer: None,
                epoch: 0,
                presented_ok: false,
                stopped: false,
            }),
            weak_self: weak_self.clone(),
        })
    }

    /// Spawn the pump that forwards renderer notifications (end of stream,
    /// failures) into the controller. Stops when `cancel` fires, when the
    /// renderer closes its event channel, or when the controller is
    /// dropped.
    pub fn spawn_renderer_pump(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let mut events = self.renderer.subscribe_events();
        let controller = self.weak_self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => {
                        let Some(controller) = controller.upgrade() else { break };
                        match event {
                            Ok(RendererEvent::PlaybackEnded) => {
                                controller.on_item_finished().await;
                            }
                            Ok(RendererEvent::PlaybackFailed { message }) => {
                                controller.on_item_failed(&message).await;
                            }
                            Err(RecvError::Lagged(missed)) => {
                                warn!(missed, "renderer event pump lagged");
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }
            debug!("renderer event pump stopped");
        })
    }

    /// A refreshed playlist arrived from the sync loop.
    pub async fn on_sync_result(&self, result: SyncResult) {
        let mut state = self.state.lock().await;
        if state.stopped {
            return;
        }

        if result.playable_items.is_empty() {
            self.enter_empty(&mut state).await;
            return;
        }

        let playlist = result.playable_items;
        self.event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::PlaylistReplaced {
                item_count: playlist.len() as u64,
            }))
            .ok();

        let previous = match &state.phase {
            PresentationState::Showing { current, .. } => Some(current.clone()),
            PresentationState::Empty => None,
        };
        let found = previous
            .as_ref()
            .and_then(|cur| playlist.iter().position(|item| item.id == cur.id));

        if let (Some(index), Some(current)) = (found, previous) {
            if playlist[index].local_path == current.path && state.presented_ok {
                // Transparent refresh: same item, same bytes. Keep playing.
                state.phase = PresentationState::Showing {
                    playlist,
                    index,
                    current,
                };
                debug!(index, "refresh left the current item untouched");
                return;
            }
        }

        // Restart at the surviving item's new position, or from the top.
        let index = found.unwrap_or(0);
        self.present(&mut state, playlist, index).await;
    }

    /// The current item ended: image dwell time elapsed or the renderer
    /// reached end of stream.
    pub async fn on_item_finished(&self) {
        let mut state = self.state.lock().await;
        if state.stopped {
            return;
        }
        self.advance(&mut state).await;
    }

    /// The presentation surface regained focus. Idempotent: while the
    /// current item is still being presented this is a no-op, so focus
    /// churn cannot cause restart loops.
    pub async fn on_resume(&self) {
        let mut state = self.state.lock().await;
        if state.stopped {
            return;
        }
        let (playlist, index) = match &state.phase {
            PresentationState::Showing {
                playlist, index, ..
            } => (playlist.clone(), *index),
            PresentationState::Empty => return,
        };
        if state.presented_ok {
            debug!("resume with an active presentation, nothing to do");
            return;
        }
        self.present(&mut state, playlist, index).await;
    }

    /// Tear the controller down: cancel any pending image timer, stop the
    /// renderer, and ignore all further events.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if state.stopped {
            return;
        }
        state.stopped = true;
        Self::cancel_timer(&mut state);
        state.epoch += 1;
        state.phase = PresentationState::Empty;
        state.presented_ok = false;
        if let Err(e) = self.renderer.stop().await {
            warn!("renderer stop failed during teardown: {}", e);
        }
        info!("playback controller stopped");
    }

    /// The renderer gave up on the current item; advance past it.
    async fn on_item_failed(&self, message: &str) {
        let mut state = self.state.lock().await;
        if state.stopped {
            return;
        }
        if let PresentationState::Showing { current, .. } = &state.phase {
            warn!(item_id = %current.id, "renderer failed on item: {}", message);
            self.event_bus
                .emit(CoreEvent::Playback(PlaybackEvent::ItemSkipped {
                    item_id: current.id.clone(),
                    message: message.to_string(),
                }))
                .ok();
        }
        self.advance(&mut state).await;
    }

    async fn advance(&self, state: &mut ControllerState) {
        let (playlist, index) = match &state.phase {
            PresentationState::Showing {
                playlist, index, ..
            } => (playlist.clone(), *index),
            PresentationState::Empty => return,
        };
        let next = (index + 1) % playlist.len();
        self.present(state, playlist, next).await;
    }

    /// Issue the presentation command for `playlist[index]` and record it
    /// as the current item.
    async fn present(
        &self,
        state: &mut ControllerState,
        playlist: Vec<PlayableItem>,
        index: usize,
    ) {
        Self::cancel_timer(state);
        state.epoch += 1;

        let item = playlist[index].clone();
        let loop_single = playlist.len() == 1;
        state.phase = PresentationState::Showing {
            playlist,
            index,
            current: CurrentItem {
                id: item.id.clone(),
                path: item.local_path.clone(),
            },
        };

        let kind = item.media_kind();
        let is_image = matches!(kind, Some(MediaKind::Image));
        let outcome = if is_image {
            self.renderer.show_image(&item.local_path).await
        } else {
            // A single-item video playlist loops in the renderer instead
            // of round-tripping end-of-stream notifications.
            self.renderer.play_video(&item.local_path, loop_single).await
        };

        match outcome {
            Ok(()) => {
                state.presented_ok = true;
                let kind_label = kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "video".to_string());
                debug!(item_id = %item.id, name = %item.name, kind = %kind_label, index, "presenting item");
                self.event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::ItemPresented {
                        item_id: item.id.clone(),
                        name: item.name.clone(),
                        kind: kind_label,
                    }))
                    .ok();
                if is_image {
                    self.arm_image_timer(state).await;
                }
            }
            Err(e) => {
                state.presented_ok = false;
                warn!(item_id = %item.id, "presentation command failed: {}", e);
            }
        }
    }

    /// Arm the one-shot dwell timer for the image just presented.
    async fn arm_image_timer(&self, state: &mut ControllerState) {
        let seconds = match self.settings.image_duration_seconds().await {
            Ok(value) => clamp_image_duration(value),
            Err(e) => {
                debug!("settings unavailable, using default image duration: {}", e);
                DEFAULT_IMAGE_DURATION_SECONDS
            }
        };
        let duration = Duration::from_secs(seconds);

        let token = CancellationToken::new();
        state.image_timer = Some(token.clone());
        let epoch = state.epoch;
        let weak = self.weak_self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    if let Some(controller) = weak.upgrade() {
                        controller.image_timer_elapsed(epoch).await;
                    }
                }
            }
        });
    }

    fn image_timer_elapsed(
        &self,
        epoch: u64,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.stopped || state.epoch != epoch {
                return;
            }
            self.advance(&mut state).await;
        })
    }

    /// Transition to `Empty`, stopping the renderer if something was on
    /// screen.
    async fn enter_empty(&self, state: &mut ControllerState) {
        Self::cancel_timer(state);
        state.epoch += 1;
        state.presented_ok = false;
        let was_showing = matches!(state.phase, PresentationState::Showing { .. });
        state.phase = PresentationState::Empty;
        if was_showing {
            if let Err(e) = self.renderer.stop().await {
                warn!("renderer stop failed: {}", e);
            }
            self.event_bus
                .emit(CoreEvent::Playback(PlaybackEvent::PlaylistEmptied))
                .ok();
            info!("playlist empty, presentation stopped");
        }
    }

    fn cancel_timer(state: &mut ControllerState) {
        if let Some(token) = state.image_timer.take() {
            token.cancel();
        }
    }
}
