//! Integration tests for the playback continuity controller.
//!
//! A recording mock renderer captures every presentation command, so the
//! tests can assert not just the final state but exactly which commands a
//! transition did (or did not) issue.

use async_trait::async_trait;
use bridge_traits::render::{Renderer, RendererEvent};
use bridge_traits::settings::SettingsProvider;
use core_playback::PlaybackController;
use core_runtime::events::EventBus;
use core_sync::manifest::{PlayableItem, SyncResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mocks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    ShowImage(PathBuf),
    PlayVideo(PathBuf, bool),
    Stop,
}

struct RecordingRenderer {
    commands: Mutex<Vec<Command>>,
    fail_next: AtomicBool,
    events: broadcast::Sender<RendererEvent>,
}

impl RecordingRenderer {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
            events,
        })
    }

    fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    fn fail_next_command(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn end_playback(&self) {
        self.events.send(RendererEvent::PlaybackEnded).ok();
    }

    fn fail_playback(&self, message: &str) {
        self.events
            .send(RendererEvent::PlaybackFailed {
                message: message.to_string(),
            })
            .ok();
    }

    fn check_failure(&self) -> bridge_traits::error::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(bridge_traits::error::BridgeError::OperationFailed(
                "surface unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn show_image(&self, path: &Path) -> bridge_traits::error::Result<()> {
        self.check_failure()?;
        self.commands
            .lock()
            .unwrap()
            .push(Command::ShowImage(path.to_path_buf()));
        Ok(())
    }

    async fn play_video(
        &self,
        path: &Path,
        loop_single: bool,
    ) -> bridge_traits::error::Result<()> {
        self.check_failure()?;
        self.commands
            .lock()
            .unwrap()
            .push(Command::PlayVideo(path.to_path_buf(), loop_single));
        Ok(())
    }

    async fn stop(&self) -> bridge_traits::error::Result<()> {
        self.commands.lock().unwrap().push(Command::Stop);
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<RendererEvent> {
        self.events.subscribe()
    }
}

struct FixedSettings {
    image_duration: u64,
}

#[async_trait]
impl SettingsProvider for FixedSettings {
    async fn image_duration_seconds(&self) -> bridge_traits::error::Result<u64> {
        Ok(self.image_duration)
    }

    async fn update_interval_seconds(&self) -> bridge_traits::error::Result<u64> {
        Ok(300)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn item(id: &str, name: &str, mime: &str, path: &str) -> PlayableItem {
    PlayableItem {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime.to_string(),
        local_path: PathBuf::from(path),
    }
}

fn refresh(items: Vec<PlayableItem>) -> SyncResult {
    SyncResult {
        changed: true,
        downloaded: 0,
        evicted: 0,
        playable_items: items,
    }
}

/// Playlist from the worked example: remote names B.jpg (image) and A.mp4
/// (video) sort to [A.mp4, B.jpg].
fn video_then_image() -> Vec<PlayableItem> {
    vec![
        item("b", "A.mp4", "video/mp4", "/cache/f/b_A.mp4"),
        item("a", "B.jpg", "image/jpeg", "/cache/f/a_B.jpg"),
    ]
}

fn controller_with(
    renderer: Arc<RecordingRenderer>,
    image_duration: u64,
) -> Arc<PlaybackController> {
    PlaybackController::new(
        renderer,
        Arc::new(FixedSettings { image_duration }),
        EventBus::new(32),
    )
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn first_playlist_presents_index_zero() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;

    assert_eq!(
        renderer.commands(),
        vec![Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), false)]
    );
}

#[tokio::test]
async fn finished_video_advances_to_image_then_wraps() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;
    controller.on_item_finished().await;
    controller.on_item_finished().await;

    assert_eq!(
        renderer.commands(),
        vec![
            Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), false),
            Command::ShowImage(PathBuf::from("/cache/f/a_B.jpg")),
            Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), false),
        ]
    );
}

#[tokio::test]
async fn untouched_refresh_issues_no_command() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;
    let before = renderer.commands().len();

    // Same current item at the same path, one unrelated item appended.
    let mut updated = video_then_image();
    updated.push(item("c", "C.png", "image/png", "/cache/f/c_C.png"));
    controller.on_sync_result(refresh(updated)).await;

    assert_eq!(renderer.commands().len(), before);

    // The index tracked the refresh: advancing presents the next item of
    // the new playlist, not a restart at index 0.
    controller.on_item_finished().await;
    assert_eq!(
        renderer.commands().last().unwrap(),
        &Command::ShowImage(PathBuf::from("/cache/f/a_B.jpg"))
    );
}

#[tokio::test]
async fn replaced_content_restarts_only_the_current_item() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;

    // Same id, new local path: the content was replaced under the item.
    let updated = vec![
        item("b", "A.mp4", "video/mp4", "/cache/f/b_A2.mp4"),
        item("a", "B.jpg", "image/jpeg", "/cache/f/a_B.jpg"),
    ];
    controller.on_sync_result(refresh(updated)).await;

    let commands = renderer.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[1],
        Command::PlayVideo(PathBuf::from("/cache/f/b_A2.mp4"), false)
    );
}

#[tokio::test]
async fn vanished_current_item_restarts_at_index_zero() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;
    controller.on_item_finished().await; // now at the image, index 1

    // The image disappeared from the remote folder.
    let updated = vec![
        item("b", "A.mp4", "video/mp4", "/cache/f/b_A.mp4"),
        item("c", "C.png", "image/png", "/cache/f/c_C.png"),
    ];
    controller.on_sync_result(refresh(updated)).await;

    assert_eq!(
        renderer.commands().last().unwrap(),
        &Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), false)
    );
}

#[tokio::test]
async fn empty_refresh_stops_the_renderer() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;
    controller.on_sync_result(refresh(Vec::new())).await;

    assert_eq!(renderer.commands().last().unwrap(), &Command::Stop);

    // Finishing events in Empty are ignored.
    let before = renderer.commands().len();
    controller.on_item_finished().await;
    assert_eq!(renderer.commands().len(), before);
}

#[tokio::test]
async fn single_video_playlist_loops_in_the_renderer() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller
        .on_sync_result(refresh(vec![item(
            "b",
            "A.mp4",
            "video/mp4",
            "/cache/f/b_A.mp4",
        )]))
        .await;

    assert_eq!(
        renderer.commands(),
        vec![Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), true)]
    );
}

#[tokio::test]
async fn resume_is_a_noop_while_presenting() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    controller.on_sync_result(refresh(video_then_image())).await;
    let before = renderer.commands().len();

    controller.on_resume().await;
    controller.on_resume().await;

    assert_eq!(renderer.commands().len(), before);
}

#[tokio::test]
async fn resume_retries_after_a_failed_presentation() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);

    renderer.fail_next_command();
    controller.on_sync_result(refresh(video_then_image())).await;
    assert!(renderer.commands().is_empty());

    controller.on_resume().await;
    assert_eq!(
        renderer.commands(),
        vec![Command::PlayVideo(PathBuf::from("/cache/f/b_A.mp4"), false)]
    );
}

#[tokio::test]
async fn renderer_end_of_stream_event_advances() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);
    let cancel = CancellationToken::new();
    let pump = controller.spawn_renderer_pump(cancel.clone());

    controller.on_sync_result(refresh(video_then_image())).await;
    renderer.end_playback();

    let r = renderer.clone();
    wait_for(move || r.commands().len() == 2).await;
    assert_eq!(
        renderer.commands()[1],
        Command::ShowImage(PathBuf::from("/cache/f/a_B.jpg"))
    );

    cancel.cancel();
    pump.await.unwrap();
}

#[tokio::test]
async fn renderer_failure_event_skips_the_item() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 3600);
    let cancel = CancellationToken::new();
    let pump = controller.spawn_renderer_pump(cancel.clone());

    controller.on_sync_result(refresh(video_then_image())).await;
    renderer.fail_playback("demuxer choked");

    let r = renderer.clone();
    wait_for(move || r.commands().len() == 2).await;
    assert_eq!(
        renderer.commands()[1],
        Command::ShowImage(PathBuf::from("/cache/f/a_B.jpg"))
    );

    cancel.cancel();
    pump.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn image_timer_advances_automatically() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 5);

    // Image first so the timer arms immediately.
    controller
        .on_sync_result(refresh(vec![
            item("a", "B.jpg", "image/jpeg", "/cache/f/a_B.jpg"),
            item("b", "C.mp4", "video/mp4", "/cache/f/b_C.mp4"),
        ]))
        .await;
    assert_eq!(renderer.commands().len(), 1);

    let r = renderer.clone();
    wait_for(move || r.commands().len() == 2).await;
    assert_eq!(
        renderer.commands()[1],
        Command::PlayVideo(PathBuf::from("/cache/f/b_C.mp4"), false)
    );
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_a_pending_image_timer() {
    let renderer = RecordingRenderer::new();
    let controller = controller_with(renderer.clone(), 5);

    controller
        .on_sync_result(refresh(vec![
            item("a", "B.jpg", "image/jpeg", "/cache/f/a_B.jpg"),
            item("b", "C.mp4", "video/mp4", "/cache/f/b_C.mp4"),
        ]))
        .await;
    controller.stop().await;
    let after_stop = renderer.commands().len();

    // Let the (cancelled) timer's deadline pass; nothing may happen.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(renderer.commands().len(), after_stop);
    assert_eq!(renderer.commands().last().unwrap(), &Command::Stop);
}
