//! Renderer Abstraction
//!
//! The playback continuity controller drives an on-screen surface through
//! this trait. Hosts implement it over their native media stack; the core
//! never touches pixels or codecs.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::broadcast;

use crate::error::Result;

/// Notifications a renderer pushes back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    /// The current video reached its natural end of stream.
    ///
    /// Not emitted while looping a single video, and never emitted for
    /// still images (those are timed by the controller).
    PlaybackEnded,

    /// The renderer could not present the current item.
    PlaybackFailed { message: String },
}

/// Capability trait for presenting media on screen.
///
/// Calls are presentation commands, not queries: issuing `show_image` or
/// `play_video` replaces whatever was previously on screen. Completion of a
/// video is signalled through the event channel, not a return value.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Display a still image until the next presentation command.
    async fn show_image(&self, path: &Path) -> Result<()>;

    /// Start playback of a video file.
    ///
    /// When `loop_single` is true the renderer must loop the video
    /// indefinitely instead of emitting [`RendererEvent::PlaybackEnded`].
    async fn play_video(&self, path: &Path, loop_single: bool) -> Result<()>;

    /// Stop playback and blank the surface.
    async fn stop(&self) -> Result<()>;

    /// Subscribe to renderer notifications (end of stream, failures).
    ///
    /// Each call returns an independent receiver; events published before
    /// subscribing are not replayed.
    fn subscribe_events(&self) -> broadcast::Receiver<RendererEvent>;
}
