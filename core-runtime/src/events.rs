//! # Event Bus System
//!
//! Event-driven architecture for the signage core using
//! `tokio::sync::broadcast`. Sync passes and playback transitions are
//! published as typed events that hosts can observe for status surfaces,
//! diagnostics, or logging.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, SyncEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Sync(SyncEvent::PassStarted {
//!         folder_id: "folder-123".to_string(),
//!     }))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! The broadcast channel produces two receive errors:
//!
//! - `RecvError::Lagged(n)`: the subscriber missed `n` events. Non-fatal;
//!   the subscriber keeps receiving newer events.
//! - `RecvError::Closed`: all senders dropped, which signals shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Synchronization events
    Sync(SyncEvent),
    /// Playback events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::PassFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::ItemSkipped { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::PassCompleted { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::PlaylistEmptied) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events emitted by the sync poll loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A reconciliation pass started.
    PassStarted {
        /// The remote folder being reconciled.
        folder_id: String,
    },
    /// A reconciliation pass finished successfully.
    PassCompleted {
        /// The remote folder that was reconciled.
        folder_id: String,
        /// Number of items downloaded this pass.
        downloaded: u64,
        /// Number of stale local copies evicted this pass.
        evicted: u64,
        /// Total playable items after the pass.
        total_items: u64,
        /// Whether the playable set changed.
        changed: bool,
        /// Wall-clock duration of the pass in milliseconds.
        duration_ms: u64,
    },
    /// A reconciliation pass failed and will be retried with backoff.
    PassFailed {
        /// The remote folder being reconciled.
        folder_id: String,
        /// Human-readable failure message.
        message: String,
        /// Seconds until the next attempt.
        retry_in_secs: u64,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::PassStarted { .. } => "Sync pass started",
            SyncEvent::PassCompleted { .. } => "Sync pass completed",
            SyncEvent::PassFailed { .. } => "Sync pass failed",
        }
    }
}

/// Events emitted by the playback continuity controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A refreshed playlist replaced the previous one.
    PlaylistReplaced {
        /// Number of playable items in the new playlist.
        item_count: u64,
    },
    /// A presentation command was issued for an item.
    ItemPresented {
        /// The item's remote identifier.
        item_id: String,
        /// Display name of the item.
        name: String,
        /// Media kind ("image" or "video").
        kind: String,
    },
    /// The renderer failed on an item and the loop advanced past it.
    ItemSkipped {
        /// The item's remote identifier.
        item_id: String,
        /// Human-readable failure message.
        message: String,
    },
    /// The playable set became empty and presentation stopped.
    PlaylistEmptied,
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::PlaylistReplaced { .. } => "Playlist replaced",
            PlaybackEvent::ItemPresented { .. } => "Item presented",
            PlaybackEvent::ItemSkipped { .. } => "Item skipped",
            PlaybackEvent::PlaylistEmptied => "Playlist emptied",
        }
    }
}

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally: multiple producers (clone the
/// `EventBus`), multiple independent consumers (each `subscribe()` creates
/// a new receiver), non-blocking sends, lagging detection for slow
/// subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none. Publishers treat that error as benign:
    /// observing events is optional.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
