//! # Playback Module
//!
//! Presentation continuity for the signage loop.
//!
//! ## Overview
//!
//! This module consumes successive sync results and drives the host's
//! `Renderer`. It owns the current playlist, the current index, and
//! per-kind timing: still images dwell for a configurable duration, videos
//! run to their natural end of stream, and a single-video playlist loops
//! in the renderer. Across refreshes it preserves the viewer's position
//! whenever the current item survived the refresh unchanged.

pub mod controller;

pub use controller::PlaybackController;
