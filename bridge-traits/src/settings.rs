//! Presentation Settings Abstraction
//!
//! Tunables the host exposes to the signage core. Values are re-read before
//! every sync pass so operators can adjust timing without restarting the
//! loop; out-of-range values are clamped at the call site with the helpers
//! below.

use async_trait::async_trait;

use crate::error::Result;

/// Default still-image dwell time in seconds.
pub const DEFAULT_IMAGE_DURATION_SECONDS: u64 = 10;

/// Default interval between sync passes in seconds.
pub const DEFAULT_UPDATE_INTERVAL_SECONDS: u64 = 300;

/// Allowed image duration range in seconds.
pub const IMAGE_DURATION_BOUNDS: (u64, u64) = (1, 3600);

/// Allowed update interval range in seconds.
pub const UPDATE_INTERVAL_BOUNDS: (u64, u64) = (10, 86_400);

/// Clamp an image duration to its sane bounds.
pub fn clamp_image_duration(seconds: u64) -> u64 {
    seconds.clamp(IMAGE_DURATION_BOUNDS.0, IMAGE_DURATION_BOUNDS.1)
}

/// Clamp an update interval to its sane bounds.
pub fn clamp_update_interval(seconds: u64) -> u64 {
    seconds.clamp(UPDATE_INTERVAL_BOUNDS.0, UPDATE_INTERVAL_BOUNDS.1)
}

/// Capability trait for reading presentation tunables.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// How long a still image stays on screen, in seconds.
    async fn image_duration_seconds(&self) -> Result<u64>;

    /// How often the remote folder is re-synced, in seconds.
    async fn update_interval_seconds(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_image_duration() {
        assert_eq!(clamp_image_duration(0), 1);
        assert_eq!(clamp_image_duration(15), 15);
        assert_eq!(clamp_image_duration(100_000), 3600);
    }

    #[test]
    fn clamps_update_interval() {
        assert_eq!(clamp_update_interval(1), 10);
        assert_eq!(clamp_update_interval(600), 600);
        assert_eq!(clamp_update_interval(1_000_000), 86_400);
    }
}
