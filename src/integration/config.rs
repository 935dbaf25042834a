//! Session configuration with documented defaults.

use crate::tracker::TrackerConfig;

/// Space bar, the default stop key.
pub const STOP_KEY_SPACE: i32 = 32;

/// Configuration for a playback session, consolidating every tunable
/// of the pipeline in one place.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller configuration (cadence, thresholds, detection params)
    pub tracker: TrackerConfig,
    /// Output and analysis width in pixels
    pub width: u32,
    /// Output and analysis height in pixels
    pub height: u32,
    /// Frames to discard before the first detection
    pub fast_forward: u32,
    /// Key code that stops the session
    pub stop_key: i32,
    /// Bound on the per-iteration input poll
    pub poll_timeout_ms: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            width: 960,
            height: 540,
            fast_forward: 0,
            stop_key: STOP_KEY_SPACE,
            poll_timeout_ms: 1,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output and analysis resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of frames discarded before the first detection.
    pub fn with_fast_forward(mut self, frames: u32) -> Self {
        self.fast_forward = frames;
        self
    }

    /// Set the key code that stops the session.
    pub fn with_stop_key(mut self, key: i32) -> Self {
        self.stop_key = key;
        self
    }

    /// Replace the controller configuration.
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }
}
