//! # kltrack-rs
//!
//! Sparse feature tracking over a video stream with motion-vector
//! visualization and automatic recovery. A set of corner points is
//! advanced frame to frame by pyramidal Lucas-Kanade optical flow on a
//! configurable cadence; when too many points are lost the set is
//! re-seeded from a fresh corner detection.
//!
//! The crate splits into a pure [`tracker`] core (state machine, loss
//! accounting, reset policy) and an [`integration`] layer of
//! collaborator traits plus the playback session. The optional
//! `opencv-backend` feature provides OpenCV implementations of the
//! collaborators and enables the `kltrack` visualizer binary.
//!
//! ```no_run
//! use kltrack_rs::{KltTracker, TrackerConfig};
//!
//! let mut tracker = KltTracker::new(TrackerConfig::default());
//! tracker.seed(vec![]);
//! ```

pub mod integration;
pub mod tracker;

pub use integration::{
    Error, FeatureDetector, FlowField, FrameSource, InputPoll, MotionEstimator, Renderer, Result,
    SessionConfig, SessionSummary, SourceFrame, StopReason, SubpixRefiner, TrackingSession,
};
pub use tracker::{
    DetectParams, FlowOutcome, FrameKind, KltTracker, MotionVector, Point2, TrackState,
    TrackerConfig,
};
