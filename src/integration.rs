//! Integration module connecting vision backends with the tracking core.
//!
//! This module provides the collaborator traits, the session
//! configuration and the playback session that drives the control loop.

mod collaborators;
mod config;
mod session;

pub use collaborators::{
    Error, FeatureDetector, FlowField, FrameSource, InputPoll, MotionEstimator, Renderer, Result,
    SourceFrame, SubpixRefiner,
};
pub use config::{STOP_KEY_SPACE, SessionConfig};
pub use session::{SessionSummary, StopReason, TrackingSession};

#[cfg(feature = "opencv-backend")]
mod opencv_backend;

#[cfg(feature = "opencv-backend")]
pub use opencv_backend::{CvSource, CvVision, CvWindow};
