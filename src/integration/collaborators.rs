//! Traits for the external collaborators of the tracking loop.
//!
//! The controller treats frame acquisition, corner detection, sub-pixel
//! refinement, flow estimation, rendering and input polling as black
//! boxes. Implement these traits to connect any vision backend to the
//! session; the `opencv-backend` feature ships one built on OpenCV.

use crate::tracker::{DetectParams, MotionVector, Point2};

/// Errors surfaced by a tracking session.
///
/// Only source-open failures are fatal to the caller. Degraded tracking
/// is recovered internally by the re-seed policy and never appears
/// here; end-of-stream and the stop key are normal terminations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The video source could not be opened.
    #[error("failed to open video source `{path}`: {reason}")]
    Open { path: String, reason: String },
    /// A collaborator call failed mid-session.
    #[error("backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One frame pulled from a source: the resized display frame and its
/// grayscale conversion for analysis.
#[derive(Debug, Clone)]
pub struct SourceFrame<F> {
    pub display: F,
    pub gray: F,
}

/// Sequential frame producer, normalized to the session resolution.
pub trait FrameSource {
    /// Backend frame type shared by all collaborators of a session.
    type Frame;

    /// Pull the next frame. `Ok(None)` marks end of stream, which is a
    /// normal termination condition rather than a fault.
    fn next_frame(&mut self) -> Result<Option<SourceFrame<Self::Frame>>>;
}

/// Corner detector. Deterministic for identical input frame and
/// parameters; returns at most `params.max_corners` points.
pub trait FeatureDetector<F> {
    fn detect(&mut self, gray: &F, params: &DetectParams) -> Result<Vec<Point2>>;
}

/// Sub-pixel corner refinement. Output has the same length and order
/// as the input.
pub trait SubpixRefiner<F> {
    fn refine(&mut self, gray: &F, points: Vec<Point2>, window_size: i32) -> Result<Vec<Point2>>;
}

/// Per-point flow estimation result, index-aligned with the input.
#[derive(Debug, Clone, Default)]
pub struct FlowField {
    pub points: Vec<Point2>,
    pub found: Vec<bool>,
}

/// Sparse optical-flow estimator between two grayscale frames.
pub trait MotionEstimator<F> {
    fn estimate(&mut self, prev_gray: &F, gray: &F, points: &[Point2]) -> Result<FlowField>;
}

/// Display surface for the overlay.
pub trait Renderer<F> {
    fn draw_vector(&mut self, frame: &mut F, vector: MotionVector) -> Result<()>;
    fn present(&mut self, frame: &F) -> Result<()>;
}

/// Non-blocking key poll, bounded by a small timeout and checked once
/// per loop iteration.
pub trait InputPoll {
    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<i32>>;
}
