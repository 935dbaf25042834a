//! Feature-tracking control loop core.
//!
//! [`KltTracker`] owns the decision logic of the per-frame state machine:
//! compute cadence, loss accounting and the re-seed policy. It never
//! calls a collaborator itself; the playback session feeds it detector
//! and estimator output and acts on the outcome it returns.

use crate::tracker::motion::Point2;
use crate::tracker::track_state::TrackState;

/// Parameters handed to the feature detector.
#[derive(Debug, Clone, Copy)]
pub struct DetectParams {
    pub max_corners: usize,
    pub quality_level: f64,
    pub min_distance: f64,
    pub block_size: i32,
    pub use_harris: bool,
    pub harris_k: f64,
}

/// Configuration for the tracking controller.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Upper bound on the tracked point count
    pub max_corners: usize,
    /// Compute cadence: flow runs every `frame_skip - 1` frames
    pub frame_skip: u32,
    /// Loss-rate threshold above which the point set is re-seeded
    pub max_loss_rate: f64,
    /// Absolute loss threshold above which the point set is re-seeded
    pub max_absolute_losses: usize,
    /// Sub-pixel refinement window radius; flow window is `4 * w + 1`
    pub window_size: i32,
    /// Depth of the multi-resolution flow estimation
    pub pyramid_levels: i32,
    /// Detection quality level for the initial seed
    pub seed_quality_level: f64,
    /// Detection quality level for re-seeds after degraded tracking
    pub reseed_quality_level: f64,
    /// Minimum pixel distance between detected corners
    pub min_distance: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_corners: 400,
            frame_skip: 2,
            max_loss_rate: 0.4,
            max_absolute_losses: 300,
            window_size: 5,
            pyramid_levels: 5,
            seed_quality_level: 0.1,
            reseed_quality_level: 0.01,
            min_distance: 5.0,
        }
    }
}

impl TrackerConfig {
    /// Effective compute interval. `frame_skip <= 2` means flow runs on
    /// every frame; the lower clamp keeps the cadence test well defined
    /// for `frame_skip <= 1`.
    pub fn compute_interval(&self) -> u64 {
        u64::from(self.frame_skip.saturating_sub(1)).max(1)
    }

    /// Detector parameters for the initial seed. The first detection
    /// prefers strong Harris corners.
    pub fn seed_params(&self) -> DetectParams {
        DetectParams {
            max_corners: self.max_corners,
            quality_level: self.seed_quality_level,
            min_distance: self.min_distance,
            block_size: 3,
            use_harris: true,
            harris_k: 0.04,
        }
    }

    /// Detector parameters for a recovery re-seed. The quality bar drops
    /// so a degraded frame still yields a usable point set.
    pub fn reseed_params(&self) -> DetectParams {
        DetectParams {
            use_harris: false,
            quality_level: self.reseed_quality_level,
            ..self.seed_params()
        }
    }
}

/// Classification of the current frame under the compute cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Run refinement and flow estimation, then apply the reset policy
    Compute,
    /// Redraw the last computed vectors only
    Redraw,
}

/// Result of feeding one flow computation into the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowOutcome {
    /// Points the estimator failed to re-locate this cycle
    pub loss_count: usize,
    /// `loss_count / point_count`, or 1.0 for an empty point set
    pub loss_rate: f64,
    /// Whether the reset policy demands a fresh detection
    pub reset_required: bool,
}

/// The tracking controller: cadence, loss accounting and reset policy
/// over a [`TrackState`].
#[derive(Debug, Clone, Default)]
pub struct KltTracker {
    state: TrackState,
    config: TrackerConfig,
}

impl KltTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            state: TrackState::new(),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    /// Install the first detector output before the loop starts.
    pub fn seed(&mut self, points: Vec<Point2>) {
        self.state.seed(points);
    }

    /// Classify the current frame under the cadence policy.
    pub fn frame_kind(&self) -> FrameKind {
        if self.state.frame_index() % self.config.compute_interval() == 0 {
            FrameKind::Compute
        } else {
            FrameKind::Redraw
        }
    }

    /// Apply one flow computation and evaluate the reset policy.
    ///
    /// An empty point set counts as total loss and always demands a
    /// reset, so a wedged zero-point state cannot persist and the rate
    /// computation never divides by zero.
    pub fn observe_flow(
        &mut self,
        refined_previous: Vec<Point2>,
        next_points: Vec<Point2>,
        found: Vec<bool>,
    ) -> FlowOutcome {
        let entered_empty = self.state.point_count() == 0;
        let loss_count = self.state.apply_flow(refined_previous, next_points, found);

        let point_count = self.state.point_count();
        let loss_rate = if point_count > 0 {
            loss_count as f64 / point_count as f64
        } else {
            1.0
        };

        let reset_required = entered_empty
            || loss_rate > self.config.max_loss_rate
            || loss_count > self.config.max_absolute_losses;

        FlowOutcome {
            loss_count,
            loss_rate,
            reset_required,
        }
    }

    /// Install a fresh detector output after degraded tracking. The
    /// frame of the re-seed draws zero-length vectors.
    pub fn reseed(&mut self, points: Vec<Point2>) {
        self.state.reseed(points);
    }

    /// Iteration boundary bookkeeping.
    pub fn advance_frame(&mut self) {
        self.state.advance_frame();
    }
}
