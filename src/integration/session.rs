//! Playback session wiring the collaborators to the tracking core.

use log::{debug, info};

use crate::integration::collaborators::{
    FeatureDetector, FrameSource, InputPoll, MotionEstimator, Renderer, Result, SourceFrame,
    SubpixRefiner,
};
use crate::integration::config::SessionConfig;
use crate::tracker::{FrameKind, KltTracker};

/// Why a session ended. Both variants are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source ran out of frames
    EndOfStream,
    /// The stop key was pressed
    UserStop,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames analyzed, including the seed frame; fast-forwarded frames
    /// are not counted
    pub frames: u64,
    /// Compute cycles actually run
    pub compute_cycles: u64,
    /// Re-seeds triggered by the reset policy
    pub resets: u64,
    pub stop: StopReason,
}

/// A complete tracking session: frame source, vision backend, display
/// and the controller, run synchronously frame by frame.
///
/// `V` bundles the three analysis collaborators (detector, refiner,
/// estimator) over the source's frame type; `R` bundles the display
/// surface and input polling.
pub struct TrackingSession<S, V, R>
where
    S: FrameSource,
    V: FeatureDetector<S::Frame> + SubpixRefiner<S::Frame> + MotionEstimator<S::Frame>,
    R: Renderer<S::Frame> + InputPoll,
{
    source: S,
    vision: V,
    display: R,
    tracker: KltTracker,
    config: SessionConfig,
}

impl<S, V, R> TrackingSession<S, V, R>
where
    S: FrameSource,
    V: FeatureDetector<S::Frame> + SubpixRefiner<S::Frame> + MotionEstimator<S::Frame>,
    R: Renderer<S::Frame> + InputPoll,
{
    pub fn new(source: S, vision: V, display: R, config: SessionConfig) -> Self {
        let tracker = KltTracker::new(config.tracker.clone());
        Self {
            source,
            vision,
            display,
            tracker,
            config,
        }
    }

    pub fn tracker(&self) -> &KltTracker {
        &self.tracker
    }

    pub fn vision(&self) -> &V {
        &self.vision
    }

    pub fn display(&self) -> &R {
        &self.display
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the loop to completion.
    ///
    /// Processes one frame per iteration: on compute frames the previous
    /// points are refined, flow is estimated and the reset policy is
    /// applied; on redraw frames the last computed vectors are drawn
    /// again. Ends on stream exhaustion or the stop key.
    pub fn run(&mut self) -> Result<SessionSummary> {
        let mut summary = SessionSummary {
            frames: 0,
            compute_cycles: 0,
            resets: 0,
            stop: StopReason::EndOfStream,
        };

        for _ in 0..self.config.fast_forward {
            if self.source.next_frame()?.is_none() {
                return Ok(summary);
            }
        }

        // Seed the point set from the first analyzed frame.
        let Some(first) = self.source.next_frame()? else {
            return Ok(summary);
        };
        let seed = self
            .vision
            .detect(&first.gray, &self.config.tracker.seed_params())?;
        info!("seeded {} feature points", seed.len());
        self.tracker.seed(seed);
        summary.frames = 1;
        let mut prev_gray = first.gray;

        loop {
            let Some(frame) = self.source.next_frame()? else {
                summary.stop = StopReason::EndOfStream;
                break;
            };
            let SourceFrame {
                display: mut canvas,
                gray,
            } = frame;
            summary.frames += 1;

            if self.tracker.frame_kind() == FrameKind::Compute {
                let window_size = self.config.tracker.window_size;
                let anchors = self.tracker.state().current_points().to_vec();
                let refined = self.vision.refine(&prev_gray, anchors, window_size)?;
                let flow = self.vision.estimate(&prev_gray, &gray, &refined)?;
                let outcome = self.tracker.observe_flow(refined, flow.points, flow.found);
                summary.compute_cycles += 1;
                debug!(
                    "compute cycle: {} points, {} lost (rate {:.2})",
                    self.tracker.state().point_count(),
                    outcome.loss_count,
                    outcome.loss_rate,
                );

                if outcome.reset_required {
                    let fresh = self
                        .vision
                        .detect(&gray, &self.config.tracker.reseed_params())?;
                    info!(
                        "tracking degraded ({} lost, rate {:.2}); re-seeded {} points",
                        outcome.loss_count,
                        outcome.loss_rate,
                        fresh.len(),
                    );
                    self.tracker.reseed(fresh);
                    summary.resets += 1;
                }

                // The next compute cycle estimates against this frame.
                prev_gray = gray;
            }

            for vector in self.tracker.state().motion_vectors() {
                self.display.draw_vector(&mut canvas, vector)?;
            }
            self.display.present(&canvas)?;

            if let Some(key) = self.display.poll_key(self.config.poll_timeout_ms)? {
                if key == self.config.stop_key {
                    summary.stop = StopReason::UserStop;
                    break;
                }
            }

            self.tracker.advance_frame();
        }

        info!(
            "session ended ({:?}): {} frames, {} compute cycles, {} resets",
            summary.stop, summary.frames, summary.compute_cycles, summary.resets,
        );
        Ok(summary)
    }
}
