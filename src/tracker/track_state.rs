//! Persistent per-session tracking state.

use crate::tracker::motion::{MotionVector, Point2};

/// The point correspondences and bookkeeping carried across loop
/// iterations.
///
/// `previous`, `current` and `found` are always index-aligned and of
/// equal length after any update. Lost points are flagged, not removed;
/// they only leave the set on a re-seed.
#[derive(Debug, Clone, Default)]
pub struct TrackState {
    /// Correspondence anchors from the last flow computation
    previous: Vec<Point2>,
    /// Most recent estimated positions
    current: Vec<Point2>,
    /// Per-point tracked-this-cycle flags
    found: Vec<bool>,
    /// Frame index driving the compute cadence
    frame_index: u64,
    /// Points lost in the most recent compute cycle
    loss_count: usize,
}

impl TrackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the initial detector output. Both point sets start equal,
    /// so the first drawn vectors are zero-length.
    pub fn seed(&mut self, points: Vec<Point2>) {
        self.previous = points.clone();
        self.current = points;
        self.found = vec![true; self.current.len()];
        self.loss_count = 0;
        self.assert_aligned();
    }

    /// Replace the point set wholesale from a fresh detector output.
    /// Semantically identical to [`seed`](Self::seed); spelled separately
    /// because it marks a recovery, not session start.
    pub fn reseed(&mut self, points: Vec<Point2>) {
        self.seed(points);
    }

    /// Apply one flow computation atomically: the refined previous
    /// positions become the anchors, the estimated positions and flags
    /// replace the current set. Returns the number of points the
    /// estimator failed to re-locate this cycle.
    pub fn apply_flow(
        &mut self,
        refined_previous: Vec<Point2>,
        next_points: Vec<Point2>,
        found: Vec<bool>,
    ) -> usize {
        self.previous = refined_previous;
        self.current = next_points;
        self.found = found;
        self.loss_count = self.found.iter().filter(|f| !**f).count();
        self.assert_aligned();
        self.loss_count
    }

    /// Iteration boundary: bump the cadence counter and clear the
    /// per-cycle loss accounting.
    pub fn advance_frame(&mut self) {
        self.frame_index += 1;
        self.loss_count = 0;
    }

    pub fn point_count(&self) -> usize {
        self.current.len()
    }

    pub fn loss_count(&self) -> usize {
        self.loss_count
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn previous_points(&self) -> &[Point2] {
        &self.previous
    }

    pub fn current_points(&self) -> &[Point2] {
        &self.current
    }

    pub fn found_flags(&self) -> &[bool] {
        &self.found
    }

    /// Motion vectors for the points that were successfully tracked in
    /// the last compute cycle, in point order. Lost points are skipped.
    pub fn motion_vectors(&self) -> impl Iterator<Item = MotionVector> + '_ {
        self.previous
            .iter()
            .zip(&self.current)
            .zip(&self.found)
            .filter(|(_, found)| **found)
            .map(|((from, to), _)| MotionVector::new(*from, *to))
    }

    fn assert_aligned(&self) {
        debug_assert_eq!(self.previous.len(), self.current.len());
        debug_assert_eq!(self.found.len(), self.current.len());
    }
}
