use std::collections::VecDeque;

use kltrack_rs::{
    DetectParams, FeatureDetector, FlowField, FrameSource, InputPoll, MotionEstimator, MotionVector,
    Point2, Renderer, SessionConfig, SourceFrame, StopReason, SubpixRefiner, TrackerConfig,
    TrackingSession,
};

/// Frame source yielding a fixed number of synthetic frames. The frame
/// payload is just its index; the mocks never look at pixels.
struct MockSource {
    next: u64,
    total: u64,
}

impl MockSource {
    fn with_frames(total: u64) -> Self {
        Self { next: 0, total }
    }
}

impl FrameSource for MockSource {
    type Frame = u64;

    fn next_frame(&mut self) -> kltrack_rs::Result<Option<SourceFrame<u64>>> {
        if self.next >= self.total {
            return Ok(None);
        }
        let n = self.next;
        self.next += 1;
        Ok(Some(SourceFrame {
            display: n,
            gray: n,
        }))
    }
}

/// Scripted vision backend: detections come from a queue (first pop is
/// the seed, later pops are re-seeds), refinement is the identity, and
/// each flow cycle shifts every point right by one pixel while marking
/// the next scripted loss count as not found.
struct MockVision {
    detections: VecDeque<Vec<Point2>>,
    losses: VecDeque<usize>,
    detect_calls: usize,
}

fn grid(n: usize) -> Vec<Point2> {
    (0..n).map(|i| Point2::new(i as f32, i as f32)).collect()
}

impl MockVision {
    fn new(detections: Vec<Vec<Point2>>, losses: Vec<usize>) -> Self {
        Self {
            detections: detections.into(),
            losses: losses.into(),
            detect_calls: 0,
        }
    }
}

impl FeatureDetector<u64> for MockVision {
    fn detect(&mut self, _gray: &u64, _params: &DetectParams) -> kltrack_rs::Result<Vec<Point2>> {
        self.detect_calls += 1;
        Ok(self.detections.pop_front().unwrap_or_default())
    }
}

impl SubpixRefiner<u64> for MockVision {
    fn refine(
        &mut self,
        _gray: &u64,
        points: Vec<Point2>,
        _window_size: i32,
    ) -> kltrack_rs::Result<Vec<Point2>> {
        Ok(points)
    }
}

impl MotionEstimator<u64> for MockVision {
    fn estimate(
        &mut self,
        _prev_gray: &u64,
        _gray: &u64,
        points: &[Point2],
    ) -> kltrack_rs::Result<FlowField> {
        let lost = self.losses.pop_front().unwrap_or(0);
        Ok(FlowField {
            points: points
                .iter()
                .map(|p| Point2::new(p.x + 1.0, p.y))
                .collect(),
            found: (0..points.len()).map(|i| i >= lost).collect(),
        })
    }
}

/// Display recording the vectors drawn for each presented frame, with a
/// scripted key sequence.
struct MockDisplay {
    pending: Vec<MotionVector>,
    presented: Vec<Vec<MotionVector>>,
    keys: VecDeque<Option<i32>>,
}

impl MockDisplay {
    fn new() -> Self {
        Self::with_keys(vec![])
    }

    fn with_keys(keys: Vec<Option<i32>>) -> Self {
        Self {
            pending: Vec::new(),
            presented: Vec::new(),
            keys: keys.into(),
        }
    }
}

impl Renderer<u64> for MockDisplay {
    fn draw_vector(&mut self, _frame: &mut u64, vector: MotionVector) -> kltrack_rs::Result<()> {
        self.pending.push(vector);
        Ok(())
    }

    fn present(&mut self, _frame: &u64) -> kltrack_rs::Result<()> {
        self.presented.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}

impl InputPoll for MockDisplay {
    fn poll_key(&mut self, _timeout_ms: i32) -> kltrack_rs::Result<Option<i32>> {
        Ok(self.keys.pop_front().unwrap_or(None))
    }
}

fn session_with(
    source: MockSource,
    vision: MockVision,
    display: MockDisplay,
    config: SessionConfig,
) -> TrackingSession<MockSource, MockVision, MockDisplay> {
    TrackingSession::new(source, vision, display, config)
}

#[test]
fn test_terminates_at_end_of_stream() {
    let mut session = session_with(
        MockSource::with_frames(6),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::new(),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();

    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.frames, 6);
    // Seed frame does not compute; all five loop frames do at frame_skip 2.
    assert_eq!(summary.compute_cycles, 5);
    assert_eq!(summary.resets, 0);
}

#[test]
fn test_empty_source_is_not_an_error() {
    let mut session = session_with(
        MockSource::with_frames(0),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::new(),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.stop, StopReason::EndOfStream);
}

#[test]
fn test_stop_key_ends_session() {
    let mut session = session_with(
        MockSource::with_frames(100),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::with_keys(vec![None, None, Some(32)]),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();

    assert_eq!(summary.stop, StopReason::UserStop);
    // Seed frame plus three loop frames; the third poll stops the loop.
    assert_eq!(summary.frames, 4);
}

#[test]
fn test_other_keys_are_ignored() {
    let mut session = session_with(
        MockSource::with_frames(4),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::with_keys(vec![Some(113), Some(27)]),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();
    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.frames, 4);
}

#[test]
fn test_fast_forward_discards_frames() {
    let config = SessionConfig::new().with_fast_forward(2);
    let mut session = session_with(
        MockSource::with_frames(5),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::new(),
        config,
    );
    let summary = session.run().unwrap();
    // Two discarded, one seed, two analyzed.
    assert_eq!(summary.frames, 3);
    assert_eq!(summary.compute_cycles, 2);
}

#[test]
fn test_fast_forward_past_end_of_stream() {
    let config = SessionConfig::new().with_fast_forward(10);
    let mut session = session_with(
        MockSource::with_frames(3),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::new(),
        config,
    );
    let summary = session.run().unwrap();
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.stop, StopReason::EndOfStream);
}

#[test]
fn test_redraw_cadence_skips_estimation() {
    let config = SessionConfig::new().with_tracker(TrackerConfig {
        frame_skip: 3,
        ..TrackerConfig::default()
    });
    let mut session = session_with(
        MockSource::with_frames(7),
        MockVision::new(vec![grid(10)], vec![]),
        MockDisplay::new(),
        config,
    );
    let summary = session.run().unwrap();

    assert_eq!(summary.frames, 7);
    // Loop frames 0..6, compute on even indices only.
    assert_eq!(summary.compute_cycles, 3);

    // Redraw frames re-present the vectors of the last compute cycle.
    let presented = &session.display().presented;
    assert_eq!(presented.len(), 6);
    assert_eq!(presented[0], presented[1]);
    assert_eq!(presented[2], presented[3]);
}

#[test]
fn test_reset_recovers_degraded_tracking() {
    // Seed 50 points. Cycle 1 loses 5 (rate 0.1): no reset. Cycle 2
    // loses 26 (rate 0.52): reset to a fresh 30-point detection. Cycle 3
    // proceeds from the fresh set.
    let vision = MockVision::new(vec![grid(50), grid(30)], vec![5, 26, 0]);
    let mut session = session_with(
        MockSource::with_frames(4),
        vision,
        MockDisplay::new(),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();

    assert_eq!(summary.compute_cycles, 3);
    assert_eq!(summary.resets, 1);
    assert_eq!(session.tracker().state().point_count(), 30);
    // Seed detection plus one re-seed.
    assert_eq!(session.vision().detect_calls, 2);

    let presented = &session.display().presented;
    assert_eq!(presented.len(), 3);
    // Cycle 1: 45 of 50 points survive, all displaced.
    assert_eq!(presented[0].len(), 45);
    assert!(presented[0].iter().all(|v| !v.is_zero()));
    // Reset frame: the fresh set draws zero-length vectors.
    assert_eq!(presented[1].len(), 30);
    assert!(presented[1].iter().all(|v| v.is_zero()));
    // Cycle 3: flow resumes from the fresh set.
    assert_eq!(presented[2].len(), 30);
    assert!(presented[2].iter().all(|v| !v.is_zero()));
}

#[test]
fn test_empty_detection_forces_reset_without_wedging() {
    // The seed detection comes back empty; the first compute cycle must
    // re-seed rather than divide by zero or stay stuck at zero points.
    let vision = MockVision::new(vec![grid(0), grid(20)], vec![]);
    let mut session = session_with(
        MockSource::with_frames(3),
        vision,
        MockDisplay::new(),
        SessionConfig::default(),
    );
    let summary = session.run().unwrap();

    assert_eq!(summary.resets, 1);
    assert_eq!(session.tracker().state().point_count(), 20);
}

#[test]
fn test_state_alignment_after_session() {
    let mut session = session_with(
        MockSource::with_frames(10),
        MockVision::new(vec![grid(25)], vec![3, 0, 7, 1, 0, 2, 4, 0, 5]),
        MockDisplay::new(),
        SessionConfig::default(),
    );
    session.run().unwrap();

    let state = session.tracker().state();
    assert_eq!(state.previous_points().len(), state.point_count());
    assert_eq!(state.current_points().len(), state.point_count());
    assert_eq!(state.found_flags().len(), state.point_count());
}
