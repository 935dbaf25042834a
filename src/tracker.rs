mod klt_tracker;
mod motion;
mod track_state;

pub use klt_tracker::{DetectParams, FlowOutcome, FrameKind, KltTracker, TrackerConfig};
pub use motion::{MotionVector, Point2};
pub use track_state::TrackState;
