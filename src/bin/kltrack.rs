//! Interactive motion-vector visualizer over a video file.

use anyhow::Result;
use clap::Parser;
use kltrack_rs::integration::{CvSource, CvVision, CvWindow};
use kltrack_rs::{SessionConfig, StopReason, TrackerConfig, TrackingSession};

const WINDOW_NAME: &str = "kltrack";

#[derive(Parser, Debug)]
#[command(name = "kltrack", about = "Sparse optical-flow tracking visualizer")]
struct Args {
    /// Video file to play
    video: String,
    /// Output and analysis width
    #[arg(long, default_value_t = 960)]
    width: u32,
    /// Output and analysis height
    #[arg(long, default_value_t = 540)]
    height: u32,
    /// Sub-pixel refinement window radius; the flow window is 4*w+1
    #[arg(long, default_value_t = 5)]
    window_size: i32,
    /// Upper bound on the tracked point count
    #[arg(long, default_value_t = 400)]
    max_corners: usize,
    /// Run optical flow every N-1 frames (2 = every frame)
    #[arg(long, default_value_t = 2)]
    frame_skip: u32,
    /// Pyramid depth of the flow estimation
    #[arg(long, default_value_t = 5)]
    pyramid_levels: i32,
    /// Frames to discard before the first detection
    #[arg(long, default_value_t = 0)]
    fast_forward: u32,
    /// Re-open the video and play again until the stop key is pressed
    #[arg(long = "loop")]
    loop_playback: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tracker = TrackerConfig {
        max_corners: args.max_corners,
        frame_skip: args.frame_skip,
        window_size: args.window_size,
        pyramid_levels: args.pyramid_levels,
        ..TrackerConfig::default()
    };
    let config = SessionConfig::new()
        .with_resolution(args.width, args.height)
        .with_fast_forward(args.fast_forward)
        .with_tracker(tracker);

    loop {
        let source = CvSource::try_new(&args.video, config.width, config.height)?;
        let vision = CvVision::from_config(&config.tracker);
        let window = CvWindow::try_new(WINDOW_NAME, config.width, config.height)?;

        let mut session = TrackingSession::new(source, vision, window, config.clone());
        let summary = session.run()?;

        if summary.stop == StopReason::UserStop || !args.loop_playback {
            break;
        }
    }

    Ok(())
}
