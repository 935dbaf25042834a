//! OpenCV implementations of the collaborator traits.
//!
//! [`CvSource`] wraps `VideoCapture` with resize and grayscale
//! conversion, [`CvVision`] provides detection, sub-pixel refinement and
//! pyramidal Lucas-Kanade flow, and [`CvWindow`] renders the overlay in
//! a fullscreen window.

use opencv::core::{Point, Point2f, Scalar, Size, TermCriteria, TermCriteria_Type, Vector};
use opencv::prelude::*;
use opencv::{highgui, imgproc, video, videoio};

use crate::integration::collaborators::{
    Error, FeatureDetector, FlowField, FrameSource, InputPoll, MotionEstimator, Renderer, Result,
    SourceFrame, SubpixRefiner,
};
use crate::tracker::{DetectParams, MotionVector, Point2, TrackerConfig};

fn cv_err(err: opencv::Error) -> Error {
    Error::backend(err)
}

fn to_cv_points(points: &[Point2]) -> Vector<Point2f> {
    points.iter().map(|p| Point2f::new(p.x, p.y)).collect()
}

fn from_cv_points(points: &Vector<Point2f>) -> Vec<Point2> {
    points.iter().map(|p| Point2::new(p.x, p.y)).collect()
}

fn criteria(max_count: i32, epsilon: f64) -> Result<TermCriteria> {
    TermCriteria::new(
        TermCriteria_Type::COUNT as i32 | TermCriteria_Type::EPS as i32,
        max_count,
        epsilon,
    )
    .map_err(cv_err)
}

/// Video file source, normalizing every frame to a fixed resolution
/// and keeping a grayscale copy for analysis.
pub struct CvSource {
    capture: videoio::VideoCapture,
    size: Size,
}

impl CvSource {
    /// Open a video file. Failure here is the one fatal error of a
    /// session.
    pub fn try_new(path: &str, width: u32, height: u32) -> Result<Self> {
        let open_err = |reason: String| Error::Open {
            path: path.to_string(),
            reason,
        };
        let capture = videoio::VideoCapture::from_file(path, videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;
        if !capture.is_opened().map_err(cv_err)? {
            return Err(open_err("capture is not opened".into()));
        }
        Ok(Self {
            capture,
            size: Size::new(width as i32, height as i32),
        })
    }
}

impl FrameSource for CvSource {
    type Frame = Mat;

    fn next_frame(&mut self) -> Result<Option<SourceFrame<Mat>>> {
        let mut raw = Mat::default();
        if !self.capture.read(&mut raw).map_err(cv_err)? || raw.empty().map_err(cv_err)? {
            return Ok(None);
        }

        let mut display = Mat::default();
        imgproc::resize(&raw, &mut display, self.size, 0.0, 0.0, imgproc::INTER_LINEAR)
            .map_err(cv_err)?;
        let mut gray = Mat::default();
        imgproc::cvt_color(&display, &mut gray, imgproc::COLOR_BGR2GRAY, 0).map_err(cv_err)?;

        Ok(Some(SourceFrame { display, gray }))
    }
}

/// Detection, refinement and flow estimation on grayscale `Mat`s.
pub struct CvVision {
    window_size: i32,
    pyramid_levels: i32,
}

impl CvVision {
    pub fn new(window_size: i32, pyramid_levels: i32) -> Self {
        Self {
            window_size,
            pyramid_levels,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.window_size, config.pyramid_levels)
    }
}

impl FeatureDetector<Mat> for CvVision {
    fn detect(&mut self, gray: &Mat, params: &DetectParams) -> Result<Vec<Point2>> {
        let mut corners = Vector::<Point2f>::new();
        imgproc::good_features_to_track(
            gray,
            &mut corners,
            params.max_corners as i32,
            params.quality_level,
            params.min_distance,
            &Mat::default(),
            params.block_size,
            params.use_harris,
            params.harris_k,
        )
        .map_err(cv_err)?;
        Ok(from_cv_points(&corners))
    }
}

impl SubpixRefiner<Mat> for CvVision {
    fn refine(&mut self, gray: &Mat, points: Vec<Point2>, window_size: i32) -> Result<Vec<Point2>> {
        if points.is_empty() {
            return Ok(points);
        }
        let mut corners = to_cv_points(&points);
        imgproc::corner_sub_pix(
            gray,
            &mut corners,
            Size::new(window_size, window_size),
            Size::new(-1, -1),
            criteria(20, 0.03)?,
        )
        .map_err(cv_err)?;
        Ok(from_cv_points(&corners))
    }
}

impl MotionEstimator<Mat> for CvVision {
    fn estimate(&mut self, prev_gray: &Mat, gray: &Mat, points: &[Point2]) -> Result<FlowField> {
        if points.is_empty() {
            return Ok(FlowField::default());
        }

        let prev_points = to_cv_points(points);
        let mut next_points = Vector::<Point2f>::new();
        let mut status = Vector::<u8>::new();
        let mut err = Vector::<f32>::new();
        let flow_window = self.window_size * 4 + 1;

        video::calc_optical_flow_pyr_lk(
            prev_gray,
            gray,
            &prev_points,
            &mut next_points,
            &mut status,
            &mut err,
            Size::new(flow_window, flow_window),
            self.pyramid_levels,
            criteria(20, 0.3)?,
            0,
            1e-4,
        )
        .map_err(cv_err)?;

        Ok(FlowField {
            points: from_cv_points(&next_points),
            found: status.iter().map(|s| s != 0).collect(),
        })
    }
}

/// Fullscreen highgui window drawing green displacement arrows.
pub struct CvWindow {
    name: String,
}

impl CvWindow {
    pub fn try_new(name: &str, width: u32, height: u32) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_NORMAL).map_err(cv_err)?;
        highgui::set_window_property(
            name,
            highgui::WND_PROP_FULLSCREEN,
            highgui::WINDOW_FULLSCREEN as f64,
        )
        .map_err(cv_err)?;
        highgui::resize_window(name, width as i32, height as i32).map_err(cv_err)?;
        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl Renderer<Mat> for CvWindow {
    fn draw_vector(&mut self, frame: &mut Mat, vector: MotionVector) -> Result<()> {
        imgproc::arrowed_line(
            frame,
            Point::new(vector.from.x as i32, vector.from.y as i32),
            Point::new(vector.to.x as i32, vector.to.y as i32),
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            imgproc::LINE_AA,
            0,
            0.3,
        )
        .map_err(cv_err)
    }

    fn present(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame).map_err(cv_err)
    }
}

impl InputPoll for CvWindow {
    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<i32>> {
        let key = highgui::wait_key(timeout_ms).map_err(cv_err)?;
        Ok(if key >= 0 { Some(key) } else { None })
    }
}
