use nalgebra as na;

/// 2D image coordinate of a tracked feature point.
pub type Point2 = na::Point2<f32>;

/// Displacement of a single feature point between two consecutive
/// flow computations.
///
/// `from` is the position in the earlier frame, `to` the estimated
/// position in the later frame. Immediately after a re-seed the two
/// coincide and the vector degenerates to a dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionVector {
    pub from: Point2,
    pub to: Point2,
}

impl MotionVector {
    #[inline]
    pub fn new(from: Point2, to: Point2) -> Self {
        Self { from, to }
    }

    /// Displacement from `from` to `to`.
    #[inline]
    pub fn displacement(&self) -> na::Vector2<f32> {
        self.to - self.from
    }

    /// Euclidean length of the displacement.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.displacement().norm()
    }

    /// True when the point did not move (e.g. the frame of a re-seed).
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.from == self.to
    }
}
