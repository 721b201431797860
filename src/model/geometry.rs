//! Normalized geometry primitives.
//!
//! All coordinates here are fractions of the image width/height with the
//! origin at the top-left corner, so a fully visible shape lives in `[0, 1]²`.

use serde::{Deserialize, Serialize};

/// Slack allowed when checking that a rectangle stays inside the unit square.
pub const UNIT_TOLERANCE: f32 = 1e-6;

/// A point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// An axis-aligned rectangle stored as top-left corner plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f32,
    pub y_min: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x_min: f32, y_min: f32, width: f32, height: f32) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
        }
    }

    /// Build the canonical rectangle spanned by two corner points,
    /// regardless of which direction the corners were given in.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x_min: a.x.min(b.x),
            y_min: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Build a rectangle from its left/top/right/bottom edges.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn x_max(&self) -> f32 {
        self.x_min + self.width
    }

    pub fn y_max(&self) -> f32 {
        self.y_min + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x_min, self.y_min)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when the rectangle has no positive area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive point containment.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max()
            && point.y >= self.y_min
            && point.y <= self.y_max()
    }

    /// Intersect with the unit square.
    ///
    /// Returns `None` if any value is non-finite or the clipped rectangle
    /// has no area left.
    pub fn clipped_to_unit(&self) -> Option<Rect> {
        let values = [self.x_min, self.y_min, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let left = self.x_min.clamp(0.0, 1.0);
        let top = self.y_min.clamp(0.0, 1.0);
        let right = self.x_max().clamp(0.0, 1.0);
        let bottom = self.y_max().clamp(0.0, 1.0);
        let clipped = Rect::from_edges(left, top, right, bottom);
        (!clipped.is_degenerate()).then_some(clipped)
    }

    /// True when the rectangle lies within the unit square, up to
    /// [`UNIT_TOLERANCE`] of floating point slack.
    pub fn is_within_unit(&self) -> bool {
        self.x_min >= 0.0
            && self.y_min >= 0.0
            && self.x_max() <= 1.0 + UNIT_TOLERANCE
            && self.y_max() <= 1.0 + UNIT_TOLERANCE
    }
}
