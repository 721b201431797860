//! Letterbox mathematics.
//!
//! Maps between normalized box coordinates and pixel coordinates on a
//! display surface whose aspect ratio may differ from the image's. The image
//! is scaled uniformly to fit and centered, leaving margins on one axis.

use crate::model::{Point, Rect};

/// A position in display pixels, relative to the container's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Native image size plus the size of the container it is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub image_width: f32,
    pub image_height: f32,
    pub container_width: f32,
    pub container_height: f32,
}

impl Viewport {
    pub fn new(
        image_width: f32,
        image_height: f32,
        container_width: f32,
        container_height: f32,
    ) -> Self {
        Self {
            image_width,
            image_height,
            container_width,
            container_height,
        }
    }

    /// Derive the display geometry, or `None` while the container or image
    /// has no area (not laid out / not loaded yet).
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        DisplayGeometry::fit(
            self.image_width,
            self.image_height,
            self.container_width,
            self.container_height,
        )
    }
}

/// How the image rectangle sits inside its container.
///
/// Pure derived state: recompute it whenever the container is resized or
/// the image finishes loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub rendered_width: f32,
    pub rendered_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DisplayGeometry {
    /// Fit an image into a container preserving aspect ratio.
    ///
    /// `scale = min(cw / iw, ch / ih)`, then the scaled image is centered.
    pub fn fit(
        image_width: f32,
        image_height: f32,
        container_width: f32,
        container_height: f32,
    ) -> Option<Self> {
        let sizes = [image_width, image_height, container_width, container_height];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return None;
        }

        let scale = (container_width / image_width).min(container_height / image_height);
        let rendered_width = image_width * scale;
        let rendered_height = image_height * scale;

        Some(Self {
            rendered_width,
            rendered_height,
            offset_x: (container_width - rendered_width) / 2.0,
            offset_y: (container_height - rendered_height) / 2.0,
        })
    }

    /// Map a normalized rectangle onto the display surface.
    pub fn to_display(&self, rect: &Rect) -> PixelRect {
        PixelRect {
            x: rect.x_min * self.rendered_width + self.offset_x,
            y: rect.y_min * self.rendered_height + self.offset_y,
            width: rect.width * self.rendered_width,
            height: rect.height * self.rendered_height,
        }
    }

    /// Map a normalized point onto the display surface.
    pub fn point_to_display(&self, point: Point) -> PixelPoint {
        PixelPoint {
            x: point.x * self.rendered_width + self.offset_x,
            y: point.y * self.rendered_height + self.offset_y,
        }
    }

    /// Inverse of [`point_to_display`](Self::point_to_display), clamped into
    /// `[0, 1]²`.
    ///
    /// Pointer positions in the letterbox margins or outside the container
    /// snap to the nearest image edge, so drags that leave the image keep
    /// tracking along that edge.
    pub fn to_normalized(&self, point: PixelPoint) -> Point {
        Point::new(
            (point.x - self.offset_x) / self.rendered_width,
            (point.y - self.offset_y) / self.rendered_height,
        )
        .clamped()
    }
}
