//! Resize handles and their geometry.

use crate::display_math::{PixelPoint, PixelRect};
use crate::model::{Point, Rect};

/// One of the eight grab points on a selected box, named by compass
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NW,
    NE,
    SW,
    SE,
}

impl ResizeHandle {
    /// All handles, corners first. Hit-testing walks this order, so a corner
    /// wins a tie against the edge midpoint next to it.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::E,
        ResizeHandle::W,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::E => "e",
            ResizeHandle::W => "w",
            ResizeHandle::NW => "nw",
            ResizeHandle::NE => "ne",
            ResizeHandle::SW => "sw",
            ResizeHandle::SE => "se",
        }
    }

    fn moves_left(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    fn moves_right(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    fn moves_top(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NW | ResizeHandle::NE)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SW | ResizeHandle::SE)
    }

    /// Where this handle sits on a rectangle, as fractions of its extent.
    fn fractions(&self) -> (f32, f32) {
        let fx = if self.moves_left() {
            0.0
        } else if self.moves_right() {
            1.0
        } else {
            0.5
        };
        let fy = if self.moves_top() {
            0.0
        } else if self.moves_bottom() {
            1.0
        } else {
            0.5
        };
        (fx, fy)
    }

    /// Display position of this handle on a box drawn at `rect`.
    pub fn position(&self, rect: &PixelRect) -> PixelPoint {
        let (fx, fy) = self.fractions();
        PixelPoint::new(rect.x + rect.width * fx, rect.y + rect.height * fy)
    }

    /// Resize `initial` so the grabbed edge(s) follow `pointer`.
    ///
    /// Edges opposite the handle stay fixed. A moving edge never comes closer
    /// than `min_extent` to its fixed partner and never leaves `[0, 1]`.
    pub fn apply(&self, initial: &Rect, pointer: Point, min_extent: f32) -> Rect {
        let pointer = pointer.clamped();
        let mut left = initial.x_min;
        let mut right = initial.x_max();
        let mut top = initial.y_min;
        let mut bottom = initial.y_max();

        if self.moves_left() {
            left = pointer.x.min(right - min_extent).max(0.0);
        }
        if self.moves_right() {
            right = pointer.x.max(left + min_extent).min(1.0);
        }
        if self.moves_top() {
            top = pointer.y.min(bottom - min_extent).max(0.0);
        }
        if self.moves_bottom() {
            bottom = pointer.y.max(top + min_extent).min(1.0);
        }

        Rect::from_edges(left, top, right, bottom)
    }

    /// Find the handle of a box drawn at `rect` closest to `pointer`, if any
    /// lies within `radius` display pixels.
    pub fn hit_test(rect: &PixelRect, pointer: PixelPoint, radius: f32) -> Option<ResizeHandle> {
        let mut best: Option<(ResizeHandle, f32)> = None;
        for handle in Self::ALL {
            let distance = handle.position(rect).distance_to(pointer);
            if distance > radius {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((handle, distance));
            }
        }
        best.map(|(handle, _)| handle)
    }
}

/// Pointer feedback for hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    Move,
    Resize(ResizeHandle),
}
