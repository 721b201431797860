//! Per-gesture interaction state.

use crate::model::{BoundingBox, Point, Rect};

use super::handle::ResizeHandle;

/// What the pointer is doing right now. Each gesture carries exactly the
/// anchors it needs; `snapshot` is the box as it was at pointer-down and is
/// what a cancel restores.
#[derive(Debug, Clone, Default)]
pub(crate) enum Interaction {
    #[default]
    Idle,
    Drawing {
        anchor: Point,
        current: Point,
    },
    Moving {
        press: Point,
        origin: Point,
        snapshot: BoundingBox,
    },
    Resizing {
        handle: ResizeHandle,
        press: Point,
        initial: Rect,
        snapshot: BoundingBox,
        /// Set once the pointer has left the press point.
        moved: bool,
    },
}

impl Interaction {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}
