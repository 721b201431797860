//! Interactive bounding box editor.
//!
//! The editor is a pointer-driven state machine with four modes:
//!
//! - **Select**: press on a box to select it and start moving it, press on a
//!   handle of the selected box to start resizing, press on empty space to
//!   clear the selection.
//! - **Draw**: press and drag to span a new box. Zero-area drags are dropped.
//! - **Move** / **Resize**: active between pointer-down and pointer-up.
//!
//! All geometry is kept normalized and clamped into the unit square.

mod engine;
mod handle;
mod interaction;


use thiserror::Error;

pub use engine::{AnnotationEditor, DisplayBox, EditorMode, Tool};
pub use handle::{CursorHint, ResizeHandle};

/// Rejected explicit editor actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The action needs a selected box
    #[error("No box is selected")]
    NoSelection,

    /// Labels must contain at least one non-whitespace character
    #[error("Label must not be empty")]
    EmptyLabel,
}
