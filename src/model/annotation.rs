//! Bounding box annotations and their provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Unique identifier for a box within one image's box set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(pub u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box#{}", self.0)
    }
}

/// Hands out fresh box ids for one image.
///
/// The counter only moves forward, so an id freed by a deletion is never
/// reissued to a different box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxIdAllocator {
    next: u64,
}

impl BoxIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Start after the highest id already present in `boxes`.
    pub fn after(boxes: &[BoundingBox]) -> Self {
        let next = boxes.iter().map(|b| b.id.0 + 1).max().unwrap_or(1);
        Self { next }
    }

    pub fn allocate(&mut self) -> BoxId {
        let id = BoxId(self.next);
        self.next += 1;
        id
    }

    /// Id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> BoxId {
        BoxId(self.next)
    }

    /// Merge with another allocator, keeping whichever is further ahead.
    pub fn max(self, other: Self) -> Self {
        Self {
            next: self.next.max(other.next),
        }
    }
}

impl Default for BoxIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a box came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSource {
    /// Produced by automatic detection when the image was ingested.
    AiDetected,
    /// Suggested by an assist request from inside the editor.
    AiAssisted,
    /// Drawn by a person.
    HumanAdded,
    /// Any origin, later changed by a person.
    HumanEdited,
}

impl BoxSource {
    pub fn name(&self) -> &'static str {
        match self {
            BoxSource::AiDetected => "ai-detected",
            BoxSource::AiAssisted => "ai-assisted",
            BoxSource::HumanAdded => "human-added",
            BoxSource::HumanEdited => "human-edited",
        }
    }

    pub fn is_machine(&self) -> bool {
        matches!(self, BoxSource::AiDetected | BoxSource::AiAssisted)
    }
}

impl fmt::Display for BoxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A labelled, normalized bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: BoxId,
    pub label: String,
    #[serde(flatten)]
    pub rect: Rect,
    pub source: BoxSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
}

impl BoundingBox {
    pub fn new(id: BoxId, label: impl Into<String>, rect: Rect, source: BoxSource) -> Self {
        Self {
            id,
            label: label.into(),
            rect,
            source,
            display_color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.display_color = Some(color.into());
        self
    }

    /// Record that a person changed this box. Provenance never moves back.
    pub fn mark_edited(&mut self) {
        if self.source != BoxSource::HumanEdited {
            log::debug!("{} provenance {} -> human-edited", self.id, self.source);
            self.source = BoxSource::HumanEdited;
        }
    }

    /// Strip id, provenance and color, leaving what a remote model sees.
    pub fn to_suggestion(&self) -> SuggestedBox {
        SuggestedBox {
            label: self.label.clone(),
            x_min: self.rect.x_min,
            y_min: self.rect.y_min,
            width: self.rect.width,
            height: self.rect.height,
        }
    }
}

/// A box as exchanged with the detection and assist collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedBox {
    pub label: String,
    pub x_min: f32,
    pub y_min: f32,
    pub width: f32,
    pub height: f32,
}

impl SuggestedBox {
    pub fn new(label: impl Into<String>, x_min: f32, y_min: f32, width: f32, height: f32) -> Self {
        Self {
            label: label.into(),
            x_min,
            y_min,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x_min, self.y_min, self.width, self.height)
    }

    /// Turn a suggestion into a box with the given id and provenance.
    ///
    /// The rectangle is clipped into the unit square; `None` if nothing is
    /// left of it.
    pub fn into_box(self, id: BoxId, source: BoxSource) -> Option<BoundingBox> {
        let rect = self.rect().clipped_to_unit()?;
        Some(BoundingBox::new(id, self.label, rect, source))
    }
}
