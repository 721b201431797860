//! The box-editing state machine.

use std::mem;

use crate::config::EditorSettings;
use crate::constants::{DEFAULT_HANDLE_HIT_RADIUS, DEFAULT_MIN_EXTENT};
use crate::display_math::{DisplayGeometry, PixelPoint, PixelRect, Viewport};
use crate::label_colors::LabelColorAllocator;
use crate::model::{
    BoundingBox, BoxId, BoxIdAllocator, BoxSource, ImageId, ImageRecord, Point, Rect, SuggestedBox,
};
use crate::provenance;

use super::handle::{CursorHint, ResizeHandle};
use super::interaction::Interaction;
use super::EditError;

/// Tool chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move and resize existing boxes.
    #[default]
    Select,
    /// Draw boxes until another tool is chosen.
    Draw,
    /// Draw a single box, then fall back to `Select`.
    DrawOnce,
}

impl Tool {
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, Tool::Select)
    }
}

/// Externally visible editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Select,
    Draw,
    Move,
    Resize(ResizeHandle),
}

/// A box ready to be painted, in display pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayBox {
    pub id: BoxId,
    pub label: String,
    pub rect: PixelRect,
    pub color: Option<String>,
    pub source: BoxSource,
    pub selected: bool,
}

/// Interactive editor for the boxes of one image.
///
/// Pointer events arrive in display pixels and are mapped into normalized
/// coordinates through the current [`DisplayGeometry`]. Until a container
/// size is known, pointer events are ignored.
#[derive(Debug)]
pub struct AnnotationEditor {
    image_id: ImageId,
    image_size: (f32, f32),
    container_size: (f32, f32),
    geometry: Option<DisplayGeometry>,
    boxes: Vec<BoundingBox>,
    selected: Option<BoxId>,
    tool: Tool,
    interaction: Interaction,
    colors: LabelColorAllocator,
    ids: BoxIdAllocator,
    draw_label: String,
    min_extent: f32,
    handle_radius: f32,
    modified: bool,
}

impl AnnotationEditor {
    /// Open an editor seeded with `boxes`, which are colored in order with a
    /// fresh color epoch. Out-of-range geometry settings fall back to their
    /// defaults.
    pub fn open(
        image: &ImageRecord,
        boxes: Vec<BoundingBox>,
        ids: BoxIdAllocator,
        settings: &EditorSettings,
    ) -> Self {
        let mut colors = LabelColorAllocator::new(settings.palette.clone());
        let mut boxes = boxes;
        for b in &mut boxes {
            b.display_color = Some(colors.color_for(&b.label));
        }
        let ids = ids.max(BoxIdAllocator::after(&boxes));

        let min_extent = if settings.min_extent > 0.0 && settings.min_extent < 1.0 {
            settings.min_extent
        } else {
            log::warn!("min_extent {} out of range, using default", settings.min_extent);
            DEFAULT_MIN_EXTENT
        };
        let handle_radius = if settings.handle_hit_radius_px.is_finite()
            && settings.handle_hit_radius_px >= 0.0
        {
            settings.handle_hit_radius_px
        } else {
            log::warn!(
                "handle_hit_radius_px {} out of range, using default",
                settings.handle_hit_radius_px
            );
            DEFAULT_HANDLE_HIT_RADIUS
        };

        log::info!("Opened editor for {} ({} boxes)", image.id, boxes.len());

        Self {
            image_id: image.id,
            image_size: image.dimensions(),
            container_size: (0.0, 0.0),
            geometry: None,
            boxes,
            selected: None,
            tool: Tool::Select,
            interaction: Interaction::Idle,
            colors,
            ids,
            draw_label: settings.default_label.clone(),
            min_extent,
            handle_radius,
            modified: false,
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Update the on-screen container size and recompute display geometry.
    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.container_size = (width, height);
        self.geometry = self.viewport().geometry();
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.image_size.0,
            self.image_size.1,
            self.container_size.0,
            self.container_size.1,
        )
    }

    pub fn geometry(&self) -> Option<DisplayGeometry> {
        self.geometry
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn image_id(&self) -> ImageId {
        self.image_id
    }

    /// Boxes in z-order; later entries render on top.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn get(&self, id: BoxId) -> Option<&BoundingBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn selected_id(&self) -> Option<BoxId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&BoundingBox> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn draw_label(&self) -> &str {
        &self.draw_label
    }

    pub fn colors(&self) -> &LabelColorAllocator {
        &self.colors
    }

    /// True once anything was committed since the editor opened.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mode(&self) -> EditorMode {
        match &self.interaction {
            Interaction::Drawing { .. } => EditorMode::Draw,
            Interaction::Moving { .. } => EditorMode::Move,
            Interaction::Resizing { handle, .. } => EditorMode::Resize(*handle),
            Interaction::Idle if self.tool.is_drawing_tool() => EditorMode::Draw,
            Interaction::Idle => EditorMode::Select,
        }
    }

    /// Rectangle of the draw in progress, if any.
    pub fn preview_rect(&self) -> Option<Rect> {
        match &self.interaction {
            Interaction::Drawing { anchor, current } => {
                Some(Rect::from_corners(*anchor, *current))
            }
            _ => None,
        }
    }

    // ========================================================================
    // Tool and selection
    // ========================================================================

    /// Switch tools. Any gesture in progress is cancelled.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            self.cancel_gesture();
            log::debug!("Tool {:?} -> {:?}", self.tool, tool);
            self.tool = tool;
        }
    }

    pub fn set_draw_label(&mut self, label: &str) -> Result<(), EditError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EditError::EmptyLabel);
        }
        self.draw_label = label.to_string();
        Ok(())
    }

    /// Select a box by id. Returns false if no such box exists.
    pub fn select(&mut self, id: BoxId) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Topmost box containing `point`.
    pub fn hit_test(&self, point: Point) -> Option<BoxId> {
        self.boxes
            .iter()
            .rev()
            .find(|b| b.rect.contains(point))
            .map(|b| b.id)
    }

    /// Handle of the selected box under `pointer`, if any.
    pub fn handle_at(&self, pointer: PixelPoint) -> Option<ResizeHandle> {
        let geometry = self.geometry?;
        let selected = self.selected()?;
        let rect = geometry.to_display(&selected.rect);
        ResizeHandle::hit_test(&rect, pointer, self.handle_radius)
    }

    /// Display positions of the selected box's handles.
    pub fn handle_positions(&self) -> Vec<(ResizeHandle, PixelPoint)> {
        let (Some(geometry), Some(selected)) = (self.geometry, self.selected()) else {
            return Vec::new();
        };
        let rect = geometry.to_display(&selected.rect);
        ResizeHandle::ALL
            .iter()
            .map(|h| (*h, h.position(&rect)))
            .collect()
    }

    /// Hover feedback, following the same priorities as pointer-down.
    pub fn cursor_hint(&self, pointer: PixelPoint) -> CursorHint {
        match &self.interaction {
            Interaction::Drawing { .. } => return CursorHint::Crosshair,
            Interaction::Moving { .. } => return CursorHint::Move,
            Interaction::Resizing { handle, .. } => return CursorHint::Resize(*handle),
            Interaction::Idle => {}
        }
        let Some(geometry) = self.geometry else {
            return CursorHint::Default;
        };
        if self.tool.is_drawing_tool() {
            return CursorHint::Crosshair;
        }
        if let Some(handle) = self.handle_at(pointer) {
            return CursorHint::Resize(handle);
        }
        match self.hit_test(geometry.to_normalized(pointer)) {
            Some(_) => CursorHint::Move,
            None => CursorHint::Default,
        }
    }

    /// Render list in z-order. Empty while the container is not laid out.
    pub fn display_boxes(&self) -> Vec<DisplayBox> {
        let Some(geometry) = self.geometry else {
            return Vec::new();
        };
        self.boxes
            .iter()
            .map(|b| DisplayBox {
                id: b.id,
                label: b.label.clone(),
                rect: geometry.to_display(&b.rect),
                color: b.display_color.clone(),
                source: b.source,
                selected: self.selected == Some(b.id),
            })
            .collect()
    }

    // ========================================================================
    // Pointer events
    // ========================================================================

    pub fn pointer_down(&mut self, pointer: PixelPoint) {
        if !pointer.is_finite() {
            log::warn!("pointer_down ignored: non-finite position");
            return;
        }
        let Some(geometry) = self.geometry else {
            log::debug!("pointer_down ignored: viewport not laid out");
            return;
        };
        if !self.interaction.is_idle() {
            log::warn!("pointer_down during an active gesture; finishing it first");
            self.finish_gesture();
        }
        let point = geometry.to_normalized(pointer);

        if self.tool.is_drawing_tool() {
            log::debug!("Draw: started at ({:.3}, {:.3})", point.x, point.y);
            self.interaction = Interaction::Drawing {
                anchor: point,
                current: point,
            };
            return;
        }

        if let Some(handle) = self.handle_at(pointer) {
            if let Some(selected) = self.selected().cloned() {
                log::debug!("Resize: {} via handle {}", selected.id, handle.name());
                self.interaction = Interaction::Resizing {
                    handle,
                    press: point,
                    initial: selected.rect,
                    snapshot: selected,
                    moved: false,
                };
                return;
            }
        }

        match self.hit_test(point).and_then(|id| self.get(id).cloned()) {
            Some(hit) => {
                log::debug!("Move: {} pressed at ({:.3}, {:.3})", hit.id, point.x, point.y);
                self.selected = Some(hit.id);
                self.interaction = Interaction::Moving {
                    press: point,
                    origin: hit.rect.top_left(),
                    snapshot: hit,
                };
            }
            None => {
                self.selected = None;
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: PixelPoint) {
        if !pointer.is_finite() {
            return;
        }
        let Some(geometry) = self.geometry else {
            return;
        };
        let point = geometry.to_normalized(pointer);
        let min_extent = self.min_extent;

        let (id, rect) = match &mut self.interaction {
            Interaction::Idle => return,
            Interaction::Drawing { current, .. } => {
                *current = point;
                return;
            }
            Interaction::Moving {
                press,
                origin,
                snapshot,
            } => {
                let width = snapshot.rect.width;
                let height = snapshot.rect.height;
                let x_min = (origin.x + (point.x - press.x)).clamp(0.0, (1.0 - width).max(0.0));
                let y_min = (origin.y + (point.y - press.y)).clamp(0.0, (1.0 - height).max(0.0));
                (snapshot.id, Rect::new(x_min, y_min, width, height))
            }
            Interaction::Resizing {
                handle,
                press,
                initial,
                snapshot,
                moved,
            } => {
                // A press on a handle without motion must not disturb the box
                if !*moved {
                    if point == *press {
                        return;
                    }
                    *moved = true;
                }
                (snapshot.id, handle.apply(initial, point, min_extent))
            }
        };

        if let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) {
            if b.rect != rect {
                b.rect = rect;
                b.mark_edited();
                self.modified = true;
            }
        }
    }

    /// Finish the current gesture. Returns the id of a newly drawn box.
    pub fn pointer_up(&mut self, pointer: PixelPoint) -> Option<BoxId> {
        if self.geometry.is_none() {
            return None;
        }
        self.pointer_move(pointer);
        self.finish_gesture()
    }

    /// Abort the gesture in progress without committing it.
    ///
    /// A draw is dropped; a moved or resized box gets back its exact
    /// pre-gesture state. Returns whether a gesture was active.
    pub fn cancel_gesture(&mut self) -> bool {
        match mem::take(&mut self.interaction) {
            Interaction::Idle => false,
            Interaction::Drawing { .. } => {
                log::debug!("Draw cancelled");
                true
            }
            Interaction::Moving { snapshot, .. } | Interaction::Resizing { snapshot, .. } => {
                log::debug!("Edit of {} cancelled", snapshot.id);
                if let Some(b) = self.boxes.iter_mut().find(|b| b.id == snapshot.id) {
                    *b = snapshot;
                }
                true
            }
        }
    }

    fn finish_gesture(&mut self) -> Option<BoxId> {
        match mem::take(&mut self.interaction) {
            Interaction::Idle => None,
            Interaction::Drawing { anchor, current } => {
                self.commit_draw(Rect::from_corners(anchor, current))
            }
            Interaction::Moving { snapshot, .. } | Interaction::Resizing { snapshot, .. } => {
                if let Some(b) = self.get(snapshot.id) {
                    if b.rect != snapshot.rect {
                        log::info!("Edited {} -> {:?}", b.id, b.rect);
                    }
                }
                None
            }
        }
    }

    fn commit_draw(&mut self, rect: Rect) -> Option<BoxId> {
        if rect.is_degenerate() {
            log::debug!("Draw discarded: zero area");
            return None;
        }

        let id = self.ids.allocate();
        let color = self.colors.color_for(&self.draw_label);
        let created = BoundingBox::new(id, self.draw_label.clone(), rect, BoxSource::HumanAdded)
            .with_color(color);
        self.boxes.push(created);
        self.selected = Some(id);
        self.modified = true;
        log::info!(
            "Created {} '{}' (total: {})",
            id,
            self.draw_label,
            self.boxes.len()
        );

        if self.tool == Tool::DrawOnce {
            self.tool = Tool::Select;
        }
        Some(id)
    }

    // ========================================================================
    // Explicit actions
    // ========================================================================

    /// Remove the selected box. Not undoable.
    pub fn delete_selected(&mut self) -> Option<BoundingBox> {
        let id = self.selected.take()?;
        self.cancel_gesture();
        let index = self.boxes.iter().position(|b| b.id == id)?;
        let removed = self.boxes.remove(index);
        self.modified = true;
        log::info!("Deleted {} '{}'", removed.id, removed.label);
        Some(removed)
    }

    /// Change the selected box's label and recolor it.
    pub fn relabel_selected(&mut self, label: &str) -> Result<(), EditError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EditError::EmptyLabel);
        }
        let id = self.selected.ok_or(EditError::NoSelection)?;
        let color = self.colors.color_for(label);
        let b = self
            .boxes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EditError::NoSelection)?;
        if b.label != label {
            log::info!("Relabelled {} '{}' -> '{}'", b.id, b.label, label);
            b.label = label.to_string();
            b.display_color = Some(color);
            b.mark_edited();
            self.modified = true;
        }
        Ok(())
    }

    /// Append assisted suggestions as new, colored boxes. Returns how many
    /// were added.
    pub fn merge_assisted(&mut self, suggestions: Vec<SuggestedBox>) -> usize {
        let before = self.boxes.len();
        let boxes = mem::take(&mut self.boxes);
        self.boxes = provenance::merge_assisted(boxes, suggestions, &mut self.ids);
        for b in &mut self.boxes[before..] {
            b.display_color = Some(self.colors.color_for(&b.label));
        }
        let added = self.boxes.len() - before;
        if added > 0 {
            self.modified = true;
        }
        added
    }

    /// Close the editor, handing back the working set and the id counter.
    /// An unfinished gesture is cancelled.
    pub fn into_parts(mut self) -> (Vec<BoundingBox>, BoxIdAllocator) {
        self.cancel_gesture();
        (self.boxes, self.ids)
    }
}
