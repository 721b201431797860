//! In-memory annotation results, keyed by image.
//!
//! Writes to an image's box set come from three places: seeding from
//! automatic detection, an upsert by the host, and saving an edit session.
//! At most one edit session is open at a time, and while it is open no other
//! writer may touch the image it holds.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::config::EditorSettings;
use crate::export::ExportRecord;
use crate::ingest::NewImage;
use crate::model::{BoundingBox, BoxIdAllocator, ImageId, ImageRecord, SuggestedBox};
use crate::provenance;
use crate::session::{EditLease, EditSession};

/// Lease tokens are unique across all stores in the process.
static NEXT_LEASE_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Errors raised by the result store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown image: {0}")]
    UnknownImage(ImageId),

    /// Another writer holds the image (or, on open, any image)
    #[error("{image} is held by an open edit session")]
    SessionActive { image: ImageId },

    /// The session was not opened by this store, or was already closed
    #[error("Edit session does not hold this store's lease")]
    LeaseMismatch,

    #[error("Invalid boxes for {image}: {reason}")]
    InvalidBoxes { image: ImageId, reason: String },

    #[error("Invalid editor settings: {0}")]
    InvalidSettings(String),
}

/// One stored image with its committed boxes.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub record: ImageRecord,
    boxes: Vec<BoundingBox>,
    ids: BoxIdAllocator,
}

impl ImageEntry {
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    fn replace(&mut self, boxes: Vec<BoundingBox>, ids: BoxIdAllocator) {
        // Ids are never handed out twice for an image, even after deletes.
        self.ids = self.ids.max(ids).max(BoxIdAllocator::after(&boxes));
        self.boxes = boxes;
    }
}

/// Committed annotations for every ingested image.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: BTreeMap<ImageId, ImageEntry>,
    next_image: u64,
    active: Option<EditLease>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Store a new image with an empty box set.
    pub fn add_image(&mut self, image: NewImage) -> ImageId {
        self.next_image += 1;
        let id = ImageId(self.next_image);
        log::info!(
            "Added {} '{}' ({}x{})",
            id,
            image.original_file_name,
            image.pixel_width,
            image.pixel_height
        );
        self.entries.insert(
            id,
            ImageEntry {
                record: image.into_record(id),
                boxes: Vec::new(),
                ids: BoxIdAllocator::new(),
            },
        );
        id
    }

    pub fn remove_image(&mut self, id: ImageId) -> Result<ImageRecord, StoreError> {
        self.check_writable(id)?;
        let entry = self.entries.remove(&id).ok_or(StoreError::UnknownImage(id))?;
        log::info!("Removed {} ({} boxes)", id, entry.boxes.len());
        Ok(entry.record)
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageRecord> {
        self.entries.get(&id).map(|e| &e.record)
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Image ids in insertion order.
    pub fn image_ids(&self) -> Vec<ImageId> {
        self.entries.keys().copied().collect()
    }

    /// Records of every stored image, for batch detection.
    pub fn records(&self) -> Vec<ImageRecord> {
        self.entries.values().map(|e| e.record.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageEntry> {
        self.entries.values()
    }

    // ========================================================================
    // Boxes
    // ========================================================================

    /// Committed boxes for `id`; empty for unknown images.
    pub fn get(&self, id: ImageId) -> &[BoundingBox] {
        self.entries.get(&id).map(|e| e.boxes.as_slice()).unwrap_or(&[])
    }

    /// Replace the whole box set of an image.
    ///
    /// Box ids must be unique, labels non-empty, and every rectangle must
    /// have positive area inside the unit square.
    pub fn upsert(&mut self, id: ImageId, boxes: Vec<BoundingBox>) -> Result<(), StoreError> {
        self.check_writable(id)?;
        let entry = self.entries.get_mut(&id).ok_or(StoreError::UnknownImage(id))?;
        if let Err(reason) = check_boxes(&boxes) {
            log::warn!("Rejected upsert for {id}: {reason}");
            return Err(StoreError::InvalidBoxes { image: id, reason });
        }
        log::info!("Stored {} boxes for {}", boxes.len(), id);
        entry.replace(boxes, BoxIdAllocator::new());
        Ok(())
    }

    /// Add detection results as `ai-detected` boxes next to whatever each
    /// image already has.
    ///
    /// Images that are unknown or held by a session are skipped and
    /// reported; the rest are seeded.
    pub fn seed_detections(
        &mut self,
        results: Vec<(ImageId, Vec<SuggestedBox>)>,
    ) -> Vec<StoreError> {
        let mut rejected = Vec::new();
        for (id, suggestions) in results {
            if let Err(e) = self.check_writable(id) {
                log::warn!("Not seeding detections for {id}: {e}");
                rejected.push(e);
                continue;
            }
            let Some(entry) = self.entries.get_mut(&id) else {
                log::warn!("Not seeding detections for unknown {id}");
                rejected.push(StoreError::UnknownImage(id));
                continue;
            };
            let mut ids = entry.ids;
            let detected = provenance::detected_boxes(suggestions, &mut ids);
            log::info!("Seeded {} detected boxes for {}", detected.len(), id);
            let mut boxes = entry.boxes.clone();
            boxes.extend(detected);
            entry.replace(boxes, ids);
        }
        rejected
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Check out `id` for editing. Only one session may be open at a time.
    pub fn open_session(
        &mut self,
        id: ImageId,
        settings: &EditorSettings,
    ) -> Result<EditSession, StoreError> {
        if let Some(active) = &self.active {
            log::warn!("Refusing to open {id}: {} is still open", active.image);
            return Err(StoreError::SessionActive {
                image: active.image,
            });
        }
        let entry = self.entries.get(&id).ok_or(StoreError::UnknownImage(id))?;
        settings
            .validate()
            .map_err(|e| StoreError::InvalidSettings(e.to_string()))?;

        let token = NEXT_LEASE_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.active = Some(EditLease { image: id, token });
        log::info!("Opened edit session for {id}");
        Ok(EditSession::new(
            EditLease { image: id, token },
            entry.record.clone(),
            entry.boxes.clone(),
            entry.ids,
            settings,
        ))
    }

    /// Image currently held by an open session.
    pub fn active_session(&self) -> Option<ImageId> {
        self.active.as_ref().map(|lease| lease.image)
    }

    /// Commit the session's working set and close it.
    pub fn save(&mut self, session: EditSession) -> Result<ImageId, StoreError> {
        let (lease, boxes, ids) = session.into_parts();
        self.release(&lease)?;
        let entry = self
            .entries
            .get_mut(&lease.image)
            .ok_or(StoreError::UnknownImage(lease.image))?;
        log::info!("Saved {} boxes for {}", boxes.len(), lease.image);
        entry.replace(boxes, ids);
        Ok(lease.image)
    }

    /// Close the session without touching the stored boxes.
    pub fn discard(&mut self, session: EditSession) -> Result<ImageId, StoreError> {
        let lease = session.into_lease();
        self.release(&lease)?;
        log::info!("Discarded edit session for {}", lease.image);
        Ok(lease.image)
    }

    /// Free the writer slot of a session that was dropped instead of being
    /// saved or discarded. Stored boxes are left untouched.
    pub fn abandon_session(&mut self) -> Option<ImageId> {
        let lease = self.active.take()?;
        log::warn!("Abandoned edit session for {}", lease.image);
        Some(lease.image)
    }

    fn release(&mut self, lease: &EditLease) -> Result<(), StoreError> {
        if self.active.as_ref() != Some(lease) {
            log::warn!("Rejected session for {}: lease mismatch", lease.image);
            return Err(StoreError::LeaseMismatch);
        }
        self.active = None;
        Ok(())
    }

    fn check_writable(&self, id: ImageId) -> Result<(), StoreError> {
        match &self.active {
            Some(lease) if lease.image == id => Err(StoreError::SessionActive { image: id }),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Snapshot of every image with its committed boxes, in insertion order.
    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.entries
            .values()
            .map(|e| ExportRecord::new(&e.record, e.boxes.clone()))
            .collect()
    }
}

fn check_boxes(boxes: &[BoundingBox]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for b in boxes {
        if !seen.insert(b.id) {
            return Err(format!("duplicate id {}", b.id));
        }
        if b.label.trim().is_empty() {
            return Err(format!("{} has an empty label", b.id));
        }
        if b.rect.is_degenerate() {
            return Err(format!("{} has no area", b.id));
        }
        if !b.rect.is_within_unit() {
            return Err(format!("{} lies outside the image", b.id));
        }
    }
    Ok(())
}
