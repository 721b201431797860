//! Annotation export.
//!
//! Exporters turn [`ExportRecord`]s into an [`ExportBundle`] of in-memory
//! files. Box geometry reaches them as native pixel rectangles through
//! [`ExportRecord::pixel_boxes`].

mod coco;
mod error;
mod record;
mod traits;
mod yolo;

#[cfg(test)]
mod tests;

pub use coco::{COCO_FILE_NAME, CocoExporter};
pub use error::ExportError;
pub use record::{ExportRecord, PixelBox};
pub use traits::{ExportBundle, ExportFile, ExportWarning, Exporter};
pub use yolo::YoloExporter;

/// All built-in exporters.
pub fn exporters() -> Vec<Box<dyn Exporter>> {
    vec![Box::new(YoloExporter), Box::new(CocoExporter)]
}

/// Look up a built-in exporter by id.
pub fn exporter(id: &str) -> Option<Box<dyn Exporter>> {
    exporters().into_iter().find(|e| e.id() == id)
}
