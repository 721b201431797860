//! YOLO TXT export.
//!
//! One `<stem>.txt` per image with normalized center coordinates and a
//! `classes.txt` listing labels by class index.

use std::collections::{HashMap, HashSet};

use super::error::ExportError;
use super::record::ExportRecord;
use super::traits::{ExportBundle, ExportWarning, Exporter};

/// YOLO TXT exporter.
///
/// Class indices follow the order in which labels first appear across the
/// exported images.
pub struct YoloExporter;

impl Exporter for YoloExporter {
    fn id(&self) -> &'static str {
        "yolo"
    }

    fn display_name(&self) -> &'static str {
        "YOLO (TXT)"
    }

    fn export(&self, records: &[ExportRecord]) -> Result<ExportBundle, ExportError> {
        log::info!("Exporting {} images as YOLO", records.len());

        let mut bundle = ExportBundle::new();
        let mut classes: Vec<String> = Vec::new();
        let mut class_index: HashMap<String, usize> = HashMap::new();
        let mut used_stems: HashSet<String> = HashSet::new();

        for record in records {
            let boxes = match record.pixel_boxes() {
                Ok(boxes) => boxes,
                Err(e) => {
                    let warning = ExportWarning::new(format!("Skipping image: {e}"));
                    bundle.add_warning(warning.with_image(record.image_id));
                    continue;
                }
            };
            let (width, height) = (record.pixel_width as f32, record.pixel_height as f32);

            let mut lines = Vec::with_capacity(boxes.len());
            for b in &boxes {
                let class = *class_index.entry(b.label.clone()).or_insert_with(|| {
                    classes.push(b.label.clone());
                    classes.len() - 1
                });
                let cx = (b.x + b.width / 2.0) / width;
                let cy = (b.y + b.height / 2.0) / height;
                lines.push(format!(
                    "{} {:.6} {:.6} {:.6} {:.6}",
                    class,
                    cx,
                    cy,
                    b.width / width,
                    b.height / height
                ));
            }

            let mut stem = record.file_stem();
            if !used_stems.insert(stem.clone()) {
                let renamed = format!("{}_{}", stem, record.image_id.0);
                bundle.add_warning(
                    ExportWarning::new(format!(
                        "Duplicate file name '{stem}', writing labels to '{renamed}.txt'"
                    ))
                    .with_image(record.image_id),
                );
                used_stems.insert(renamed.clone());
                stem = renamed;
            }

            bundle.add_file(format!("labels/{stem}.txt"), lines.join("\n"));
            bundle.images_exported += 1;
            bundle.annotations_exported += boxes.len();
        }

        bundle.add_file("classes.txt", classes.join("\n"));

        log::info!(
            "Exported {} images with {} annotations ({} warnings)",
            bundle.images_exported,
            bundle.annotations_exported,
            bundle.warnings.len()
        );
        Ok(bundle)
    }
}
