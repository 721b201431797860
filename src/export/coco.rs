//! COCO JSON export.

use std::collections::HashMap;

use serde::Serialize;

use super::error::ExportError;
use super::record::ExportRecord;
use super::traits::{ExportBundle, ExportWarning, Exporter};

/// Name of the single file in a COCO bundle.
pub const COCO_FILE_NAME: &str = "annotations.json";

/// COCO JSON exporter.
///
/// Writes bounding boxes only. Category ids start at 1 and follow the order
/// in which labels first appear.
pub struct CocoExporter;

#[derive(Debug, Default, Serialize)]
struct CocoDataset {
    images: Vec<CocoImage>,
    annotations: Vec<CocoAnnotation>,
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Serialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u32,
    bbox: [f32; 4],
    area: f32,
    iscrowd: u8,
}

#[derive(Debug, Serialize)]
struct CocoCategory {
    id: u32,
    name: String,
    supercategory: String,
}

impl Exporter for CocoExporter {
    fn id(&self) -> &'static str {
        "coco"
    }

    fn display_name(&self) -> &'static str {
        "COCO (JSON)"
    }

    fn export(&self, records: &[ExportRecord]) -> Result<ExportBundle, ExportError> {
        log::info!("Exporting {} images as COCO", records.len());

        let mut bundle = ExportBundle::new();
        let mut coco = CocoDataset::default();
        let mut category_ids: HashMap<String, u32> = HashMap::new();
        let mut annotation_id = 1u64;

        for record in records {
            let boxes = match record.pixel_boxes() {
                Ok(boxes) => boxes,
                Err(e) => {
                    let warning = ExportWarning::new(format!("Skipping image: {e}"));
                    bundle.add_warning(warning.with_image(record.image_id));
                    continue;
                }
            };

            let image_id = record.image_id.0;
            coco.images.push(CocoImage {
                id: image_id,
                file_name: record.original_file_name.replace('\\', "/"),
                width: record.pixel_width,
                height: record.pixel_height,
            });

            for b in &boxes {
                let category_id = *category_ids.entry(b.label.clone()).or_insert_with(|| {
                    let id = coco.categories.len() as u32 + 1;
                    coco.categories.push(CocoCategory {
                        id,
                        name: b.label.clone(),
                        supercategory: "none".to_string(),
                    });
                    id
                });
                coco.annotations.push(CocoAnnotation {
                    id: annotation_id,
                    image_id,
                    category_id,
                    bbox: [b.x, b.y, b.width, b.height],
                    area: b.area(),
                    iscrowd: 0,
                });
                annotation_id += 1;
            }
            bundle.images_exported += 1;
        }

        bundle.annotations_exported = coco.annotations.len();
        bundle.add_file(COCO_FILE_NAME, serde_json::to_string_pretty(&coco)?);

        log::info!(
            "Exported {} images with {} annotations ({} warnings)",
            bundle.images_exported,
            bundle.annotations_exported,
            bundle.warnings.len()
        );
        Ok(bundle)
    }
}
