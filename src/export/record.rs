//! The per-image data an exporter receives.

use serde::Serialize;

use crate::model::{BoundingBox, ImageId, ImageRecord};

use super::error::ExportError;

/// One image and its committed boxes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub image_id: ImageId,
    pub original_file_name: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub boxes: Vec<BoundingBox>,
}

/// A box scaled to native image pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelBox {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelBox {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

impl ExportRecord {
    pub fn new(image: &ImageRecord, boxes: Vec<BoundingBox>) -> Self {
        Self {
            image_id: image.id,
            original_file_name: image.original_file_name.clone(),
            pixel_width: image.pixel_width,
            pixel_height: image.pixel_height,
            boxes,
        }
    }

    pub fn has_dimensions(&self) -> bool {
        self.pixel_width > 0 && self.pixel_height > 0
    }

    /// Scale every box by the image size: `(x_min * w, y_min * h, width * w,
    /// height * h)`.
    pub fn pixel_boxes(&self) -> Result<Vec<PixelBox>, ExportError> {
        if !self.has_dimensions() {
            return Err(ExportError::MissingDimensions {
                image: self.image_id,
                file_name: self.original_file_name.clone(),
            });
        }
        let (w, h) = (self.pixel_width as f32, self.pixel_height as f32);
        Ok(self
            .boxes
            .iter()
            .map(|b| PixelBox {
                label: b.label.clone(),
                x: b.rect.x_min * w,
                y: b.rect.y_min * h,
                width: b.rect.width * w,
                height: b.rect.height * h,
            })
            .collect())
    }

    /// File name without its extension, falling back to the image id.
    pub fn file_stem(&self) -> String {
        let name = self
            .original_file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        let stem = match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        };
        if stem.is_empty() {
            format!("image_{}", self.image_id.0)
        } else {
            stem.to_string()
        }
    }
}
