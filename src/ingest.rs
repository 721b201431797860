//! Turning encoded image bytes into records the store accepts.
//!
//! Reading files, drag-and-drop and the like belong to the host. This module
//! only inspects bytes already in memory.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::model::{ImageId, ImageRecord};

/// Errors raised while inspecting an image.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Bytes do not start with a known image signature
    #[error("Unrecognized image format: {file_name}")]
    UnrecognizedFormat { file_name: String },

    /// Header could not be decoded
    #[error("Failed to decode image header: {0}")]
    Decode(#[from] image::ImageError),

    /// Zero width or height
    #[error("Image '{file_name}' has no pixels")]
    EmptyImage { file_name: String },
}

/// A validated image waiting for an id.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixels: Arc<[u8]>,
    pub mime_type: String,
    pub original_file_name: String,
}

impl NewImage {
    /// Sniff the format and read the dimensions from encoded bytes.
    ///
    /// Only the header is decoded; the bytes are kept as-is for display and
    /// for the AI collaborators.
    pub fn from_encoded(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, IngestError> {
        let file_name = file_name.into();
        let format = image::guess_format(&bytes).map_err(|_| IngestError::UnrecognizedFormat {
            file_name: file_name.clone(),
        })?;
        let (width, height) =
            ImageReader::with_format(Cursor::new(&bytes), format).into_dimensions()?;

        log::debug!("Ingested '{}' ({:?}, {}x{})", file_name, format, width, height);
        Self::from_parts(file_name, mime_type(format), width, height, bytes)
    }

    /// Accept an image whose dimensions the host already knows.
    pub fn from_parts(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        pixel_width: u32,
        pixel_height: u32,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, IngestError> {
        let original_file_name = file_name.into();
        if pixel_width == 0 || pixel_height == 0 {
            return Err(IngestError::EmptyImage {
                file_name: original_file_name,
            });
        }
        Ok(Self {
            pixel_width,
            pixel_height,
            pixels: pixels.into(),
            mime_type: mime_type.into(),
            original_file_name,
        })
    }

    pub(crate) fn into_record(self, id: ImageId) -> ImageRecord {
        ImageRecord {
            id,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            pixels: self.pixels,
            mime_type: self.mime_type,
            original_file_name: self.original_file_name,
        }
    }
}

fn mime_type(format: ImageFormat) -> String {
    format.to_mime_type().to_string()
}
