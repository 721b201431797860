//! Ingested image records.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity of an image within a session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image#{}", self.0)
    }
}

/// An image as handed over by ingestion. Immutable once stored.
///
/// `pixels` holds the encoded bytes shared with the AI collaborators, so
/// cloning a record is cheap.
#[derive(Clone)]
pub struct ImageRecord {
    pub id: ImageId,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixels: Arc<[u8]>,
    pub mime_type: String,
    pub original_file_name: String,
}

impl ImageRecord {
    /// Native size as floats, for coordinate math.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.pixel_width as f32, self.pixel_height as f32)
    }
}

impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRecord")
            .field("id", &self.id)
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("bytes", &self.pixels.len())
            .field("mime_type", &self.mime_type)
            .field("original_file_name", &self.original_file_name)
            .finish()
    }
}
