//! Error types for export operations.

use thiserror::Error;

use crate::model::ImageId;

/// Errors that can occur while building an export bundle.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error while writing the archive
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Pixel rectangles need the image's native size
    #[error("Image dimensions required but not available for {image} ('{file_name}')")]
    MissingDimensions { image: ImageId, file_name: String },
}
