//! Exporter trait and the in-memory bundle it produces.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::model::ImageId;

use super::error::ExportError;
use super::record::ExportRecord;

/// Converts committed annotations into an external format.
///
/// Exporters never touch the filesystem; the host decides where the bundle
/// goes.
pub trait Exporter: Send + Sync {
    /// Unique identifier (e.g., "yolo", "coco").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    fn export(&self, records: &[ExportRecord]) -> Result<ExportBundle, ExportError>;
}

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Path inside the bundle, `/`-separated
    pub path: String,
    pub contents: Vec<u8>,
}

/// Non-fatal problem met while exporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWarning {
    pub image: Option<ImageId>,
    pub message: String,
}

impl ExportWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            image: None,
            message: message.into(),
        }
    }

    pub fn with_image(mut self, image: ImageId) -> Self {
        self.image = Some(image);
        self
    }
}

/// Files produced by an exporter, plus what was skipped.
#[derive(Debug, Default)]
pub struct ExportBundle {
    pub files: Vec<ExportFile>,
    pub images_exported: usize,
    pub annotations_exported: usize,
    pub warnings: Vec<ExportWarning>,
}

impl ExportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.push(ExportFile {
            path: path.into(),
            contents: contents.into(),
        });
    }

    pub fn add_warning(&mut self, warning: ExportWarning) {
        log::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn file(&self, path: &str) -> Option<&ExportFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Pack every file into an in-memory ZIP archive.
    pub fn to_zip(&self) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for file in &self.files {
            zip.start_file(file.path.as_str(), options)?;
            zip.write_all(&file.contents)?;
        }
        let bytes = zip.finish()?.into_inner();
        log::debug!("Packed {} files into {} byte archive", self.files.len(), bytes.len());
        Ok(bytes)
    }
}
