//! Seams to the remote detection and assist services.
//!
//! Implementations own the transport (HTTP client, model prompt template,
//! retries at the connection level). They hand back the raw JSON they
//! received; shape validation happens in [`super::response`] so every
//! collaborator gets the same rules.

use std::future::Future;

use crate::model::{ImageRecord, SuggestedBox};

use super::error::{AiError, ApiKey};

/// Encoded image bytes as sent to a collaborator.
#[derive(Debug, Clone, Copy)]
pub struct ImagePayload<'a> {
    pub pixels: &'a [u8],
    pub mime_type: &'a str,
}

impl<'a> From<&'a ImageRecord> for ImagePayload<'a> {
    fn from(record: &'a ImageRecord) -> Self {
        Self {
            pixels: &record.pixels,
            mime_type: &record.mime_type,
        }
    }
}

/// Batch object detection.
///
/// The returned JSON must be an array with one element per input image, in
/// input order.
pub trait Detector {
    fn detect(
        &self,
        key: &ApiKey,
        images: &[ImagePayload<'_>],
        prompt: &str,
    ) -> impl Future<Output = Result<serde_json::Value, AiError>> + Send;
}

/// Single-image assisted annotation.
///
/// `existing` carries the current boxes as context only, stripped of ids,
/// provenance and colors.
pub trait Assistant {
    fn assist(
        &self,
        key: &ApiKey,
        image: ImagePayload<'_>,
        prompt: &str,
        existing: &[SuggestedBox],
    ) -> impl Future<Output = Result<serde_json::Value, AiError>> + Send;
}
