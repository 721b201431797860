//! Data models for annotation sessions.

mod annotation;
mod geometry;
mod image;

pub use annotation::{BoundingBox, BoxId, BoxIdAllocator, BoxSource, SuggestedBox};
pub use geometry::{Point, Rect};
pub use image::{ImageId, ImageRecord};
