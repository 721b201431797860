//! bbox_studio - bounding box annotation core
//!
//! The platform-independent half of an interactive annotation tool: the
//! mapping between normalized box coordinates and an on-screen letterboxed
//! image, the pointer state machine that draws, moves and resizes boxes,
//! per-label colors, provenance tracking for machine-suggested boxes, and an
//! in-memory store of committed results with YOLO/COCO export.
//!
//! Rendering, file access and the network are left to the host. Remote
//! detection and assisted annotation plug in through the traits in [`ai`].

pub mod ai;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod display_math;
pub mod editor;
pub mod export;
pub mod ingest;
pub mod label_colors;
pub mod model;
pub mod provenance;
pub mod session;
pub mod store;

pub use ai::{AiClient, AiError, Assistant, BatchOutcome, Detector};
pub use config::StudioConfig;
pub use editor::AnnotationEditor;
pub use ingest::NewImage;
pub use session::EditSession;
pub use store::{ResultStore, StoreError};
