//! Remote AI collaborators: automatic detection and assisted annotation.
//!
//! The crate never talks to the network itself. Callers plug in a
//! [`Detector`] or [`Assistant`] and drive it through an [`AiClient`], which
//! enforces the request and response rules:
//!
//! - empty prompts, empty image lists and missing credentials are rejected
//!   before any remote call
//! - detection results must line up one-to-one with the submitted images
//! - a failed request changes nothing on the caller's side

mod client;
mod collaborator;
mod error;
pub mod response;

pub use client::{AiClient, BatchOutcome};
pub use collaborator::{Assistant, Detector, ImagePayload};
pub use error::{AiError, ApiKey};
