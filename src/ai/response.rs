//! Validation of raw collaborator responses.
//!
//! A response as a whole is either trusted or rejected. Inside an accepted
//! response, individual entries that are unusable are skipped with a warning.

use serde::Deserialize;
use serde_json::Value;

use crate::model::SuggestedBox;

use super::error::AiError;

/// Parse collaborator output that arrived as text.
///
/// Models like to wrap JSON in a fenced code block; the fence is stripped
/// before parsing.
pub fn decode_text(text: &str) -> Result<Value, AiError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(|e| AiError::malformed(format!("invalid JSON: {e}")))
}

/// Validate a detection response for `expected` images.
///
/// The outer list must line up positionally with the submitted images.
pub fn parse_detection(value: &Value, expected: usize) -> Result<Vec<Vec<SuggestedBox>>, AiError> {
    let per_image = value
        .as_array()
        .ok_or_else(|| AiError::malformed(format!("expected an array, got {}", kind(value))))?;

    if per_image.len() != expected {
        return Err(AiError::CountMismatch {
            expected,
            found: per_image.len(),
        });
    }

    Ok(per_image
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry.as_array() {
            Some(entries) => parse_entries(entries, &format!("image {index}")),
            None => {
                log::warn!(
                    "Detection result for image {index} is {} instead of a list; treating as empty",
                    kind(entry)
                );
                Vec::new()
            }
        })
        .collect())
}

/// Validate an assist response: a list of boxes, or an object with a
/// `boxes` list.
pub fn parse_assist(value: &Value) -> Result<Vec<SuggestedBox>, AiError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => map
            .get("boxes")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::malformed("object response has no 'boxes' list"))?,
        other => {
            return Err(AiError::malformed(format!(
                "expected a list of boxes, got {}",
                kind(other)
            )));
        }
    };
    Ok(parse_entries(entries, "assist"))
}

fn parse_entries(entries: &[Value], context: &str) -> Vec<SuggestedBox> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match SuggestedBox::deserialize(entry) {
            Ok(suggestion) => validate(suggestion, context, i),
            Err(e) => {
                log::warn!("Skipping {context} entry {i}: {e}");
                None
            }
        })
        .collect()
}

fn validate(mut suggestion: SuggestedBox, context: &str, index: usize) -> Option<SuggestedBox> {
    let label = suggestion.label.trim();
    if label.is_empty() {
        log::warn!("Skipping {context} entry {index}: empty label");
        return None;
    }
    if suggestion.rect().clipped_to_unit().is_none() {
        log::warn!("Skipping {context} entry {index} '{label}': no area inside the image");
        return None;
    }
    suggestion.label = label.to_string();
    Some(suggestion)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
