//! Provenance-aware merging of machine suggestions.
//!
//! Machine boxes always enter a set as new boxes with fresh ids. Existing
//! boxes, and any manual work on them, are never touched by a merge.
//! Overlapping suggestions are kept; resolving duplicates is left to the
//! person reviewing the image.

use crate::model::{BoundingBox, BoxIdAllocator, BoxSource, SuggestedBox};

/// Convert suggestions into boxes with the given provenance.
///
/// Suggestions that have no area left after clipping into the unit square
/// are dropped with a warning.
pub fn admit(
    suggestions: Vec<SuggestedBox>,
    source: BoxSource,
    ids: &mut BoxIdAllocator,
) -> Vec<BoundingBox> {
    suggestions
        .into_iter()
        .filter_map(|s| {
            let label = s.label.clone();
            let admitted = s.into_box(ids.peek(), source);
            match admitted {
                Some(b) => {
                    ids.allocate();
                    Some(b)
                }
                None => {
                    log::warn!("Dropping {source} suggestion '{label}': no area inside the image");
                    None
                }
            }
        })
        .collect()
}

/// Boxes seeded from automatic detection at ingestion time.
pub fn detected_boxes(
    suggestions: Vec<SuggestedBox>,
    ids: &mut BoxIdAllocator,
) -> Vec<BoundingBox> {
    admit(suggestions, BoxSource::AiDetected, ids)
}

/// Append assisted suggestions to `existing` as fresh `ai-assisted` boxes.
pub fn merge_assisted(
    existing: Vec<BoundingBox>,
    suggestions: Vec<SuggestedBox>,
    ids: &mut BoxIdAllocator,
) -> Vec<BoundingBox> {
    let mut merged = existing;
    let added = admit(suggestions, BoxSource::AiAssisted, ids);
    log::info!("Merged {} assisted boxes into {} existing", added.len(), merged.len());
    merged.extend(added);
    merged
}
