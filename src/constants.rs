//! Global constants for bbox_studio

/// Smallest width/height (normalized) a resize may shrink a box to
pub const DEFAULT_MIN_EXTENT: f32 = 0.01;

/// Distance in display pixels within which a press grabs a resize handle
pub const DEFAULT_HANDLE_HIT_RADIUS: f32 = 8.0;

/// Label given to newly drawn boxes until the user picks another
pub const DEFAULT_LABEL: &str = "object";

/// Number of images sent to the detection collaborator per request
pub const DEFAULT_DETECTION_BATCH_SIZE: usize = 4;

/// Environment variable consulted for the AI API key
pub const DEFAULT_API_KEY_ENV: &str = "BBOX_STUDIO_API_KEY";

/// Label colors handed out in first-seen order
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe",
];
