//! Per-session label color assignment.

use std::collections::HashMap;

use crate::color_utils::golden_angle_palette;
use crate::constants::DEFAULT_PALETTE;

/// Assigns each distinct label a color from a fixed palette in first-seen
/// order, wrapping around once the palette is exhausted.
///
/// Assignments are append-only until [`reset`](Self::reset) starts a new
/// epoch. The same sequence of first-seen labels always yields the same
/// color sequence.
#[derive(Debug, Clone)]
pub struct LabelColorAllocator {
    palette: Vec<String>,
    assigned: HashMap<String, String>,
    count: usize,
    epoch: u32,
}

impl LabelColorAllocator {
    /// Create an allocator over `palette`. An empty palette falls back to the
    /// built-in one.
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self {
            palette,
            assigned: HashMap::new(),
            count: 0,
            epoch: 0,
        }
    }

    /// Allocator over `count` evenly spread generated hues.
    pub fn generated(count: usize) -> Self {
        Self::new(golden_angle_palette(count))
    }

    pub fn color_for(&mut self, label: &str) -> String {
        if let Some(color) = self.assigned.get(label) {
            return color.clone();
        }
        let color = self.palette[self.count % self.palette.len()].clone();
        self.count += 1;
        self.assigned.insert(label.to_string(), color.clone());
        color
    }

    /// Look up a label without assigning.
    pub fn peek(&self, label: &str) -> Option<&str> {
        self.assigned.get(label).map(String::as_str)
    }

    /// Forget all assignments and start a new epoch.
    pub fn reset(&mut self) {
        self.assigned.clear();
        self.count = 0;
        self.epoch += 1;
        log::debug!("Label colors reset (epoch {})", self.epoch);
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Number of distinct labels seen this epoch.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl Default for LabelColorAllocator {
    fn default() -> Self {
        Self::new(default_palette())
    }
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}
