//! Stable color identity per backend id.

use std::collections::HashMap;

use crate::types::MISSING_ORIGIN;

/// Colors handed out in order, reused cyclically once exhausted.
pub const PALETTE: [&str; 15] = [
    "#2196F3", // blue
    "#4CAF50", // green
    "#FF9800", // orange
    "#9C27B0", // purple
    "#F44336", // red
    "#009688", // teal
    "#FF5722", // deep orange
    "#3F51B5", // indigo
    "#8BC34A", // light green
    "#E91E63", // pink
    "#00BCD4", // cyan
    "#FFC107", // amber
    "#795548", // brown
    "#607D8B", // blue grey
    "#CDDC39", // lime
];

/// Reserved for the "missing origin header" sentinel; never drawn from the cycle.
pub const MISSING_COLOR: &str = "#E74C3C";

/// Color of a marker before its backend is revealed.
pub const NEUTRAL_COLOR: &str = "#9E9E9E";

/// Insertion-ordered backend id -> color table.
#[derive(Debug, Default)]
pub struct ColorAllocator {
    order: Vec<(String, &'static str)>,
    index: HashMap<String, usize>,
    cursor: usize,
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the color for `id`, assigning the next palette entry on first sight.
    pub fn allocate(&mut self, id: &str) -> &'static str {
        if let Some(color) = self.lookup(id) {
            return color;
        }

        let color = if id == MISSING_ORIGIN {
            MISSING_COLOR
        } else {
            let color = PALETTE[self.cursor % PALETTE.len()];
            self.cursor += 1;
            color
        };

        self.index.insert(id.to_string(), self.order.len());
        self.order.push((id.to_string(), color));
        tracing::trace!(origin_id = %id, color, "Color allocated");
        color
    }

    /// Non-mutating probe.
    pub fn lookup(&self, id: &str) -> Option<&'static str> {
        self.index.get(id).map(|&i| self.order[i].1)
    }

    /// All assignments in insertion order.
    pub fn allocated(&self) -> Vec<(String, &'static str)> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every assignment and rewind the cycle.
    pub fn reset(&mut self) {
        self.order.clear();
        self.index.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_idempotent() {
        let mut colors = ColorAllocator::new();
        let a = colors.allocate("us-east-1");
        let b = colors.allocate("us-west-2");
        assert_ne!(a, b);
        assert_eq!(colors.allocate("us-east-1"), a);
        assert_eq!(colors.lookup("us-east-1"), Some(a));
        assert_eq!(colors.lookup("nope"), None);
    }

    #[test]
    fn palette_wraps_cyclically() {
        let mut colors = ColorAllocator::new();
        let ids: Vec<String> = (0..PALETTE.len() + 2).map(|i| format!("b{}", i)).collect();
        let assigned: Vec<_> = ids.iter().map(|id| colors.allocate(id)).collect();

        assert_eq!(assigned[PALETTE.len()], assigned[0]);
        assert_eq!(assigned[PALETTE.len() + 1], assigned[1]);
    }

    #[test]
    fn missing_sentinel_bypasses_cycle() {
        let mut colors = ColorAllocator::new();
        assert_eq!(colors.allocate(MISSING_ORIGIN), MISSING_COLOR);
        assert_eq!(colors.allocate(MISSING_ORIGIN), MISSING_COLOR);
        // The cycle pointer did not move.
        assert_eq!(colors.allocate("0"), PALETTE[0]);
        assert_eq!(colors.allocated().len(), 2);
    }

    #[test]
    fn reset_rewinds() {
        let mut colors = ColorAllocator::new();
        colors.allocate("0");
        colors.allocate("1");
        colors.reset();
        assert!(colors.is_empty());
        assert_eq!(colors.allocate("1"), PALETTE[0]);
    }
}
