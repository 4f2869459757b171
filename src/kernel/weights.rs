//! Complementary weight sliders with a trailing debounce, and the bivariate
//! legend built from the server's color matrix.

use std::time::{Duration, Instant};

use crate::models::{ColorMatrix, Slider, WeightPair, MATRIX_LEVELS};

#[derive(Debug, Clone)]
pub struct WeightController {
    weights: WeightPair,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl WeightController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            weights: WeightPair::default(),
            debounce,
            deadline: None,
        }
    }

    pub fn weights(&self) -> WeightPair {
        self.weights
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Moves one slider; the other follows as `100 - value`. Every movement
    /// restarts the quiet period. Returns whether the pair changed.
    pub fn set(&mut self, slider: Slider, percent: u8, now: Instant) -> bool {
        let next = WeightPair::from_slider(slider, percent);
        let changed = next != self.weights;
        self.weights = next;
        self.deadline = Some(now + self.debounce);
        changed
    }

    /// True exactly once per quiet period, on the first poll at or after the
    /// deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendCell {
    pub income_level: usize,
    pub density_level: usize,
    pub color: String,
}

/// Rows run from density level 8 (top) to 0; columns from income level 0
/// (left) to 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendGrid {
    pub rows: Vec<Vec<LegendCell>>,
}

impl LegendGrid {
    pub fn from_matrix(matrix: &ColorMatrix) -> Self {
        let rows = (0..MATRIX_LEVELS)
            .rev()
            .map(|density_level| {
                (0..MATRIX_LEVELS)
                    .map(|income_level| LegendCell {
                        income_level,
                        density_level,
                        color: matrix
                            .color(income_level, density_level)
                            .unwrap_or_default()
                            .to_string(),
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&LegendCell> {
        self.rows.get(row)?.get(col)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/weights.rs"]
mod tests;
