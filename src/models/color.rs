use std::fmt;

use thiserror::Error;

/// Number of ranked levels on each bivariate axis.
pub const MATRIX_LEVELS: usize = 9;

/// Income palette used when a village carries no bivariate color.
pub const INCOME_COLORS: [&str; MATRIX_LEVELS] = [
    "#fee5d9", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
    "#4d0000",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str, alpha: f32) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorMatrixError {
    #[error("expected {expected} income rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("income row {row}: expected {expected} density cells, got {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// 9×9 bivariate lookup, indexed `[income_level][density_level]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMatrix {
    cells: Vec<Vec<String>>,
}

impl ColorMatrix {
    pub fn new(cells: Vec<Vec<String>>) -> Result<Self, ColorMatrixError> {
        if cells.len() != MATRIX_LEVELS {
            return Err(ColorMatrixError::RowCount {
                expected: MATRIX_LEVELS,
                actual: cells.len(),
            });
        }
        if let Some((row, cols)) = cells
            .iter()
            .enumerate()
            .find(|(_, cols)| cols.len() != MATRIX_LEVELS)
        {
            return Err(ColorMatrixError::ColumnCount {
                row,
                expected: MATRIX_LEVELS,
                actual: cols.len(),
            });
        }
        Ok(Self { cells })
    }

    pub fn color(&self, income_level: usize, density_level: usize) -> Option<&str> {
        self.cells
            .get(income_level)?
            .get(density_level)
            .map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/color.rs"]
mod tests;
