//! Column width policy

use indexmap::IndexMap;

/// Default width applied to every column without an override
pub const DEFAULT_COLUMN_WIDTH: f64 = 15.0;

/// Per-sheet column widths: one default plus optional overrides keyed by
/// sheet name and column index
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    default_width: f64,
    overrides: IndexMap<String, Vec<(usize, f64)>>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_WIDTH)
    }
}

impl ColumnLayout {
    pub fn new(default_width: f64) -> Self {
        Self {
            default_width,
            overrides: IndexMap::new(),
        }
    }

    /// Add width overrides for a named sheet; later calls extend earlier ones
    pub fn with_overrides(mut self, sheet: impl Into<String>, widths: &[(usize, f64)]) -> Self {
        self.overrides
            .entry(sheet.into())
            .or_default()
            .extend_from_slice(widths);
        self
    }

    /// Width of every column of a sheet, in column order
    ///
    /// Overrides past the last column are ignored.
    pub fn widths_for(&self, sheet: &str, column_count: usize) -> Vec<f64> {
        let mut widths = vec![self.default_width; column_count];
        if let Some(overrides) = self.overrides.get(sheet) {
            for &(index, width) in overrides {
                if let Some(slot) = widths.get_mut(index) {
                    *slot = width;
                }
            }
        }
        widths
    }
}
