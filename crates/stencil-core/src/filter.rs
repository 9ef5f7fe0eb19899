//! Sheet auto-filter

use crate::cell::CellRange;

/// Auto-filter dropdowns over a header row and the data below it
///
/// Only the range is kept; per-column filter criteria are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoFilter {
    pub range: CellRange,
}

impl AutoFilter {
    pub fn new(range: CellRange) -> Self {
        Self { range }
    }

    /// Row holding the filter buttons (0-based)
    pub fn header_row(&self) -> u32 {
        self.range.start.row
    }
}
