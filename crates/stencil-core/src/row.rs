//! Row metadata and the row editing handle

use crate::cell::CellValue;
use crate::error::Result;
use crate::worksheet::Worksheet;

/// Row metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row index (0-based)
    pub index: u32,
    /// Custom height in points (None = default)
    pub height: Option<f64>,
    /// Row is hidden
    pub hidden: bool,
}

impl Row {
    /// Create a new row with default settings
    pub fn new(index: u32) -> Self {
        Self {
            index,
            height: None,
            hidden: false,
        }
    }

    /// Check if this row has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.height.is_some() || self.hidden
    }
}

/// Mutable handle over one worksheet row
///
/// Obtained from [`Worksheet::row_mut`]. Writes go straight to the sheet;
/// [`RowMut::commit`] seals the row so no further handle can be opened on it.
///
/// ```
/// use stencil_core::Worksheet;
///
/// let mut ws = Worksheet::new("Data");
/// let mut row = ws.row_mut(1).unwrap();
/// row.set(0, "A").unwrap();
/// row.set(1, 2.0).unwrap();
/// row.commit();
///
/// assert!(ws.is_row_sealed(1));
/// assert!(ws.row_mut(1).is_err());
/// ```
#[derive(Debug)]
pub struct RowMut<'a> {
    sheet: &'a mut Worksheet,
    index: u32,
    written: usize,
}

impl<'a> RowMut<'a> {
    pub(crate) fn new(sheet: &'a mut Worksheet, index: u32) -> Self {
        Self {
            sheet,
            index,
            written: 0,
        }
    }

    /// Row index (0-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Set the value of the cell at `col` (0-based) in this row
    pub fn set<V: Into<CellValue>>(&mut self, col: u16, value: V) -> Result<()> {
        self.sheet.set_cell_value_at(self.index, col, value)?;
        self.written += 1;
        Ok(())
    }

    /// Number of cells written through this handle
    pub fn written(&self) -> usize {
        self.written
    }

    /// Seal the row
    pub fn commit(self) {
        self.sheet.seal_row(self.index);
    }
}
