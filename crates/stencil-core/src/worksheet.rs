//! Worksheet type

use std::collections::BTreeSet;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::filter::AutoFilter;
use crate::row::{Row, RowMut};
use crate::style::{Style, StylePool};
use crate::validation::DataValidation;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    visible: bool,
    /// Rows committed through [`RowMut::commit`]
    sealed_rows: BTreeSet<u32>,
    freeze_panes: Option<FreezePanes>,
    auto_filter: Option<AutoFilter>,
    data_validations: Vec<DataValidation>,
    default_column_width: Option<f64>,
    default_row_height: Option<f64>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            visible: true,
            sealed_rows: BTreeSet::new(),
            freeze_panes: None,
            auto_filter: None,
            data_validations: Vec::new(),
            default_column_width: None,
            default_row_height: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // === Cell Access ===

    /// Get a cell by address string
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get a cell by row and column indices (0-based)
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get a cell value by address string (Empty when unset)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by indices (Empty when unset)
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Style index of a cell (0 when unset)
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map_or(0, |c| c.style_index)
    }

    /// Resolve a style index against this sheet's pool
    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.style_pool().get(style_index)
    }

    /// Style of a cell, if it has one
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        self.cells
            .get(row, col)
            .and_then(|c| self.style_by_index(c.style_index))
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by indices, keeping any existing style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by indices
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    /// Bounds of all stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Cells of one row in column order
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.row_cells(row)
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sheet-local style pool
    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    // === Row Handles ===

    /// Open a write handle on a row (0-based)
    ///
    /// Fails with [`Error::RowSealed`] once the row has been committed.
    pub fn row_mut(&mut self, row: u32) -> Result<RowMut<'_>> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if self.sealed_rows.contains(&row) {
            return Err(Error::RowSealed(row));
        }
        Ok(RowMut::new(self, row))
    }

    pub(crate) fn seal_row(&mut self, row: u32) {
        self.sealed_rows.insert(row);
    }

    /// Whether a row has been committed
    pub fn is_row_sealed(&self, row: u32) -> bool {
        self.sealed_rows.contains(&row)
    }

    /// Committed rows in ascending order
    pub fn sealed_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.sealed_rows.iter().copied()
    }

    // === Row/Column Dimensions ===

    /// Custom row height in points
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.cells.row_info(row).and_then(|r| r.height)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.row_info_mut(row).height = Some(height);
    }

    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.cells.row_info(row).is_some_and(|r| r.hidden)
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.cells.row_info_mut(row).hidden = hidden;
    }

    /// Rows carrying custom height or visibility
    pub fn rows_with_info(&self) -> impl Iterator<Item = &Row> {
        self.cells.rows_with_info().filter(|r| r.has_custom_settings())
    }

    /// Custom column width in character units
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.cells.column(col).and_then(|c| c.width)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.column_mut(col).width = Some(width);
    }

    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.cells.column(col).is_some_and(|c| c.hidden)
    }

    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.cells.column_mut(col).hidden = hidden;
    }

    /// Default style of a column
    pub fn column_style(&self, col: u16) -> Option<&Style> {
        self.cells
            .column(col)
            .and_then(|c| c.style_index)
            .and_then(|idx| self.style_by_index(idx))
    }

    pub fn set_column_style(&mut self, col: u16, style: &Style) {
        let idx = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.column_mut(col).style_index = Some(idx);
    }

    /// Columns carrying custom settings, in index order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.cells.columns().filter(|c| c.has_custom_settings())
    }

    pub fn default_column_width(&self) -> Option<f64> {
        self.default_column_width
    }

    pub fn set_default_column_width(&mut self, width: Option<f64>) {
        self.default_column_width = width;
    }

    pub fn default_row_height(&self) -> Option<f64> {
        self.default_row_height
    }

    pub fn set_default_row_height(&mut self, height: Option<f64>) {
        self.default_row_height = height;
    }

    // === Merged Cells ===

    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge a range; fails when it overlaps an existing merge
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if let Some(existing) = self
            .cells
            .merged_regions()
            .iter()
            .find(|existing| range.overlaps(existing))
        {
            return Err(Error::MergedCellConflict(existing.to_string()));
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    // === View and Filter ===

    pub fn freeze_panes(&self) -> Option<&FreezePanes> {
        self.freeze_panes.as_ref()
    }

    /// Freeze rows above `row` and columns left of `col`; (0, 0) unfreezes
    pub fn set_freeze_panes(&mut self, row: u32, col: u16) {
        if row == 0 && col == 0 {
            self.freeze_panes = None;
        } else {
            self.freeze_panes = Some(FreezePanes { row, col });
        }
    }

    pub fn auto_filter(&self) -> Option<&AutoFilter> {
        self.auto_filter.as_ref()
    }

    pub fn set_auto_filter(&mut self, filter: Option<AutoFilter>) {
        self.auto_filter = filter;
    }

    // === Data Validation ===

    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.data_validations.push(validation);
    }

    pub fn data_validations(&self) -> &[DataValidation] {
        &self.data_validations
    }

    /// First validation covering a cell
    pub fn data_validation_at(&self, row: u32, col: u16) -> Option<&DataValidation> {
        self.data_validations.iter().find(|v| v.applies_to(row, col))
    }

    pub fn clear_data_validations(&mut self) {
        self.data_validations.clear();
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

/// Freeze pane settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    /// First unfrozen row
    pub row: u32,
    /// First unfrozen column
    pub col: u16,
}
