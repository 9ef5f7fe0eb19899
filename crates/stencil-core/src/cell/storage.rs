//! Sparse cell storage
//!
//! Only non-empty cells are stored, using a row-major `BTreeMap` so iteration
//! order matches the order cells are written to `sheetData`.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};
use crate::column::Column;
use crate::row::Row;
use crate::style::StylePool;

/// Value plus style index for one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the sheet's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Check if this cell carries neither a value nor a style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse row-based storage for worksheet cells and dimension metadata
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    style_pool: StylePool,
    row_info: BTreeMap<u32, Row>,
    columns: BTreeMap<u16, Column>,
    merged_regions: Vec<CellRange>,
}

impl CellStorage {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Set a cell value, keeping any style already present at that position
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let cells = self.rows.entry(row).or_default();
        let cell = cells.entry(col).or_default();
        cell.value = value;
        if cell.is_empty() {
            cells.remove(&col);
            if cells.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Set a cell style index, keeping the value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let cells = self.rows.entry(row).or_default();
        let cell = cells.entry(col).or_default();
        cell.style_index = style_index;
        if cell.is_empty() {
            cells.remove(&col);
            if cells.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Remove a cell entirely
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let cells = self.rows.get_mut(&row)?;
        let removed = cells.remove(&col);
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Iterate all stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cells)| cells.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate the stored cells of one row in column order
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(&col, data)| (col, data)))
    }

    /// Check if a row holds any stored cells
    pub fn has_row(&self, row: u32) -> bool {
        self.rows.contains_key(&row)
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bounds of all stored cells: (min_row, min_col, max_row, max_col)
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;
        let min_col = self.rows.values().filter_map(|r| r.keys().next()).min()?;
        let max_col = self.rows.values().filter_map(|r| r.keys().next_back()).max()?;
        Some((min_row, *min_col, max_row, *max_col))
    }

    /// Style pool backing the style indices of this storage
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Mutable style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }

    /// Row metadata, if any was set
    pub fn row_info(&self, row: u32) -> Option<&Row> {
        self.row_info.get(&row)
    }

    /// Row metadata, created on demand
    pub fn row_info_mut(&mut self, row: u32) -> &mut Row {
        self.row_info.entry(row).or_insert_with(|| Row::new(row))
    }

    /// All rows with custom metadata
    pub fn rows_with_info(&self) -> impl Iterator<Item = &Row> {
        self.row_info.values()
    }

    /// Column metadata, if any was set
    pub fn column(&self, col: u16) -> Option<&Column> {
        self.columns.get(&col)
    }

    /// Column metadata, created on demand
    pub fn column_mut(&mut self, col: u16) -> &mut Column {
        self.columns.entry(col).or_insert_with(|| Column::new(col))
    }

    /// All columns with custom metadata, in column order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Merged cell regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Add a merged region (caller checks overlaps)
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }
}
