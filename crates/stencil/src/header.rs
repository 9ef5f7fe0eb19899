//! Header row extraction

use std::ops::Index;

use stencil_core::{CellValue, Worksheet};

/// Ordered, trimmed, non-blank labels from row 1 of a sheet
///
/// Blank header cells are dropped and the remaining labels close up, so
/// label `j` maps to column `j + 1` regardless of where it sat in the
/// template. A header row with gaps therefore shifts data left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    names: Vec<String>,
}

impl HeaderList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .map(|s: String| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Read row 1 of `sheet`
    ///
    /// Only plain text cells are labels. Numbers, booleans, errors and
    /// formulas (even with a cached text result) are skipped like blanks.
    pub fn from_sheet(sheet: &Worksheet) -> Self {
        let headers = Self::new(sheet.row_cells(0).filter_map(|(_, cell)| match &cell.value {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }));
        if headers.is_empty() {
            log::warn!(
                "sheet '{}' has no header labels in row 1; no columns will be populated",
                sheet.name()
            );
        }
        headers
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl Index<usize> for HeaderList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.names[index]
    }
}
