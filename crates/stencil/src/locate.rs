//! Sheet lookup

use stencil_core::Workbook;

use crate::error::{ExportError, Result};

/// Resolve every named sheet to its index, by exact name
///
/// All absent names are reported together so nothing is mutated on a
/// template that cannot be exported.
pub fn locate_sheets(workbook: &Workbook, names: &[&str]) -> Result<Vec<usize>> {
    let mut found = Vec::with_capacity(names.len());
    let mut missing: Vec<String> = Vec::new();

    for &name in names {
        match workbook.sheet_index(name) {
            Some(index) => found.push(index),
            None if missing.iter().any(|m| m == name) => {}
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        log::debug!(
            "template sheets are [{}], missing [{}]",
            workbook.sheet_names().collect::<Vec<_>>().join(", "),
            missing.join(", ")
        );
        return Err(ExportError::SheetNotFound { missing });
    }
    Ok(found)
}
