//! Row population

use stencil_core::{Worksheet, MAX_COLS, MAX_ROWS};

use crate::error::{ExportError, Result};
use crate::header::HeaderList;
use crate::record::InputRecord;

/// Largest number of records a sheet can take below its header row
pub const MAX_RECORDS: usize = MAX_ROWS as usize - 1;

/// Write `records` into rows 2..=N+1 of `sheet`, one column per header
///
/// Record `i` lands in row `i + 2`; header `j` in column `j + 1`. Absent
/// and null fields become empty strings. Each row is sealed once written.
/// Row 1 and columns past the header list are never touched, and styles
/// already on the target cells are kept.
///
/// Returns the number of rows written.
pub fn populate_rows(
    sheet: &mut Worksheet,
    records: &[InputRecord],
    headers: &HeaderList,
) -> Result<usize> {
    if records.len() > MAX_RECORDS {
        return Err(ExportError::invalid_input(format!(
            "{} records exceed the sheet limit of {}",
            records.len(),
            MAX_RECORDS
        )));
    }
    if headers.len() > MAX_COLS as usize {
        return Err(ExportError::invalid_input(format!(
            "{} headers exceed the column limit of {}",
            headers.len(),
            MAX_COLS
        )));
    }

    for (i, record) in records.iter().enumerate() {
        if !headers.is_empty() && !headers.iter().any(|h| record.get(h).is_some()) {
            log::warn!(
                "record {} matches none of the {} header(s) in '{}'; its row is blank",
                i,
                headers.len(),
                sheet.name()
            );
        }

        let mut row = sheet.row_mut(i as u32 + 1)?;
        for (j, header) in headers.iter().enumerate() {
            row.set(j as u16, record.cell_value(header))?;
        }
        row.commit();
    }

    log::debug!(
        "populated {} row(s) x {} column(s) in '{}'",
        records.len(),
        headers.len(),
        sheet.name()
    );
    Ok(records.len())
}
