//! # stencil-core
//!
//! In-memory workbook model used by the stencil export engine.
//!
//! - [`CellValue`] - cell contents (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - A1 addressing
//! - [`Style`] - fonts, fills, borders, alignment and number formats
//! - [`DataValidation`], [`AutoFilter`], [`DefinedName`] - sheet and book features
//! - [`Workbook`], [`Worksheet`], [`RowMut`] - the document and its row handles
//!
//! ## Example
//!
//! ```rust
//! use stencil_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Region").unwrap();
//!
//! let mut row = sheet.row_mut(1).unwrap();
//! row.set(0, "EMEA").unwrap();
//! row.commit();
//!
//! assert_eq!(sheet.get_value_at(1, 0), CellValue::string("EMEA"));
//! ```

pub mod cell;
pub mod column;
pub mod defined_name;
pub mod error;
pub mod filter;
pub mod row;
pub mod style;
pub mod validation;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellRange, CellValue};
pub use column::Column;
pub use defined_name::DefinedName;
pub use error::{Error, Result};
pub use filter::AutoFilter;
pub use row::{Row, RowMut};
pub use validation::{
    CompareKind, DataValidation, ValidationErrorStyle, ValidationOperator, ValidationType,
};
pub use workbook::Workbook;
pub use worksheet::{FreezePanes, Worksheet};

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
