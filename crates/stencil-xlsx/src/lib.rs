//! # stencil-xlsx
//!
//! XLSX (Office Open XML) reader and writer for the stencil workbook model.
//!
//! The reader covers the parts a data template relies on: cell values,
//! shared strings, cell and column styles, column widths, row heights,
//! frozen panes, auto-filters, merged regions, data validations and
//! defined names. The writer emits the same subset and is deterministic:
//! the same workbook always serializes to the same bytes.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

/// MIME type of an `.xlsx` package
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
