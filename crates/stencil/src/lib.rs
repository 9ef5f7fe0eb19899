//! # stencil
//!
//! Fill an `.xlsx` template with rows of records and get back a download.
//!
//! The template supplies layout, styling, column widths, autofilters and
//! dropdown validations; the caller supplies records keyed by the labels in
//! the template's header row. One export runs:
//!
//! 1. [`TemplateSource::load`] - fresh workbook from the template
//! 2. [`locate_sheets`] - every required sheet must exist
//! 3. [`HeaderList::from_sheet`] - trimmed, non-blank labels from row 1
//! 4. [`populate_rows`] - record `i` into row `i + 2`, each row sealed
//! 5. [`TemplateStrategy::finish`] - [`InPlace`] or [`Reconstruct`]
//! 6. [`ExportResponse::build`] - encoded bytes plus download headers
//!
//! ## Example
//!
//! ```no_run
//! use stencil::{ExportConfig, Exporter};
//!
//! let exporter = Exporter::new(ExportConfig::with_template("templates/template.xlsx"))?;
//! let response = exporter.export_json(br#"[{"Region": "EMEA", "Qty": 0}]"#)?;
//!
//! for (name, value) in response.headers() {
//!     println!("{}: {}", name, value);
//! }
//! std::fs::write(&response.filename, &response.body)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod header;
pub mod locate;
pub mod populate;
pub mod record;
pub mod respond;
pub mod strategy;
pub mod template;

pub use config::{
    ColumnStyleRule, ExportConfig, StrategyKind, StyleTable, ValidationTable,
    DEFAULT_DATA_SHEET, DEFAULT_DOWNLOAD_FILENAME, DEFAULT_LOOKUP_SHEET, DEFAULT_TEMPLATE_PATH,
};
pub use error::{ErrorKind, ExportError, Result};
pub use export::Exporter;
pub use header::HeaderList;
pub use locate::locate_sheets;
pub use populate::{populate_rows, MAX_RECORDS};
pub use record::{parse_records, FieldValue, InputRecord};
pub use respond::{ExportResponse, WorkbookEncoder, XlsxEncoder};
pub use strategy::{InPlace, Reconstruct, StrategyContext, TemplateStrategy};
pub use template::{TemplateBytes, TemplateFile, TemplateSource};

// Re-export the model and codec so callers need a single dependency
pub use stencil_core::{CellValue, Workbook, Worksheet};
pub use stencil_xlsx::{XlsxError, XlsxReader, XlsxWriter, XLSX_CONTENT_TYPE};
