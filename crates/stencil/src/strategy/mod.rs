//! Turning a populated template into the workbook that is sent back
//!
//! Two strategies trade fidelity differently:
//!
//! - [`InPlace`] returns the populated template. Everything the codec
//!   models survives; template parts it does not model (drawings, comments,
//!   conditional formatting, themes, printer settings) are lost on re-save.
//! - [`Reconstruct`] copies sheet names, column widths and cell values into a
//!   new workbook and re-applies the configured style and validation tables.
//!   Nothing outside that allow-list is carried over.

mod in_place;
mod reconstruct;

pub use in_place::InPlace;
pub use reconstruct::Reconstruct;

use stencil_core::Workbook;

use crate::config::ExportConfig;
use crate::error::Result;

/// What a strategy knows about the export it is finishing
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub config: &'a ExportConfig,
    /// Number of data rows written below the header
    pub record_count: usize,
}

impl<'a> StrategyContext<'a> {
    pub fn new(config: &'a ExportConfig, record_count: usize) -> Self {
        Self {
            config,
            record_count,
        }
    }

    pub fn data_sheet(&self) -> &'a str {
        &self.config.data_sheet
    }
}

/// Produces the final workbook from the populated template
pub trait TemplateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn finish(&self, populated: Workbook, ctx: &StrategyContext<'_>) -> Result<Workbook>;
}
