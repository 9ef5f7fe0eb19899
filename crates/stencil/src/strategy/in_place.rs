use stencil_core::Workbook;

use super::{StrategyContext, TemplateStrategy};
use crate::error::Result;

/// Hand back the populated template unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct InPlace;

impl TemplateStrategy for InPlace {
    fn name(&self) -> &'static str {
        "in_place"
    }

    fn finish(&self, populated: Workbook, ctx: &StrategyContext<'_>) -> Result<Workbook> {
        log::debug!(
            "in-place: keeping template layout of {} sheet(s), {} data row(s)",
            populated.sheet_count(),
            ctx.record_count
        );
        Ok(populated)
    }
}
