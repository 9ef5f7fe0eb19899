use std::collections::BTreeMap;

use stencil_core::{CellRange, DataValidation, Style, Workbook, Worksheet};

use super::{StrategyContext, TemplateStrategy};
use crate::config::{ColumnStyleRule, ValidationTable};
use crate::error::{ExportError, Result};

/// Rebuild the workbook from an allow-list and re-apply the configured tables
///
/// Copied: sheet names and order, column widths, cell values (formulas stay
/// formulas). Applied: bold + fill on header cells of styled columns, fill on
/// data cells when the rule says so, and one list validation per configured
/// column over the data rows of the data sheet. Nothing else survives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstruct;

impl TemplateStrategy for Reconstruct {
    fn name(&self) -> &'static str {
        "reconstruct"
    }

    fn finish(&self, populated: Workbook, ctx: &StrategyContext<'_>) -> Result<Workbook> {
        let mut rebuilt = Workbook::empty();
        for source in populated.worksheets() {
            let index = rebuilt.add_worksheet_with_name(source.name())?;
            if let Some(target) = rebuilt.worksheet_mut(index) {
                copy_sheet(source, target)?;
            }
        }

        for (sheet_name, columns) in &ctx.config.styles {
            match rebuilt.worksheet_by_name_mut(sheet_name) {
                Some(sheet) => apply_styles(sheet, columns, ctx.record_count)?,
                None => log::warn!("style rules name sheet '{}', which the template lacks", sheet_name),
            }
        }

        let data_sheet = ctx.data_sheet();
        let sheet = rebuilt
            .worksheet_by_name_mut(data_sheet)
            .ok_or_else(|| ExportError::SheetNotFound {
                missing: vec![data_sheet.to_string()],
            })?;
        apply_validations(sheet, &ctx.config.validations, ctx.record_count);

        log::debug!(
            "reconstruct: rebuilt {} sheet(s), {} style rule sheet(s), {} validation(s)",
            rebuilt.sheet_count(),
            ctx.config.styles.len(),
            ctx.config.validations.len()
        );
        Ok(rebuilt)
    }
}

fn copy_sheet(source: &Worksheet, target: &mut Worksheet) -> Result<()> {
    for column in source.columns() {
        if let Some(width) = column.width {
            target.set_column_width(column.index, width);
        }
    }
    for (row, col, cell) in source.iter_cells() {
        if !cell.value.is_empty() {
            target.set_cell_value_at(row, col, cell.value.clone())?;
        }
    }
    Ok(())
}

fn apply_styles(
    sheet: &mut Worksheet,
    columns: &BTreeMap<u16, ColumnStyleRule>,
    record_count: usize,
) -> Result<()> {
    for (&col, rule) in columns {
        let Some(col_idx) = col.checked_sub(1) else {
            continue;
        };
        let fill = rule.fill_color()?;

        sheet.set_cell_style_at(0, col_idx, &Style::new().bold(true).fill_color(fill))?;

        if rule.data {
            let data_style = Style::new().fill_color(fill);
            for row in 1..=record_count as u32 {
                sheet.set_cell_style_at(row, col_idx, &data_style)?;
            }
        }
    }
    Ok(())
}

fn apply_validations(sheet: &mut Worksheet, rules: &ValidationTable, record_count: usize) {
    if record_count == 0 {
        return;
    }
    let last_row = record_count as u32;
    for (&col, formula) in rules {
        let Some(col_idx) = col.checked_sub(1) else {
            continue;
        };
        sheet.add_data_validation(
            DataValidation::list(formula.as_str())
                .with_range(CellRange::column_span(col_idx, 1, last_row)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use pretty_assertions::assert_eq;
    use stencil_core::{AutoFilter, CellValue, Color, ValidationType};

    fn populated() -> Workbook {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Data").unwrap();
        wb.add_worksheet_with_name("MASTER Data").unwrap();

        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("A1", "Name").unwrap();
        ws.set_cell_value("B1", "Status").unwrap();
        ws.set_cell_value("A2", "A").unwrap();
        ws.set_cell_value("B2", 0.0).unwrap();
        ws.set_cell_value("A3", "B").unwrap();
        ws.set_cell_value("C3", CellValue::formula("LEN(A3)")).unwrap();
        ws.set_cell_style("A2", &Style::new().bold(true)).unwrap();
        ws.set_column_width(0, 30.0);
        ws.set_row_height(0, 40.0);
        ws.set_freeze_panes(1, 0);
        ws.set_auto_filter(Some(AutoFilter::new(CellRange::parse("A1:B3").unwrap())));
        ws.merge_cells(&CellRange::parse("E1:F1").unwrap()).unwrap();
        ws.add_data_validation(
            DataValidation::list("$X$1:$X$2").with_range(CellRange::parse("D2:D3").unwrap()),
        );

        wb.worksheet_mut(1)
            .unwrap()
            .set_cell_value("B2", "Open")
            .unwrap();
        wb
    }

    fn config() -> ExportConfig {
        let mut config = ExportConfig {
            data_sheet: "Data".into(),
            ..ExportConfig::default()
        };
        config.styles.clear();
        config
            .styles
            .entry("Data".into())
            .or_default()
            .insert(2, ColumnStyleRule::new("#FFFF00", true));
        config
            .styles
            .entry("Data".into())
            .or_default()
            .insert(1, ColumnStyleRule::new("92D050", false));
        config.validations.clear();
        config.validations.insert(2, "'MASTER Data'!$B$2:$B$93".into());
        config
    }

    #[test]
    fn test_copies_allow_list_only() {
        let config = config();
        let out = Reconstruct
            .finish(populated(), &StrategyContext::new(&config, 2))
            .unwrap();

        assert_eq!(out.sheet_names().collect::<Vec<_>>(), vec!["Data", "MASTER Data"]);
        let ws = out.worksheet(0).unwrap();

        assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("A"));
        assert_eq!(ws.get_value("B2").unwrap(), CellValue::Number(0.0));
        assert_eq!(ws.get_value("C3").unwrap().formula_text(), Some("=LEN(A3)"));
        assert_eq!(ws.column_width(0), Some(30.0));
        assert_eq!(
            out.worksheet(1).unwrap().get_value("B2").unwrap(),
            CellValue::string("Open")
        );

        // Not on the allow-list
        assert!(ws.auto_filter().is_none());
        assert!(ws.merged_regions().is_empty());
        assert!(ws.freeze_panes().is_none());
        assert_eq!(ws.row_height(0), None);
        assert_eq!(ws.cell_style_at(1, 0).map(|s| s.font.bold), Some(false));
    }

    #[test]
    fn test_style_rules_applied() {
        let config = config();
        let out = Reconstruct
            .finish(populated(), &StrategyContext::new(&config, 2))
            .unwrap();
        let ws = out.worksheet(0).unwrap();

        let header = ws.cell_style_at(0, 1).unwrap();
        assert!(header.font.bold);
        assert_eq!(header.fill.solid_color(), Some(Color::YELLOW));

        // data = true fills rows 2..=N+1 only
        assert_eq!(ws.cell_style_at(1, 1).unwrap().fill.solid_color(), Some(Color::YELLOW));
        assert_eq!(ws.cell_style_at(2, 1).unwrap().fill.solid_color(), Some(Color::YELLOW));
        assert!(ws.cell_at(3, 1).is_none());
        assert!(!ws.cell_style_at(1, 1).unwrap().font.bold);

        // data = false leaves data cells alone
        assert!(ws.cell_style_at(0, 0).unwrap().font.bold);
        assert_eq!(ws.cell_style_at(2, 0).map(|s| s.is_default()), Some(true));
    }

    #[test]
    fn test_validation_covers_data_rows_only() {
        let config = config();
        let out = Reconstruct
            .finish(populated(), &StrategyContext::new(&config, 2))
            .unwrap();
        let ws = out.worksheet(0).unwrap();

        assert_eq!(ws.data_validations().len(), 1);
        let dv = &ws.data_validations()[0];
        assert_eq!(
            dv.validation_type,
            ValidationType::List {
                source: "'MASTER Data'!$B$2:$B$93".into()
            }
        );
        assert_eq!(dv.sqref(), "B2:B3");
        assert!(ws.data_validation_at(0, 1).is_none());
        assert!(ws.data_validation_at(1, 1).is_some());
        assert!(ws.data_validation_at(2, 1).is_some());
        assert!(ws.data_validation_at(3, 1).is_none());
        // The template's own validation on column D is not carried
        assert!(ws.data_validation_at(1, 3).is_none());
    }

    #[test]
    fn test_style_rules_for_absent_sheet_skipped() {
        let mut config = config();
        config
            .styles
            .entry("Elsewhere".into())
            .or_default()
            .insert(1, ColumnStyleRule::new("#000000", false));

        let out = Reconstruct
            .finish(populated(), &StrategyContext::new(&config, 2))
            .unwrap();
        assert_eq!(out.sheet_count(), 2);
    }
}
