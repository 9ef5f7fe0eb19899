//! XLSX writer
//!
//! Every part is stamped with the same modification time and parts are
//! written in a fixed order, so a workbook always serializes to the same bytes.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{escape_xml_attr, XlsxStyleTable};
use stencil_core::validation::ValidationType;
use stencil_core::{CellAddress, CellValue, Column, DataValidation, Workbook, Worksheet};

/// Row height written to `sheetFormatPr` when the sheet has none
const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Serialize a workbook into an in-memory package
    pub fn to_bytes(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        Self::write(workbook, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "Cannot write a workbook without worksheets".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);
        let style_table = XlsxStyleTable::build(workbook);

        Self::write_part(&mut zip, "[Content_Types].xml", &Self::content_types(workbook))?;
        Self::write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        Self::write_part(&mut zip, "xl/workbook.xml", &Self::workbook_xml(workbook))?;
        Self::write_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &Self::workbook_rels(workbook),
        )?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_styles_xml())?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let xml = Self::worksheet_xml(sheet, i, i == workbook.active_sheet(), &style_table);
            Self::write_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), &xml)?;
        }

        zip.finish()?;

        log::debug!(
            "wrote workbook: {} sheet(s), {} cell format(s)",
            workbook.sheet_count(),
            style_table.len()
        );
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn content_types(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        content
    }

    fn workbook_xml(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        content.push_str(&format!(
            "\n    <bookViews>\n        <workbookView activeTab=\"{}\"/>\n    </bookViews>\n    <sheets>",
            workbook.active_sheet()
        ));

        for (i, sheet) in workbook.worksheets().enumerate() {
            let state = if sheet.is_visible() {
                ""
            } else {
                " state=\"hidden\""
            };
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                escape_xml_attr(sheet.name()),
                i + 1,
                state,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>");

        let names = workbook.defined_names();
        if !names.is_empty() {
            content.push_str("\n    <definedNames>");
            for name in names {
                let local = name
                    .local_sheet
                    .map_or(String::new(), |s| format!(" localSheetId=\"{}\"", s));
                let hidden = if name.hidden { " hidden=\"1\"" } else { "" };
                content.push_str(&format!(
                    "\n        <definedName name=\"{}\"{}{}>{}</definedName>",
                    escape_xml_attr(&name.name),
                    local,
                    hidden,
                    escape_xml_attr(&name.refers_to)
                ));
            }
            content.push_str("\n    </definedNames>");
        }

        content.push_str("\n</workbook>");
        content
    }

    fn workbook_rels(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            workbook.sheet_count() + 1
        ));

        content.push_str("\n</Relationships>");
        content
    }

    fn worksheet_xml(
        sheet: &Worksheet,
        index: usize,
        selected: bool,
        style_table: &XlsxStyleTable,
    ) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        let dimension = sheet
            .used_range()
            .map_or_else(|| "A1".to_string(), |r| r.to_string());
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));

        Self::write_sheet_view(&mut content, sheet, selected);

        let col_width = sheet
            .default_column_width()
            .map_or(String::new(), |w| format!(" defaultColWidth=\"{}\"", w));
        content.push_str(&format!(
            "\n    <sheetFormatPr{} defaultRowHeight=\"{}\"/>",
            col_width,
            sheet.default_row_height().unwrap_or(DEFAULT_ROW_HEIGHT)
        ));

        Self::write_cols(&mut content, sheet, index, style_table);
        Self::write_sheet_data(&mut content, sheet, index, style_table);

        if let Some(filter) = sheet.auto_filter() {
            content.push_str(&format!("\n    <autoFilter ref=\"{}\"/>", filter.range));
        }

        let merged_regions = sheet.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        Self::write_data_validations(&mut content, sheet);

        content.push_str("\n</worksheet>");
        content
    }

    fn write_sheet_view(content: &mut String, sheet: &Worksheet, selected: bool) {
        let tab_selected = if selected { " tabSelected=\"1\"" } else { "" };
        let Some(panes) = sheet.freeze_panes().filter(|p| p.row > 0 || p.col > 0) else {
            content.push_str(&format!(
                "\n    <sheetViews>\n        <sheetView{} workbookViewId=\"0\"/>\n    </sheetViews>",
                tab_selected
            ));
            return;
        };

        let active_pane = match (panes.row > 0, panes.col > 0) {
            (true, true) => "bottomRight",
            (true, false) => "bottomLeft",
            _ => "topRight",
        };
        let x_split = if panes.col > 0 {
            format!(" xSplit=\"{}\"", panes.col)
        } else {
            String::new()
        };
        let y_split = if panes.row > 0 {
            format!(" ySplit=\"{}\"", panes.row)
        } else {
            String::new()
        };

        content.push_str(&format!(
            "\n    <sheetViews>\n        <sheetView{} workbookViewId=\"0\">\n            <pane{}{} topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/>\n        </sheetView>\n    </sheetViews>",
            tab_selected,
            x_split,
            y_split,
            CellAddress::new(panes.row, panes.col),
            active_pane
        ));
    }

    /// Consecutive columns with identical settings share one `<col>` element
    fn write_cols(
        content: &mut String,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
    ) {
        let xf_of = |c: &Column| c.style_index.map(|s| style_table.xf_id_for(index, s));

        let mut groups: Vec<(u16, u16, &Column)> = Vec::new();
        for column in sheet.columns() {
            match groups.last_mut() {
                Some((_, max, first))
                    if *max + 1 == column.index
                        && first.width == column.width
                        && first.hidden == column.hidden
                        && xf_of(*first) == xf_of(column) =>
                {
                    *max = column.index;
                }
                _ => groups.push((column.index, column.index, column)),
            }
        }

        if groups.is_empty() {
            return;
        }

        content.push_str("\n    <cols>");
        for (min, max, column) in groups {
            let width = column
                .width
                .map_or(String::new(), |w| format!(" width=\"{}\" customWidth=\"1\"", w));
            let hidden = if column.hidden { " hidden=\"1\"" } else { "" };
            let style = xf_of(column)
                .filter(|&xf| xf != 0)
                .map_or(String::new(), |xf| format!(" style=\"{}\"", xf));
            content.push_str(&format!(
                "\n        <col min=\"{}\" max=\"{}\"{}{}{}/>",
                min + 1,
                max + 1,
                width,
                style,
                hidden
            ));
        }
        content.push_str("\n    </cols>");
    }

    fn write_sheet_data(
        content: &mut String,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
    ) {
        let rows: BTreeSet<u32> = sheet
            .iter_cells()
            .map(|(row, _, _)| row)
            .chain(sheet.rows_with_info().map(|r| r.index))
            .collect();

        if rows.is_empty() {
            content.push_str("\n    <sheetData/>");
            return;
        }

        content.push_str("\n    <sheetData>");
        for row in rows {
            let height = sheet
                .row_height(row)
                .map_or(String::new(), |h| format!(" ht=\"{}\" customHeight=\"1\"", h));
            let hidden = if sheet.is_row_hidden(row) {
                " hidden=\"1\""
            } else {
                ""
            };

            let mut cells = String::new();
            for (col, cell) in sheet.row_cells(row) {
                let xf_id = style_table.xf_id_for(index, cell.style_index);
                Self::write_cell(&mut cells, CellAddress::new(row, col), xf_id, &cell.value);
            }

            if cells.is_empty() {
                content.push_str(&format!(
                    "\n        <row r=\"{}\"{}{}/>",
                    row + 1,
                    height,
                    hidden
                ));
            } else {
                content.push_str(&format!(
                    "\n        <row r=\"{}\"{}{}>{}\n        </row>",
                    row + 1,
                    height,
                    hidden,
                    cells
                ));
            }
        }
        content.push_str("\n    </sheetData>");
    }

    fn write_cell(content: &mut String, addr: CellAddress, xf_id: u32, value: &CellValue) {
        let style_attr = if xf_id != 0 {
            format!(" s=\"{}\"", xf_id)
        } else {
            String::new()
        };

        match value {
            CellValue::Empty => {
                if xf_id != 0 {
                    content.push_str(&format!("\n            <c r=\"{}\"{}/>", addr, style_attr));
                }
            }
            CellValue::Number(n) if !n.is_finite() => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>",
                    addr, style_attr
                ));
            }
            CellValue::Number(n) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{}><v>{}</v></c>",
                    addr, style_attr, n
                ));
            }
            CellValue::String(s) => {
                let space = if needs_space_preserve(s) {
                    " xml:space=\"preserve\""
                } else {
                    ""
                };
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t{}>{}</t></is></c>",
                    addr,
                    style_attr,
                    space,
                    Self::escape_xml(&encode_excel_escapes(s))
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    addr,
                    style_attr,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Error(e) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                    addr,
                    style_attr,
                    Self::escape_xml(e)
                ));
            }
            CellValue::Formula { text, cached_value } => {
                let formula = text.strip_prefix('=').unwrap_or(text);
                let (type_attr, cached) = match cached_value.as_deref() {
                    Some(CellValue::Number(n)) if n.is_finite() => ("", format!("<v>{}</v>", n)),
                    Some(CellValue::String(s)) => (
                        " t=\"str\"",
                        format!("<v>{}</v>", Self::escape_xml(&encode_excel_escapes(s))),
                    ),
                    Some(CellValue::Boolean(b)) => {
                        (" t=\"b\"", format!("<v>{}</v>", if *b { 1 } else { 0 }))
                    }
                    Some(CellValue::Error(e)) => {
                        (" t=\"e\"", format!("<v>{}</v>", Self::escape_xml(e)))
                    }
                    _ => ("", String::new()),
                };
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{}{}><f>{}</f>{}</c>",
                    addr,
                    style_attr,
                    type_attr,
                    Self::escape_xml(formula),
                    cached
                ));
            }
        }
    }

    fn write_data_validations(content: &mut String, sheet: &Worksheet) {
        let validations: Vec<&DataValidation> = sheet
            .data_validations()
            .iter()
            .filter(|v| !v.ranges.is_empty())
            .collect();
        if validations.is_empty() {
            return;
        }

        content.push_str(&format!(
            "\n    <dataValidations count=\"{}\">",
            validations.len()
        ));

        for validation in validations {
            let type_attr = match &validation.validation_type {
                ValidationType::None => String::new(),
                other => format!(" type=\"{}\"", other.xlsx_type()),
            };
            let operator_attr = match &validation.validation_type {
                ValidationType::Compare { operator, .. } => {
                    format!(" operator=\"{}\"", operator.as_xlsx())
                }
                _ => String::new(),
            };

            let flag = |on: bool, attr: &str| if on { attr.to_string() } else { String::new() };
            let text_attr = |name: &str, value: &Option<String>| {
                value.as_ref().map_or(String::new(), |v| {
                    format!(" {}=\"{}\"", name, Self::escape_xml(v))
                })
            };

            let error_style = match validation.error_style.as_xlsx() {
                "stop" => String::new(),
                style => format!(" errorStyle=\"{}\"", style),
            };

            content.push_str(&format!(
                "\n        <dataValidation{}{}{}{}{}{}{}{}{}{}{} sqref=\"{}\">",
                type_attr,
                error_style,
                operator_attr,
                flag(validation.allow_blank, " allowBlank=\"1\""),
                flag(validation.hide_dropdown, " showDropDown=\"1\""),
                flag(validation.show_input_message, " showInputMessage=\"1\""),
                flag(validation.show_error_alert, " showErrorMessage=\"1\""),
                text_attr("errorTitle", &validation.error_title),
                text_attr("error", &validation.error_message),
                text_attr("promptTitle", &validation.input_title),
                text_attr("prompt", &validation.input_message),
                validation.sqref()
            ));

            let (formula1, formula2) = match &validation.validation_type {
                ValidationType::None => (None, None),
                ValidationType::List { source } => (Some(source.as_str()), None),
                ValidationType::Custom { formula } => (Some(formula.as_str()), None),
                ValidationType::Compare { value1, value2, .. } => {
                    (Some(value1.as_str()), value2.as_deref())
                }
            };
            if let Some(f) = formula1 {
                content.push_str(&format!("<formula1>{}</formula1>", Self::escape_xml(f)));
            }
            if let Some(f) = formula2 {
                content.push_str(&format!("<formula2>{}</formula2>", Self::escape_xml(f)));
            }

            content.push_str("</dataValidation>");
        }

        content.push_str("\n    </dataValidations>");
    }

    fn escape_xml(s: &str) -> String {
        escape_xml_attr(s)
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) || s.contains('\n')
}

/// Encode characters XML 1.0 cannot carry as `_xHHHH_`, and protect literal
/// `_xHHHH_` text by escaping its underscore.
fn encode_excel_escapes(s: &str) -> String {
    let needs_work = s.contains("_x")
        || s
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'));
    if !needs_work {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 8);
    for (i, c) in s.char_indices() {
        match c {
            '_' if looks_like_escape(&s[i..]) => out.push_str("_x005F_"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {
                out.push_str(&format!("_x{:04X}_", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn looks_like_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[0] == b'_'
        && b[1] == b'x'
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}
