//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr_value, read_styles_xml};
use stencil_core::style::Style;
use stencil_core::validation::{
    CompareKind, DataValidation, ValidationErrorStyle, ValidationOperator, ValidationType,
};
use stencil_core::{
    AutoFilter, CellAddress, CellRange, CellValue, DefinedName, Workbook, Worksheet, MAX_COLS,
};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this form for characters XML cannot carry directly:
/// - `_x000d_` = CR
/// - `_x000a_` = LF
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[derive(Debug)]
struct SheetEntry {
    name: String,
    r_id: String,
    hidden: bool,
}

#[derive(Debug)]
struct RawDefinedName {
    name: String,
    refers_to: String,
    local_sheet: Option<usize>,
    hidden: bool,
}

#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    defined_names: Vec<RawDefinedName>,
    active_tab: usize,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for entry in &info.sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!(
                    "sheet '{}' has no worksheet relationship ({}), skipped",
                    entry.name,
                    entry.r_id
                );
                continue;
            };

            let mut sheet = Worksheet::new(entry.name.as_str());
            sheet.set_visible(!entry.hidden);
            Self::read_worksheet(&mut archive, path, &mut sheet, &shared_strings, &cell_styles)?;
            workbook.add_existing_worksheet(sheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("Workbook has no worksheets".into()));
        }

        for raw in info.defined_names {
            let name = DefinedName::new(raw.name.as_str(), raw.refers_to).map(|mut name| {
                name.local_sheet = raw.local_sheet;
                name.hidden = raw.hidden;
                name
            });
            match name.and_then(|name| workbook.add_defined_name(name)) {
                Ok(()) => {}
                Err(e) => log::warn!("defined name '{}' dropped: {}", raw.name, e),
            }
        }

        if info.active_tab < workbook.sheet_count() {
            workbook.set_active_sheet(info.active_tab)?;
        }

        log::debug!(
            "read workbook: {} sheet(s), {} shared string(s), {} cell style(s)",
            workbook.sheet_count(),
            shared_strings.len(),
            cell_styles.len()
        );

        Ok(workbook)
    }

    /// Read the shared strings table; rich text runs are concatenated
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![Style::default()]),
        }
    }

    /// Read workbook.xml: sheet list, defined names and the active tab
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();
        let mut pending_name: Option<RawDefinedName> = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attr_value(&e, b"name");
                    let r_id = attr_value(&e, b"r:id");
                    let hidden = attr_value(&e, b"state").is_some_and(|s| s != "visible");

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        info.sheets.push(SheetEntry { name, r_id, hidden });
                    }
                }
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"workbookView" =>
                {
                    info.active_tab = attr_value(&e, b"activeTab")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                }
                Ok(Event::Start(e)) if e.name().as_ref() == b"definedName" => {
                    pending_name = attr_value(&e, b"name").map(|name| RawDefinedName {
                        name,
                        refers_to: String::new(),
                        local_sheet: attr_value(&e, b"localSheetId").and_then(|v| v.parse().ok()),
                        hidden: attr_value(&e, b"hidden").is_some_and(|v| is_true(&v)),
                    });
                }
                Ok(Event::Text(e)) => {
                    if let Some(name) = pending_name.as_mut() {
                        name.refers_to.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::End(e)) if e.name().as_ref() == b"definedName" => {
                    if let Some(name) = pending_name.take() {
                        info.defined_names.push(name);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels: worksheet relationship id -> part path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut parser = SheetParser::new(worksheet, shared_strings, cell_styles);

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => parser.start(&e)?,
                Ok(Event::Empty(e)) => {
                    parser.start(&e)?;
                    parser.end(e.name().as_ref())?;
                }
                Ok(Event::End(e)) => parser.end(e.name().as_ref())?,
                Ok(Event::Text(e)) => parser.text(&e.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }
}

/// Where character data inside a worksheet part is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    InlineText,
    DvFormula1,
    DvFormula2,
    DvSqref,
}

#[derive(Debug, Default)]
struct PendingCell {
    row: u32,
    col: u16,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
}

#[derive(Debug)]
struct PendingValidation {
    validation: DataValidation,
    dv_type: Option<String>,
    operator: Option<String>,
    formula1: Option<String>,
    formula2: Option<String>,
    /// `xm:sqref` text of an extension-list validation
    sqref: Option<String>,
}

/// Event-driven worksheet part parser; `Empty` events are fed as start + end
struct SheetParser<'a> {
    sheet: &'a mut Worksheet,
    shared_strings: &'a [String],
    cell_styles: &'a [Style],
    target: TextTarget,
    current_row: Option<u32>,
    next_col: u16,
    cell: Option<PendingCell>,
    in_inline_str: bool,
    in_phonetic: bool,
    validation: Option<PendingValidation>,
    /// Slot an `xm:f` inside `x14:formula1`/`x14:formula2` fills
    ext_formula: TextTarget,
}

impl<'a> SheetParser<'a> {
    fn new(sheet: &'a mut Worksheet, shared_strings: &'a [String], cell_styles: &'a [Style]) -> Self {
        Self {
            sheet,
            shared_strings,
            cell_styles,
            target: TextTarget::None,
            current_row: None,
            next_col: 0,
            cell: None,
            in_inline_str: false,
            in_phonetic: false,
            validation: None,
            ext_formula: TextTarget::None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        match e.name().as_ref() {
            b"sheetFormatPr" => {
                let width = attr_value(e, b"defaultColWidth").and_then(|v| v.parse().ok());
                let height = attr_value(e, b"defaultRowHeight").and_then(|v| v.parse().ok());
                self.sheet.set_default_column_width(width);
                self.sheet.set_default_row_height(height);
            }
            b"pane" => {
                let frozen = attr_value(e, b"state")
                    .is_some_and(|s| s == "frozen" || s == "frozenSplit");
                if frozen {
                    let split = |key: &[u8]| {
                        attr_value(e, key)
                            .and_then(|v| v.parse::<f64>().ok())
                            .unwrap_or(0.0)
                    };
                    self.sheet
                        .set_freeze_panes(split(b"ySplit") as u32, split(b"xSplit") as u16);
                }
            }
            b"col" => self.read_col(e)?,
            b"row" => self.read_row(e),
            b"c" => {
                let (row, col) = match attr_value(e, b"r") {
                    Some(r) => {
                        let addr = CellAddress::parse(&r).map_err(|err| {
                            XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
                        })?;
                        (addr.row, addr.col)
                    }
                    None => (self.current_row.unwrap_or(0), self.next_col),
                };
                self.next_col = col.saturating_add(1);
                self.cell = Some(PendingCell {
                    row,
                    col,
                    cell_type: attr_value(e, b"t"),
                    style: attr_value(e, b"s").and_then(|v| v.parse().ok()),
                    ..PendingCell::default()
                });
            }
            b"v" if self.cell.is_some() => self.target = TextTarget::Value,
            b"f" if self.cell.is_some() => self.target = TextTarget::Formula,
            b"is" if self.cell.is_some() => self.in_inline_str = true,
            b"rPh" if self.in_inline_str => self.in_phonetic = true,
            b"t" if self.in_inline_str && !self.in_phonetic => {
                self.target = TextTarget::InlineText;
                if let Some(cell) = self.cell.as_mut() {
                    cell.cell_type = Some("inlineStr".to_string());
                    cell.value.get_or_insert_with(String::new);
                }
            }
            b"autoFilter" => {
                if let Some(range) = attr_value(e, b"ref").and_then(|r| CellRange::parse(&r).ok()) {
                    self.sheet.set_auto_filter(Some(AutoFilter::new(range)));
                }
            }
            b"mergeCell" => {
                if let Some(range) = attr_value(e, b"ref").and_then(|r| CellRange::parse(&r).ok()) {
                    if let Err(err) = self.sheet.merge_cells(&range) {
                        log::warn!("sheet '{}': {}", self.sheet.name(), err);
                    }
                }
            }
            b"dataValidation" => self.validation = Some(parse_data_validation_attrs(e)),
            b"formula1" if self.validation.is_some() => self.target = TextTarget::DvFormula1,
            b"formula2" if self.validation.is_some() => self.target = TextTarget::DvFormula2,
            // Dropdowns sourced from another sheet are saved in the extension list
            b"x14:dataValidation" => self.validation = Some(parse_data_validation_attrs(e)),
            b"x14:formula1" if self.validation.is_some() => {
                self.ext_formula = TextTarget::DvFormula1
            }
            b"x14:formula2" if self.validation.is_some() => {
                self.ext_formula = TextTarget::DvFormula2
            }
            b"xm:f" if self.validation.is_some() => self.target = self.ext_formula,
            b"xm:sqref" if self.validation.is_some() => self.target = TextTarget::DvSqref,
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> XlsxResult<()> {
        match name {
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.process_cell(cell)?;
                }
                self.target = TextTarget::None;
            }
            b"v" | b"f" | b"formula1" | b"formula2" | b"xm:f" | b"xm:sqref" => {
                self.target = TextTarget::None
            }
            b"x14:formula1" | b"x14:formula2" => self.ext_formula = TextTarget::None,
            b"t" if self.target == TextTarget::InlineText => self.target = TextTarget::None,
            b"rPh" => self.in_phonetic = false,
            b"is" => self.in_inline_str = false,
            b"dataValidation" => {
                if let Some(pending) = self.validation.take() {
                    self.sheet.add_data_validation(finish_validation(pending));
                }
            }
            b"x14:dataValidation" => {
                if let Some(mut pending) = self.validation.take() {
                    pending.validation.ranges = pending
                        .sqref
                        .take()
                        .unwrap_or_default()
                        .split_whitespace()
                        .filter_map(|r| CellRange::parse(r).ok())
                        .collect();
                    if pending.validation.ranges.is_empty() {
                        log::warn!(
                            "sheet '{}': skipping extension data validation without a usable sqref",
                            self.sheet.name()
                        );
                    } else {
                        self.sheet.add_data_validation(finish_validation(pending));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let slot = match self.target {
            TextTarget::None => return,
            TextTarget::Value => self.cell.as_mut().map(|c| &mut c.value),
            TextTarget::Formula => self.cell.as_mut().map(|c| &mut c.formula),
            TextTarget::InlineText => self.cell.as_mut().map(|c| &mut c.value),
            TextTarget::DvFormula1 => self.validation.as_mut().map(|v| &mut v.formula1),
            TextTarget::DvFormula2 => self.validation.as_mut().map(|v| &mut v.formula2),
            TextTarget::DvSqref => self.validation.as_mut().map(|v| &mut v.sqref),
        };
        if let Some(slot) = slot {
            slot.get_or_insert_with(String::new).push_str(text);
        }
    }

    fn read_row(&mut self, e: &BytesStart<'_>) {
        let row_idx = attr_value(e, b"r")
            .and_then(|v| v.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
            .unwrap_or_else(|| self.current_row.map_or(0, |r| r + 1));
        self.current_row = Some(row_idx);
        self.next_col = 0;

        let custom_height = attr_value(e, b"customHeight").is_some_and(|v| is_true(&v));
        if custom_height {
            if let Some(height) = attr_value(e, b"ht").and_then(|v| v.parse::<f64>().ok()) {
                self.sheet.set_row_height(row_idx, height);
            }
        }
        if attr_value(e, b"hidden").is_some_and(|v| is_true(&v)) {
            self.sheet.set_row_hidden(row_idx, true);
        }
    }

    fn read_col(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        let bound = |key: &[u8]| attr_value(e, key).and_then(|v| v.parse::<u16>().ok());
        let (Some(min), Some(max)) = (bound(b"min"), bound(b"max")) else {
            return Ok(());
        };
        let width = attr_value(e, b"width").and_then(|v| v.parse::<f64>().ok());
        let hidden = attr_value(e, b"hidden").is_some_and(|v| is_true(&v));
        let style = match attr_value(e, b"style").and_then(|v| v.parse::<usize>().ok()) {
            Some(0) | None => None,
            Some(idx) => Some(self.style_at(idx)?.clone()),
        };

        // min/max are 1-based and inclusive
        for col in min.max(1)..=max.min(MAX_COLS) {
            let col_idx = col - 1;
            if let Some(w) = width {
                self.sheet.set_column_width(col_idx, w);
            }
            if hidden {
                self.sheet.set_column_hidden(col_idx, true);
            }
            if let Some(style) = &style {
                self.sheet.set_column_style(col_idx, style);
            }
        }
        Ok(())
    }

    fn style_at(&self, idx: usize) -> XlsxResult<&Style> {
        self.cell_styles
            .get(idx)
            .ok_or_else(|| XlsxError::Parse(format!("Style index {} out of bounds", idx)))
    }

    fn process_cell(&mut self, cell: PendingCell) -> XlsxResult<()> {
        let PendingCell {
            row,
            col,
            cell_type,
            style,
            value,
            formula,
        } = cell;
        let cell_type = cell_type.as_deref();

        let parsed = match (formula.filter(|f| !f.is_empty()), value) {
            (Some(f), value) => {
                let cached = match value {
                    Some(v) => Some(self.typed_value(cell_type, &v)?),
                    None => None,
                };
                Some(CellValue::Formula {
                    text: if f.starts_with('=') { f } else { format!("={}", f) },
                    cached_value: cached.map(Box::new),
                })
            }
            (None, Some(v)) => Some(self.typed_value(cell_type, &v)?),
            (None, None) => None,
        };

        if let Some(value) = parsed {
            self.sheet.set_cell_value_at(row, col, value)?;
        }

        if let Some(s) = style.filter(|&s| s != 0) {
            let style = self.style_at(s as usize)?.clone();
            self.sheet.set_cell_style_at(row, col, &style)?;
        }

        Ok(())
    }

    fn typed_value(&self, cell_type: Option<&str>, value: &str) -> XlsxResult<CellValue> {
        Ok(match cell_type {
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = self.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => CellValue::Boolean(is_true(value.trim())),
            Some("e") => CellValue::Error(value.to_string()),
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(value)),
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },
            Some(other) => {
                log::warn!(
                    "sheet '{}': unknown cell type '{}', read as text",
                    self.sheet.name(),
                    other
                );
                CellValue::String(value.to_string())
            }
        })
    }
}

fn parse_data_validation_attrs(e: &BytesStart<'_>) -> PendingValidation {
    let mut validation = DataValidation::default();
    let mut dv_type = None;
    let mut operator = None;

    for attr in e.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"type" => dv_type = Some(value.into_owned()),
            b"operator" => operator = Some(value.into_owned()),
            b"allowBlank" => validation.allow_blank = is_true(&value),
            // showDropDown="1" hides the in-cell arrow
            b"showDropDown" => validation.hide_dropdown = is_true(&value),
            b"showInputMessage" => validation.show_input_message = is_true(&value),
            b"showErrorMessage" => validation.show_error_alert = is_true(&value),
            b"errorStyle" => validation.error_style = ValidationErrorStyle::from_xlsx(&value),
            b"errorTitle" => validation.error_title = Some(value.into_owned()),
            b"error" => validation.error_message = Some(value.into_owned()),
            b"promptTitle" => validation.input_title = Some(value.into_owned()),
            b"prompt" => validation.input_message = Some(value.into_owned()),
            b"sqref" => {
                validation.ranges = value
                    .split_whitespace()
                    .filter_map(|r| CellRange::parse(r).ok())
                    .collect();
            }
            _ => {}
        }
    }

    // Attributes absent from the element take their schema defaults
    if !e.attributes().flatten().any(|a| a.key.as_ref() == b"allowBlank") {
        validation.allow_blank = false;
    }
    if !e
        .attributes()
        .flatten()
        .any(|a| a.key.as_ref() == b"showErrorMessage")
    {
        validation.show_error_alert = false;
    }

    PendingValidation {
        validation,
        dv_type,
        operator,
        formula1: None,
        formula2: None,
        sqref: None,
    }
}

fn finish_validation(pending: PendingValidation) -> DataValidation {
    let PendingValidation {
        mut validation,
        dv_type,
        operator,
        formula1,
        formula2,
        ..
    } = pending;
    let formula1 = formula1.unwrap_or_default();

    validation.validation_type = match dv_type.as_deref() {
        Some("list") => ValidationType::List { source: formula1 },
        Some("custom") => ValidationType::Custom { formula: formula1 },
        Some(kind) => match CompareKind::from_xlsx(kind) {
            Some(kind) => ValidationType::Compare {
                kind,
                operator: operator
                    .as_deref()
                    .map_or(ValidationOperator::Between, ValidationOperator::from_xlsx),
                value1: formula1,
                value2: formula2,
            },
            None => ValidationType::None,
        },
        None => ValidationType::None,
    };
    validation
}
