//! Shared template builders and instrumented collaborators

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stencil::{
    ExportConfig, Result, TemplateBytes, TemplateSource, Workbook, WorkbookEncoder, XlsxEncoder,
    XlsxWriter,
};
use stencil_core::{
    AutoFilter, CellRange, Color, DataValidation, DefinedName, HorizontalAlignment, Style,
};

pub const DATA_SHEET: &str = "Forecast Failure-Template(New)";
pub const LOOKUP_SHEET: &str = "MASTER Data";
pub const LOOKUP_RANGE: &str = "'MASTER Data'!$B$2:$B$93";

/// Header labels of the forecast template; column 21 (U) is the dropdown
pub const FORECAST_HEADERS: [&str; 21] = [
    "Region",
    "Country",
    "Site",
    "Part Number",
    "Description",
    "Forecast Qty",
    "Actual Qty",
    "Variance",
    "Week",
    "Month",
    "Quarter",
    "Owner",
    "Planner",
    "Customer",
    "Segment",
    "Root Cause",
    "Comments",
    "Action",
    "Due Date",
    "Status",
    "Failure Category",
];

pub fn header_style() -> Style {
    Style::new()
        .bold(true)
        .fill_color(Color::rgb(146, 208, 80))
        .horizontal_alignment(HorizontalAlignment::Center)
        .wrap_text(true)
}

/// The forecast template as a model workbook
pub fn forecast_workbook() -> Workbook {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name(DATA_SHEET).unwrap();
    wb.add_worksheet_with_name(LOOKUP_SHEET).unwrap();

    let ws = wb.worksheet_mut(0).unwrap();
    for (col, label) in FORECAST_HEADERS.iter().enumerate() {
        // Some labels carry stray whitespace, as typed by hand
        let label = if col % 5 == 0 {
            format!(" {} ", label)
        } else {
            label.to_string()
        };
        ws.set_cell_value_at(0, col as u16, label).unwrap();
        ws.set_cell_style_at(0, col as u16, &header_style()).unwrap();
        ws.set_column_width(col as u16, 12.0 + col as f64);
    }
    ws.set_row_height(0, 30.0);
    ws.set_freeze_panes(1, 0);
    ws.set_auto_filter(Some(AutoFilter::new(
        CellRange::parse("A1:U1").unwrap(),
    )));
    // Styled but unlabelled merged block right of the headers
    ws.merge_cells(&CellRange::parse("W1:X1").unwrap()).unwrap();
    ws.set_cell_style("W1", &header_style()).unwrap();
    ws.add_data_validation(
        DataValidation::list(LOOKUP_RANGE).with_range(CellRange::parse("U2:U500").unwrap()),
    );

    let lookup = wb.worksheet_mut(1).unwrap();
    lookup.set_cell_value("B1", "Failure Category").unwrap();
    for row in 1..93u32 {
        lookup
            .set_cell_value_at(row, 1, format!("Category {}", row))
            .unwrap();
    }

    wb.add_defined_name(
        DefinedName::new("_xlnm._FilterDatabase", "'Forecast Failure-Template(New)'!$A$1:$U$1")
            .unwrap()
            .with_local_sheet(0),
    )
    .unwrap();
    wb
}

pub fn forecast_template_bytes() -> Vec<u8> {
    XlsxWriter::to_bytes(&forecast_workbook()).unwrap()
}

pub fn forecast_config() -> ExportConfig {
    ExportConfig::default()
}

/// A package laid out the way a spreadsheet application saves it: shared
/// strings, theme colors, a theme part and document properties the codec
/// does not model
pub fn application_saved_template() -> Vec<u8> {
    saved_package(DATA_SHEET_XML)
}

/// The same template with the column B dropdown stored in the sheet's
/// extension list, where Excel keeps lists that point at another sheet
pub fn application_saved_template_with_ext_validation() -> Vec<u8> {
    let start = DATA_SHEET_XML.find("<dataValidations").unwrap();
    let end = DATA_SHEET_XML.find("</dataValidations>").unwrap() + "</dataValidations>".len();
    let sheet = format!(
        "{}{}",
        &DATA_SHEET_XML[..start],
        &DATA_SHEET_XML[end..]
    )
    .replace("</worksheet>", &format!("{}</worksheet>", EXT_VALIDATIONS));
    saved_package(&sheet)
}

fn saved_package(data_sheet_xml: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        let parts: [(&str, &str); 9] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("docProps/app.xml", APP_PROPS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/theme/theme1.xml", THEME),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", data_sheet_xml),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.start_file("xl/worksheets/sheet2.xml", options).unwrap();
        zip.write_all(lookup_sheet_xml().as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn lookup_sheet_xml() -> String {
    let mut rows = String::from(r#"<row r="1"><c r="B1" t="s"><v>3</v></c></row>"#);
    for r in 2..=93 {
        rows.push_str(&format!(
            r#"<row r="{r}"><c r="B{r}" t="inlineStr"><is><t>Category {n}</t></is></c></row>"#,
            r = r,
            n = r - 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="B1:B93"/><sheetData>{}</sheetData></worksheet>"#,
        rows
    )
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const APP_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Microsoft Excel</Application></Properties>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><fileVersion appName="xl" lastEdited="7" lowestEdited="7" rupBuild="27328"/><workbookPr defaultThemeVersion="166925"/><bookViews><workbookView xWindow="-120" yWindow="-120" windowWidth="29040" windowHeight="15840" activeTab="0"/></bookViews><sheets><sheet name="Forecast Failure-Template(New)" sheetId="1" r:id="rId1"/><sheet name="MASTER Data" sheetId="2" r:id="rId2"/></sheets><definedNames><definedName name="_xlnm._FilterDatabase" localSheetId="0" hidden="1">'Forecast Failure-Template(New)'!$A$1:$C$1</definedName></definedNames><calcPr calcId="191029"/></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements/></a:theme>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font><font><b/><sz val="11"/><color theme="0"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor theme="4" tint="-0.249977111117893"/><bgColor indexed="64"/></patternFill></fill></fills><borders count="2"><border><left/><right/><top/><bottom/><diagonal/></border><border><left style="thin"><color indexed="64"/></left><right style="thin"><color indexed="64"/></right><top style="thin"><color indexed="64"/></top><bottom style="thin"><color indexed="64"/></bottom><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="center" wrapText="1"/></xf><xf numFmtId="3" fontId="0" fillId="0" borderId="1" xfId="0" applyNumberFormat="1" applyBorder="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles><dxfs count="0"/><tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/></styleSheet>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4"><si><t xml:space="preserve"> Name </t></si><si><t>Status</t></si><si><r><rPr><b/><sz val="11"/></rPr><t>Fore</t></r><r><t>cast Qty</t></r></si><si><t>Failure Category</t></si></sst>"#;

/// A1 " Name ", B1 blank but styled, C1 "Status", D1 "Forecast Qty"; row 2
/// pre-formatted with a number format; autofilter and a dropdown on column B
const DATA_SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac" mc:Ignorable="x14ac"><dimension ref="A1:D2"/><sheetViews><sheetView tabSelected="1" workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/><selection pane="bottomLeft" activeCell="A2" sqref="A2"/></sheetView></sheetViews><sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/><cols><col min="1" max="1" width="28.7109375" customWidth="1"/><col min="2" max="3" width="16.42578125" customWidth="1"/><col min="4" max="4" width="14" style="2" customWidth="1"/></cols><sheetData><row r="1" spans="1:4" ht="30" customHeight="1" x14ac:dyDescent="0.25"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="1"/><c r="C1" s="1" t="s"><v>1</v></c><c r="D1" s="1" t="s"><v>2</v></c></row><row r="2" spans="1:4" x14ac:dyDescent="0.25"><c r="D2" s="2"/></row></sheetData><autoFilter ref="A1:C1"/><dataValidations count="1"><dataValidation type="list" allowBlank="1" showInputMessage="1" showErrorMessage="1" sqref="B2:B1000"><formula1>'MASTER Data'!$B$2:$B$93</formula1></dataValidation></dataValidations><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><pageSetup orientation="portrait" r:id="rId1"/></worksheet>"#;

const EXT_VALIDATIONS: &str = r#"<extLst><ext uri="{CCE6A557-97BC-4b89-ADB6-D9C93CAAB3DF}" xmlns:x14="http://schemas.microsoft.com/office/spreadsheetml/2009/9/main"><x14:dataValidations count="1" xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main"><x14:dataValidation type="list" allowBlank="1" showInputMessage="1" showErrorMessage="1"><x14:formula1><xm:f>'MASTER Data'!$B$2:$B$93</xm:f></x14:formula1><xm:sqref>B2:B1000</xm:sqref></x14:dataValidation></x14:dataValidations></ext></extLst>"#;

/// Template source that counts loads
pub struct CountingSource {
    inner: TemplateBytes,
    pub loads: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(bytes: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: TemplateBytes::new(bytes),
                loads: Arc::clone(&loads),
            },
            loads,
        )
    }
}

impl TemplateSource for CountingSource {
    fn load(&self) -> Result<Workbook> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load()
    }

    fn describe(&self) -> String {
        format!("counting {}", self.inner.describe())
    }
}

/// Encoder that counts calls and delegates to the XLSX encoder
pub struct CountingEncoder {
    pub calls: Arc<AtomicUsize>,
}

impl CountingEncoder {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl WorkbookEncoder for CountingEncoder {
    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        XlsxEncoder.encode(workbook)
    }
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
