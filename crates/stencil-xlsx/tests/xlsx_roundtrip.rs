//! Write -> read roundtrips through the XLSX package format

use std::io::Cursor;

use stencil_core::{
    AutoFilter, BorderLineStyle, BorderStyle, CellRange, CellValue, Color, DataValidation,
    DefinedName, HorizontalAlignment, NumberFormat, Style, Workbook,
};
use stencil_xlsx::{XlsxReader, XlsxWriter};

fn roundtrip(wb: &Workbook) -> Workbook {
    let mut buf = Vec::new();
    XlsxWriter::write(wb, Cursor::new(&mut buf)).unwrap();
    XlsxReader::read(Cursor::new(&buf)).unwrap()
}

#[test]
fn test_roundtrip_values() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();

    sheet.set_cell_value("A1", 42.0).unwrap();
    sheet.set_cell_value("B1", -100.5).unwrap();
    sheet.set_cell_value("C1", 0.0).unwrap();
    sheet.set_cell_value("D1", 1e10).unwrap();
    sheet.set_cell_value("A2", "Special: <>&\"'").unwrap();
    sheet.set_cell_value("B2", "").unwrap();
    sheet.set_cell_value("C2", "Multi\nLine").unwrap();
    sheet.set_cell_value("D2", "Unicode: \u{1F600}").unwrap();
    sheet.set_cell_value("A3", true).unwrap();
    sheet.set_cell_value("B3", false).unwrap();
    sheet
        .set_cell_value("C3", CellValue::Error("#DIV/0!".into()))
        .unwrap();

    let wb2 = roundtrip(&wb);
    let sheet2 = wb2.worksheet(0).unwrap();

    assert_eq!(sheet2.get_value("A1").unwrap(), CellValue::Number(42.0));
    assert_eq!(sheet2.get_value("B1").unwrap(), CellValue::Number(-100.5));
    assert_eq!(sheet2.get_value("C1").unwrap(), CellValue::Number(0.0));
    assert_eq!(sheet2.get_value("D1").unwrap(), CellValue::Number(1e10));
    assert_eq!(
        sheet2.get_value("A2").unwrap().as_string(),
        Some("Special: <>&\"'")
    );
    assert_eq!(sheet2.get_value("B2").unwrap(), CellValue::string(""));
    assert_eq!(
        sheet2.get_value("C2").unwrap().as_string(),
        Some("Multi\nLine")
    );
    assert_eq!(
        sheet2.get_value("D2").unwrap().as_string(),
        Some("Unicode: \u{1F600}")
    );
    assert_eq!(sheet2.get_value("A3").unwrap(), CellValue::Boolean(true));
    assert_eq!(sheet2.get_value("B3").unwrap(), CellValue::Boolean(false));
    assert_eq!(
        sheet2.get_value("C3").unwrap(),
        CellValue::Error("#DIV/0!".into())
    );
}

#[test]
fn test_roundtrip_formula_with_cached_value() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 2.0).unwrap();
    sheet
        .set_cell_value(
            "B1",
            CellValue::Formula {
                text: "=A1*2".into(),
                cached_value: Some(Box::new(CellValue::Number(4.0))),
            },
        )
        .unwrap();
    sheet
        .set_cell_value(
            "C1",
            CellValue::Formula {
                text: "=IF(A1>1,\"big\",\"small\")".into(),
                cached_value: Some(Box::new(CellValue::string("big"))),
            },
        )
        .unwrap();

    let wb2 = roundtrip(&wb);
    let sheet2 = wb2.worksheet(0).unwrap();
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet2.get_value("B1").unwrap(), sheet.get_value("B1").unwrap());
    assert_eq!(sheet2.get_value("C1").unwrap(), sheet.get_value("C1").unwrap());
}

#[test]
fn test_roundtrip_styles() {
    let header = Style::new()
        .bold(true)
        .fill_color(Color::YELLOW)
        .border(BorderStyle::all(BorderLineStyle::Thin, Color::BLACK))
        .horizontal_alignment(HorizontalAlignment::Center)
        .wrap_text(true);
    let amount = Style::new().number_format(NumberFormat::Custom("#,##0.00 \"USD\"".into()));

    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Amount").unwrap();
    sheet.set_cell_style("A1", &header).unwrap();
    sheet.set_cell_value("A2", 12.5).unwrap();
    sheet.set_cell_style("A2", &amount).unwrap();
    // Style without a value survives as a formatted blank cell
    sheet.set_cell_style("A3", &amount).unwrap();
    sheet.set_column_style(1, &header);

    let wb2 = roundtrip(&wb);
    let sheet2 = wb2.worksheet(0).unwrap();

    assert_eq!(sheet2.cell_style_at(0, 0), Some(&header));
    assert_eq!(sheet2.cell_style_at(1, 0), Some(&amount));
    assert_eq!(sheet2.cell_style_at(2, 0), Some(&amount));
    assert_eq!(sheet2.get_value_at(2, 0), CellValue::Empty);
    assert_eq!(sheet2.column_style(1), Some(&header));
}

#[test]
fn test_roundtrip_sheet_layout() {
    let mut wb = Workbook::new();
    wb.rename_worksheet(0, "Forecast Failure-Template(New)")
        .unwrap();
    wb.add_worksheet_with_name("MASTER Data").unwrap();
    wb.add_defined_name(
        DefinedName::new("_xlnm._FilterDatabase", "'Forecast Failure-Template(New)'!$A$1:$C$1")
            .unwrap()
            .with_local_sheet(0),
    )
    .unwrap();

    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Region").unwrap();
    sheet.set_row_height(0, 32.0);
    sheet.set_row_hidden(4, true);
    sheet.set_column_width(0, 18.0);
    sheet.set_column_hidden(5, true);
    sheet.set_freeze_panes(1, 1);
    sheet
        .merge_cells(&CellRange::parse("E1:F1").unwrap())
        .unwrap();
    sheet.set_auto_filter(Some(AutoFilter::new(CellRange::parse("A1:C1").unwrap())));
    sheet.add_data_validation(
        DataValidation::list("'MASTER Data'!$B$2:$B$93")
            .with_range(CellRange::column_span(2, 1, 200))
            .with_error_message("Invalid", "Pick a value from the list"),
    );

    let wb2 = roundtrip(&wb);
    assert_eq!(
        wb2.sheet_names().collect::<Vec<_>>(),
        vec!["Forecast Failure-Template(New)", "MASTER Data"]
    );
    assert_eq!(wb2.defined_names(), wb.defined_names());

    let sheet2 = wb2.worksheet(0).unwrap();
    assert_eq!(sheet2.row_height(0), Some(32.0));
    assert!(sheet2.is_row_hidden(4));
    assert_eq!(sheet2.column_width(0), Some(18.0));
    assert!(sheet2.is_column_hidden(5));
    assert_eq!(sheet2.freeze_panes(), wb.worksheet(0).unwrap().freeze_panes());
    assert_eq!(sheet2.merged_regions(), wb.worksheet(0).unwrap().merged_regions());
    assert_eq!(sheet2.auto_filter(), wb.worksheet(0).unwrap().auto_filter());
    assert_eq!(
        sheet2.data_validations(),
        wb.worksheet(0).unwrap().data_validations()
    );
}

#[test]
fn test_rewrite_is_stable() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Region").unwrap();
    sheet.set_cell_style("A1", &Style::new().bold(true)).unwrap();
    sheet.set_column_width(0, 14.0);

    let first = XlsxWriter::to_bytes(&wb).unwrap();
    let reread = XlsxReader::read(Cursor::new(&first)).unwrap();
    let second = XlsxWriter::to_bytes(&reread).unwrap();
    let third = XlsxWriter::to_bytes(&XlsxReader::read(Cursor::new(&second)).unwrap()).unwrap();

    assert_eq!(second, third);
}

#[test]
fn test_write_file_and_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", "on disk")
        .unwrap();
    XlsxWriter::write_file(&wb, &path).unwrap();

    let wb2 = XlsxReader::read_file(&path).unwrap();
    assert_eq!(
        wb2.worksheet(0).unwrap().get_value("A1").unwrap(),
        CellValue::string("on disk")
    );
}

#[test]
fn test_read_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(XlsxReader::read_file(dir.path().join("nope.xlsx")).is_err());
}
