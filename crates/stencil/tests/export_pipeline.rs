//! End-to-end behavior of the export pipeline

mod common;

use std::io::Cursor;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil::{
    CellValue, ErrorKind, ExportConfig, ExportError, Exporter, InputRecord, StrategyKind,
    XlsxEncoder, XlsxReader,
};
use stencil_core::Workbook;

use common::{
    count, forecast_config, forecast_template_bytes, CountingEncoder, CountingSource, DATA_SHEET,
    FORECAST_HEADERS,
};

fn exporter(config: ExportConfig) -> Exporter {
    let (source, _) = CountingSource::new(forecast_template_bytes());
    Exporter::with_parts(config, Box::new(source), Box::new(XlsxEncoder))
}

fn read_back(body: &[u8]) -> Workbook {
    XlsxReader::read(Cursor::new(body)).unwrap()
}

fn forecast_record(region: &str, category: &str) -> InputRecord {
    InputRecord::new()
        .with("Region", region)
        .with("Part Number", "PN-100")
        .with("Forecast Qty", 12)
        .with("Failure Category", category)
}

#[test]
fn test_records_land_in_rows_two_onwards() {
    let records = vec![
        forecast_record("EMEA", "Category 1"),
        forecast_record("APAC", "Category 7"),
        forecast_record("AMER", "Category 92"),
    ];
    let response = exporter(forecast_config()).export(&records).unwrap();
    let wb = read_back(&response.body);
    let ws = wb.worksheet_by_name(DATA_SHEET).unwrap();

    // Header row is left as the template had it, stray spaces included
    assert_eq!(ws.get_value("A1").unwrap(), CellValue::string(" Region "));
    assert_eq!(ws.get_value("B1").unwrap(), CellValue::string("Country"));

    assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("EMEA"));
    assert_eq!(ws.get_value("A3").unwrap(), CellValue::string("APAC"));
    assert_eq!(ws.get_value("A4").unwrap(), CellValue::string("AMER"));
    assert_eq!(ws.get_value("D2").unwrap(), CellValue::string("PN-100"));
    assert_eq!(ws.get_value("F3").unwrap(), CellValue::Number(12.0));
    assert_eq!(ws.get_value("U4").unwrap(), CellValue::string("Category 92"));

    // Nothing below the last record
    for col in 0..FORECAST_HEADERS.len() as u16 {
        assert!(ws.get_value_at(4, col).is_empty());
    }
}

#[test]
fn test_whitespace_headers_match_trimmed_keys() {
    let record = InputRecord::new()
        .with("Forecast Qty", 5)
        .with("Quarter", "Q3")
        .with("Failure Category", "Category 2");
    let response = exporter(forecast_config()).export(&[record]).unwrap();
    let wb = read_back(&response.body);
    let ws = wb.worksheet_by_name(DATA_SHEET).unwrap();

    assert_eq!(ws.get_value("F1").unwrap(), CellValue::string(" Forecast Qty "));
    assert_eq!(ws.get_value("F2").unwrap(), CellValue::Number(5.0));
    assert_eq!(ws.get_value("K1").unwrap(), CellValue::string(" Quarter "));
    assert_eq!(ws.get_value("K2").unwrap(), CellValue::string("Q3"));
    assert_eq!(ws.get_value("U2").unwrap(), CellValue::string("Category 2"));
}

#[test]
fn test_missing_fields_blank_and_extra_fields_dropped() {
    let record = InputRecord::new()
        .with("Region", "EMEA")
        .with("Not A Column", "ignored")
        .with("Status", None::<&str>);
    let response = exporter(forecast_config()).export(&[record]).unwrap();
    let wb = read_back(&response.body);
    let ws = wb.worksheet_by_name(DATA_SHEET).unwrap();

    assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("EMEA"));
    for col in 1..FORECAST_HEADERS.len() as u16 {
        assert_eq!(
            ws.get_value_at(1, col),
            CellValue::string(""),
            "column {} should be blank",
            col
        );
    }
    // Extra keys never spill past the last header
    assert!(ws.get_value_at(1, FORECAST_HEADERS.len() as u16).is_empty());
}

#[test]
fn test_falsy_values_written_as_is() {
    let response = exporter(forecast_config())
        .export_json(br#"[{"Region": "", "Forecast Qty": 0, "Actual Qty": -0.5, "Variance": false}]"#)
        .unwrap();
    let wb = read_back(&response.body);
    let ws = wb.worksheet_by_name(DATA_SHEET).unwrap();

    assert_eq!(ws.get_value("F2").unwrap(), CellValue::Number(0.0));
    assert_eq!(ws.get_value("G2").unwrap(), CellValue::Number(-0.5));
    assert_eq!(ws.get_value("H2").unwrap(), CellValue::Boolean(false));
    assert_eq!(ws.get_value("A2").unwrap(), CellValue::string(""));
}

#[test]
fn test_export_is_byte_identical_across_runs() {
    let exporter = exporter(forecast_config());
    let records = vec![
        forecast_record("EMEA", "Category 1"),
        forecast_record("APAC", "Category 2"),
    ];

    let first = exporter.export(&records).unwrap();
    let second = exporter.export(&records).unwrap();
    assert_eq!(first.body, second.body);
}

#[test]
fn test_concurrent_exports_share_one_exporter() {
    let exporter = Arc::new(exporter(forecast_config()));
    let expected = exporter
        .export(&[forecast_record("EMEA", "Category 1")])
        .unwrap()
        .body;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let exporter = Arc::clone(&exporter);
                scope.spawn(move || {
                    exporter
                        .export(&[forecast_record("EMEA", "Category 1")])
                        .unwrap()
                        .body
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_empty_payload_never_loads_template() {
    let (source, loads) = CountingSource::new(forecast_template_bytes());
    let (encoder, encodes) = CountingEncoder::new();
    let exporter = Exporter::with_parts(forecast_config(), Box::new(source), Box::new(encoder));

    let err = exporter.export(&[]).unwrap_err();
    assert!(matches!(err, ExportError::InvalidInput(_)));
    assert_eq!(err.kind(), ErrorKind::Client);

    let bodies: [&[u8]; 5] = [b"[]", b"", b"{}", b"not json", b"[1, 2]"];
    for body in bodies {
        assert!(matches!(
            exporter.export_json(body),
            Err(ExportError::InvalidInput(_))
        ));
    }

    assert_eq!(count(&loads), 0);
    assert_eq!(count(&encodes), 0);
}

#[test]
fn test_missing_data_sheet_never_encodes() {
    let (source, loads) = CountingSource::new(forecast_template_bytes());
    let (encoder, encodes) = CountingEncoder::new();
    let config = ExportConfig {
        data_sheet: "Forecast Failure-Template(Old)".into(),
        ..forecast_config()
    };
    let exporter = Exporter::with_parts(config, Box::new(source), Box::new(encoder));

    let err = exporter
        .export(&[forecast_record("EMEA", "Category 1")])
        .unwrap_err();
    match &err {
        ExportError::SheetNotFound { missing } => {
            assert_eq!(missing, &vec!["Forecast Failure-Template(Old)".to_string()])
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(count(&loads), 1);
    assert_eq!(count(&encodes), 0);
}

#[test]
fn test_missing_lookup_sheet_reported_with_data_sheet() {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Elsewhere").unwrap();
    let bytes = stencil::XlsxWriter::to_bytes(&wb).unwrap();

    let config = ExportConfig {
        strategy: StrategyKind::Reconstruct,
        ..forecast_config()
    };
    let (source, _) = CountingSource::new(bytes);
    let (encoder, encodes) = CountingEncoder::new();
    let exporter = Exporter::with_parts(config, Box::new(source), Box::new(encoder));

    let err = exporter
        .export(&[forecast_record("EMEA", "Category 1")])
        .unwrap_err();
    match err {
        ExportError::SheetNotFound { missing } => {
            assert_eq!(missing, vec![DATA_SHEET.to_string(), "MASTER Data".to_string()])
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(count(&encodes), 0);
}

fn data_sheet_only_template() -> Vec<u8> {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name(DATA_SHEET).unwrap();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", "Region")
        .unwrap();
    stencil::XlsxWriter::to_bytes(&wb).unwrap()
}

#[test]
fn test_lookup_sheet_optional_for_in_place() {
    // Default tables, validations included
    let (source, _) = CountingSource::new(data_sheet_only_template());
    let exporter = Exporter::with_parts(forecast_config(), Box::new(source), Box::new(XlsxEncoder));

    let response = exporter.export(&[forecast_record("EMEA", "x")]).unwrap();
    let out = read_back(&response.body);
    assert_eq!(out.sheet_count(), 1);
    assert_eq!(
        out.worksheet(0).unwrap().get_value("A2").unwrap(),
        CellValue::string("EMEA")
    );
}

#[test]
fn test_lookup_sheet_optional_without_validations() {
    let mut config = ExportConfig {
        strategy: StrategyKind::Reconstruct,
        ..forecast_config()
    };
    config.validations.clear();
    let (source, _) = CountingSource::new(data_sheet_only_template());
    let exporter = Exporter::with_parts(config.clone(), Box::new(source), Box::new(XlsxEncoder));

    let response = exporter.export(&[forecast_record("EMEA", "x")]).unwrap();
    let out = read_back(&response.body);
    assert_eq!(
        out.worksheet(0).unwrap().get_value("A2").unwrap(),
        CellValue::string("EMEA")
    );

    // Reconstruct with the validation table needs the lookup sheet
    let (source, _) = CountingSource::new(data_sheet_only_template());
    let exporter = Exporter::with_parts(
        ExportConfig {
            validations: forecast_config().validations,
            ..config
        },
        Box::new(source),
        Box::new(XlsxEncoder),
    );
    match exporter.export(&[forecast_record("EMEA", "x")]) {
        Err(ExportError::SheetNotFound { missing }) => {
            assert_eq!(missing, vec!["MASTER Data".to_string()])
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_headerless_sheet_writes_nothing() {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name(DATA_SHEET).unwrap();
    wb.add_worksheet_with_name("MASTER Data").unwrap();
    let bytes = stencil::XlsxWriter::to_bytes(&wb).unwrap();

    let (source, _) = CountingSource::new(bytes);
    let exporter = Exporter::with_parts(forecast_config(), Box::new(source), Box::new(XlsxEncoder));

    let response = exporter.export(&[forecast_record("EMEA", "x")]).unwrap();
    let out = read_back(&response.body);
    assert!(out.worksheet(0).unwrap().is_empty());
}

#[test]
fn test_reconstruct_validation_on_data_rows() {
    let config = ExportConfig {
        strategy: StrategyKind::Reconstruct,
        ..forecast_config()
    };
    let records = vec![
        forecast_record("EMEA", "Category 1"),
        forecast_record("APAC", "Category 2"),
        forecast_record("AMER", "Category 3"),
    ];
    let response = exporter(config).export(&records).unwrap();
    let wb = read_back(&response.body);
    let ws = wb.worksheet_by_name(DATA_SHEET).unwrap();

    let validations = ws.data_validations();
    assert_eq!(validations.len(), 1);
    assert_eq!(validations[0].sqref(), "U2:U4");
    assert!(ws.data_validation_at(0, 20).is_none());
    assert!(ws.data_validation_at(1, 20).is_some());
    assert!(ws.data_validation_at(3, 20).is_some());
    assert!(ws.data_validation_at(4, 20).is_none());

    let header = ws.cell_style_at(0, 20).unwrap();
    assert!(header.font.bold);
    assert_eq!(header.fill.solid_color(), Some(stencil_core::Color::YELLOW));
    assert_eq!(
        ws.cell_style_at(3, 20).unwrap().fill.solid_color(),
        Some(stencil_core::Color::YELLOW)
    );

    // Values survive, template layout does not
    assert_eq!(ws.get_value("U3").unwrap(), CellValue::string("Category 2"));
    assert_eq!(ws.get_value("A1").unwrap(), CellValue::string(" Region "));
    assert!(ws.auto_filter().is_none());
    assert!(ws.merged_regions().is_empty());
    assert!(ws.freeze_panes().is_none());
    assert_eq!(ws.column_width(0), Some(12.0));
}

#[test]
fn test_response_headers() {
    let response = exporter(forecast_config())
        .export(&[forecast_record("EMEA", "Category 1")])
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[0],
        (
            "Content-Disposition",
            "attachment; filename=\"exported_data.xlsx\"".to_string()
        )
    );
    assert_eq!(headers[1].1, stencil::XLSX_CONTENT_TYPE);
}
