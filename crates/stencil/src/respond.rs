//! Serializing the result and describing the download

use stencil_core::Workbook;
use stencil_xlsx::{XlsxWriter, XLSX_CONTENT_TYPE};

use crate::error::{ExportError, Result};

/// Turns a finished workbook into file bytes
pub trait WorkbookEncoder: Send + Sync {
    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>>;

    fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }
}

/// Deterministic `.xlsx` encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEncoder;

impl WorkbookEncoder for XlsxEncoder {
    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        XlsxWriter::to_bytes(workbook).map_err(|e| ExportError::SerializationFailure(e.to_string()))
    }
}

/// A complete download: body plus the headers that go with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub filename: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ExportResponse {
    /// Encode `workbook` in full before anything is handed out
    pub fn build(
        workbook: &Workbook,
        encoder: &dyn WorkbookEncoder,
        filename: &str,
    ) -> Result<Self> {
        let body = encoder.encode(workbook)?;
        log::debug!("encoded '{}': {} bytes", filename, body.len());
        Ok(Self {
            filename: filename.to_string(),
            content_type: encoder.content_type().to_string(),
            body,
        })
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// `Content-Disposition` and `Content-Type`, in that order
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("Content-Disposition", self.content_disposition()),
            ("Content-Type", self.content_type.clone()),
        ]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FailingEncoder;

    impl WorkbookEncoder for FailingEncoder {
        fn encode(&self, _workbook: &Workbook) -> Result<Vec<u8>> {
            Err(ExportError::SerializationFailure("disk on fire".into()))
        }
    }

    #[test]
    fn test_headers() {
        let response = ExportResponse::build(&Workbook::new(), &XlsxEncoder, "exported_data.xlsx")
            .unwrap();

        assert_eq!(
            response.headers(),
            [
                (
                    "Content-Disposition",
                    "attachment; filename=\"exported_data.xlsx\"".to_string()
                ),
                (
                    "Content-Type",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()
                ),
            ]
        );
        // Zip local file header magic
        assert_eq!(&response.body[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_encoder_failure_propagates() {
        let err = ExportResponse::build(&Workbook::new(), &FailingEncoder, "x.xlsx").unwrap_err();
        assert!(matches!(err, ExportError::SerializationFailure(_)));
    }

    #[test]
    fn test_empty_workbook_is_serialization_failure() {
        let err = ExportResponse::build(&Workbook::empty(), &XlsxEncoder, "x.xlsx").unwrap_err();
        assert!(matches!(err, ExportError::SerializationFailure(_)));
    }
}
