//! Export error types

use std::path::PathBuf;

use stencil_xlsx::XlsxError;
use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors raised by an export call
#[derive(Debug, Error)]
pub enum ExportError {
    /// Payload missing, empty, not an array, or holding non-scalar fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Required sheets absent from the template
    #[error("Sheet(s) not found in template: {}", .missing.join(", "))]
    SheetNotFound { missing: Vec<String> },

    #[error("Serialization failed: {0}")]
    SerializationFailure(String),

    /// Template package could not be read
    #[error("Template error: {0}")]
    Template(#[from] XlsxError),

    /// Workbook model rejected an edit
    #[error("Workbook error: {0}")]
    Workbook(#[from] stencil_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Broad class of an [`ExportError`], for mapping onto transport status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent a bad request
    Client,
    /// The template is missing
    NotFound,
    /// Everything else
    Server,
}

impl ErrorKind {
    /// Conventional HTTP status for this kind
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::Client => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Server => 500,
        }
    }
}

impl ExportError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ExportError::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ExportError::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidInput(_) => ErrorKind::Client,
            ExportError::TemplateNotFound(_) => ErrorKind::NotFound,
            ExportError::SheetNotFound { .. }
            | ExportError::SerializationFailure(_)
            | ExportError::Template(_)
            | ExportError::Workbook(_)
            | ExportError::Config(_) => ErrorKind::Server,
        }
    }
}
