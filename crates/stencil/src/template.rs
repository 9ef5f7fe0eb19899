//! Template loading

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use stencil_core::Workbook;
use stencil_xlsx::{XlsxError, XlsxReader};

use crate::error::{ExportError, Result};

/// Something that yields a fresh template workbook on every call
///
/// Each export mutates the workbook it receives, so implementations must
/// never hand out shared state.
pub trait TemplateSource: Send + Sync {
    fn load(&self) -> Result<Workbook>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// A template on disk, read fresh per export and never written
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
}

impl TemplateFile {
    /// Resolve the template once, failing if it is not a regular file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExportError::TemplateNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for TemplateFile {
    fn load(&self) -> Result<Workbook> {
        match XlsxReader::read_file(&self.path) {
            Ok(workbook) => Ok(workbook),
            Err(XlsxError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                Err(ExportError::TemplateNotFound(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A template package held in memory
#[derive(Debug, Clone)]
pub struct TemplateBytes {
    bytes: Vec<u8>,
}

impl TemplateBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl TemplateSource for TemplateBytes {
    fn load(&self) -> Result<Workbook> {
        Ok(XlsxReader::read(Cursor::new(self.bytes.as_slice()))?)
    }

    fn describe(&self) -> String {
        format!("<{} bytes in memory>", self.bytes.len())
    }
}
