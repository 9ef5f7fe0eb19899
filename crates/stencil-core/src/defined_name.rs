//! Workbook defined names

use crate::error::{Error, Result};

/// A `<definedName>` entry
///
/// `refers_to` is kept as the raw formula text (without a leading `=`),
/// e.g. `'MASTER Data'!$B$2:$B$93`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
    /// Sheet index for sheet-scoped names
    pub local_sheet: Option<usize>,
    pub hidden: bool,
}

impl DefinedName {
    /// Create a workbook-scoped name
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let refers_to = refers_to.into();
        let refers_to = refers_to.strip_prefix('=').map(str::to_string).unwrap_or(refers_to);
        Ok(Self {
            name,
            refers_to,
            local_sheet: None,
            hidden: false,
        })
    }

    /// Scope the name to one sheet
    pub fn with_local_sheet(mut self, sheet: usize) -> Self {
        self.local_sheet = Some(sheet);
        self
    }

    /// Built-in names such as `_xlnm._FilterDatabase`
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("_xlnm.")
    }
}

fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '\\');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '\\');

    if !valid_start || !valid_rest || name.len() > 255 {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}
