//! Column metadata

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column index (0-based)
    pub index: u16,
    /// Custom width in characters (None = default)
    pub width: Option<f64>,
    /// Column is hidden
    pub hidden: bool,
    /// Column-level style index into the sheet's style pool (None = no column style)
    pub style_index: Option<u32>,
}

impl Column {
    /// Create a new column with default settings
    pub fn new(index: u16) -> Self {
        Self {
            index,
            width: None,
            hidden: false,
            style_index: None,
        }
    }

    /// Check if this column has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.width.is_some() || self.hidden || self.style_index.is_some()
    }
}
