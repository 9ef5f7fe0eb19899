//! Export configuration
//!
//! Everything that describes one template layout lives here: where the
//! template is, which sheets matter, and the static style and validation
//! tables the reconstruct strategy re-applies. Files are JSON:
//!
//! ```json
//! {
//!   "template_path": "templates/template.xlsx",
//!   "strategy": "reconstruct",
//!   "styles": {
//!     "Forecast Failure-Template(New)": { "21": { "fill": "#FFFF00", "data": true } }
//!   },
//!   "validations": { "21": "'MASTER Data'!$B$2:$B$93" }
//! }
//! ```
//!
//! Column keys are 1-based, as they appear to spreadsheet users.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stencil_core::{Color, MAX_COLS};

use crate::error::{ExportError, Result};
use crate::strategy::{InPlace, Reconstruct, TemplateStrategy};

pub const DEFAULT_TEMPLATE_PATH: &str = "templates/template.xlsx";
pub const DEFAULT_DATA_SHEET: &str = "Forecast Failure-Template(New)";
pub const DEFAULT_LOOKUP_SHEET: &str = "MASTER Data";
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "exported_data.xlsx";

/// Column that carries the lookup dropdown in the forecast template
const FORECAST_LOOKUP_COLUMN: u16 = 21;
const FORECAST_LOOKUP_RANGE: &str = "'MASTER Data'!$B$2:$B$93";
const FORECAST_LOOKUP_FILL: &str = "#FFFF00";

/// How the populated template is turned into the final workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Return the populated template as-is
    #[default]
    InPlace,
    /// Rebuild a fresh workbook and re-apply the style and validation tables
    Reconstruct,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::InPlace => "in_place",
            StrategyKind::Reconstruct => "reconstruct",
        }
    }

    /// Instantiate the strategy
    pub fn build(&self) -> Box<dyn TemplateStrategy> {
        match self {
            StrategyKind::InPlace => Box::new(InPlace),
            StrategyKind::Reconstruct => Box::new(Reconstruct),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "in_place" | "inplace" => Ok(StrategyKind::InPlace),
            "reconstruct" => Ok(StrategyKind::Reconstruct),
            _ => Err(format!(
                "unknown strategy '{}' (expected in-place or reconstruct)",
                s
            )),
        }
    }
}

/// Styling for one column of one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStyleRule {
    /// Fill color as hex, `#RRGGBB` or `AARRGGBB`
    pub fill: String,
    /// Also fill the data cells below the header
    #[serde(default)]
    pub data: bool,
}

impl ColumnStyleRule {
    pub fn new(fill: impl Into<String>, data: bool) -> Self {
        Self {
            fill: fill.into(),
            data,
        }
    }

    pub fn fill_color(&self) -> Result<Color> {
        Color::from_hex(&self.fill)
            .ok_or_else(|| ExportError::config(format!("invalid fill color '{}'", self.fill)))
    }
}

/// sheet name -> 1-based column -> rule
pub type StyleTable = BTreeMap<String, BTreeMap<u16, ColumnStyleRule>>;

/// 1-based column -> list source formula
pub type ValidationTable = BTreeMap<u16, String>;

/// Configuration of an [`Exporter`](crate::Exporter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub template_path: PathBuf,
    /// Sheet that receives the records
    pub data_sheet: String,
    /// Sheet holding the values list validations point at
    ///
    /// Matched by exact, case-sensitive name like `data_sheet`; a sheet
    /// whose name merely contains this text does not count.
    pub lookup_sheet: String,
    pub download_filename: String,
    pub strategy: StrategyKind,
    pub styles: StyleTable,
    pub validations: ValidationTable,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let mut forecast_styles = BTreeMap::new();
        forecast_styles.insert(
            FORECAST_LOOKUP_COLUMN,
            ColumnStyleRule::new(FORECAST_LOOKUP_FILL, true),
        );

        let mut styles = StyleTable::new();
        styles.insert(DEFAULT_DATA_SHEET.to_string(), forecast_styles);

        let mut validations = ValidationTable::new();
        validations.insert(FORECAST_LOOKUP_COLUMN, FORECAST_LOOKUP_RANGE.to_string());

        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            data_sheet: DEFAULT_DATA_SHEET.to_string(),
            lookup_sheet: DEFAULT_LOOKUP_SHEET.to_string(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            strategy: StrategyKind::default(),
            styles,
            validations,
        }
    }
}

impl ExportConfig {
    /// Default layout with a different template path
    pub fn with_template(path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: path.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file; missing keys take the default values
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExportError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| ExportError::config(format!("'{}': {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ExportError::config(e.to_string()))
    }

    /// Sheets an export requires to exist in the template
    ///
    /// The lookup sheet only matters when reconstruct re-applies the
    /// validation table; in-place needs the data sheet alone.
    pub fn required_sheets(&self) -> Vec<&str> {
        let mut names = vec![self.data_sheet.as_str()];
        if self.strategy == StrategyKind::Reconstruct
            && !self.validations.is_empty()
            && self.lookup_sheet != self.data_sheet
        {
            names.push(self.lookup_sheet.as_str());
        }
        names
    }

    /// Check the tables and names without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.data_sheet.trim().is_empty() {
            return Err(ExportError::config("data_sheet must not be empty"));
        }
        if !self.validations.is_empty() && self.lookup_sheet.trim().is_empty() {
            return Err(ExportError::config(
                "lookup_sheet must not be empty when validations are configured",
            ));
        }

        let name = &self.download_filename;
        if name.trim().is_empty() || name.chars().any(|c| c == '"' || c.is_control()) {
            return Err(ExportError::config(format!(
                "invalid download_filename '{}'",
                name.escape_debug()
            )));
        }

        for (sheet, columns) in &self.styles {
            for (&col, rule) in columns {
                check_column(col)
                    .map_err(|e| ExportError::config(format!("styles['{}']: {}", sheet, e)))?;
                rule.fill_color()?;
            }
        }

        for (&col, formula) in &self.validations {
            check_column(col).map_err(|e| ExportError::config(format!("validations: {}", e)))?;
            if formula.trim_start_matches('=').trim().is_empty() {
                return Err(ExportError::config(format!(
                    "validations: column {} has an empty formula",
                    col
                )));
            }
        }

        Ok(())
    }
}

fn check_column(col: u16) -> std::result::Result<(), String> {
    if col == 0 || col > MAX_COLS {
        return Err(format!("column {} outside 1..={}", col, MAX_COLS));
    }
    Ok(())
}
