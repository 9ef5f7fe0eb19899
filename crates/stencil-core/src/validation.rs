//! Data validation rules
//!
//! A [`DataValidation`] restricts what may be typed into a set of cells.
//! The export engine mostly deals in list rules whose source is a range on
//! a lookup sheet:
//!
//! ```rust
//! use stencil_core::{CellRange, DataValidation};
//!
//! let rule = DataValidation::list("'MASTER Data'!$B$2:$B$93")
//!     .with_range(CellRange::column_span(20, 1, 10));
//! assert!(rule.applies_to(5, 20));
//! assert!(!rule.applies_to(0, 20));
//! ```

use crate::cell::CellRange;

/// Validation rule over one or more ranges
#[derive(Debug, Clone, PartialEq)]
pub struct DataValidation {
    pub validation_type: ValidationType,
    pub ranges: Vec<CellRange>,
    pub allow_blank: bool,
    /// Hide the in-cell dropdown arrow (inverted in the file format)
    pub hide_dropdown: bool,
    pub show_input_message: bool,
    pub input_title: Option<String>,
    pub input_message: Option<String>,
    pub show_error_alert: bool,
    pub error_style: ValidationErrorStyle,
    pub error_title: Option<String>,
    pub error_message: Option<String>,
}

impl Default for DataValidation {
    fn default() -> Self {
        Self {
            validation_type: ValidationType::None,
            ranges: Vec::new(),
            allow_blank: true,
            hide_dropdown: false,
            show_input_message: false,
            input_title: None,
            input_message: None,
            show_error_alert: true,
            error_style: ValidationErrorStyle::Stop,
            error_title: None,
            error_message: None,
        }
    }
}

impl DataValidation {
    /// Create a list (dropdown) validation
    ///
    /// `source` is either a range formula such as `'Sheet'!$A$1:$A$9` or a
    /// quoted inline list such as `"Yes,No"`. A leading `=` is stripped.
    pub fn list(source: impl Into<String>) -> Self {
        let source = source.into();
        let source = source.strip_prefix('=').map(str::to_string).unwrap_or(source);
        Self {
            validation_type: ValidationType::List { source },
            ..Self::default()
        }
    }

    /// Create a comparison validation (whole, decimal, date, time, text length)
    pub fn compare(
        kind: CompareKind,
        operator: ValidationOperator,
        value1: impl Into<String>,
        value2: Option<String>,
    ) -> Self {
        Self {
            validation_type: ValidationType::Compare {
                kind,
                operator,
                value1: value1.into(),
                value2,
            },
            ..Self::default()
        }
    }

    /// Create a custom formula validation
    pub fn custom(formula: impl Into<String>) -> Self {
        Self {
            validation_type: ValidationType::Custom {
                formula: formula.into(),
            },
            ..Self::default()
        }
    }

    /// Add a cell range to this validation
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Set whether blank cells are allowed
    pub fn with_allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Set the error alert shown on invalid input
    pub fn with_error_message(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.show_error_alert = true;
        self.error_title = Some(title.into());
        self.error_message = Some(message.into());
        self
    }

    /// Set the error style
    pub fn with_error_style(mut self, style: ValidationErrorStyle) -> Self {
        self.error_style = style;
        self
    }

    /// Check if this validation covers a cell (0-based)
    pub fn applies_to(&self, row: u32, col: u16) -> bool {
        self.ranges.iter().any(|r| r.contains(row, col))
    }

    /// Space-separated `sqref` string
    pub fn sqref(&self) -> String {
        self.ranges
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Kind of validation rule
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValidationType {
    /// Any value
    #[default]
    None,
    /// Value must come from a list
    List { source: String },
    /// Value compared against one or two bounds
    Compare {
        kind: CompareKind,
        operator: ValidationOperator,
        value1: String,
        value2: Option<String>,
    },
    /// Formula evaluating to TRUE for valid input
    Custom { formula: String },
}

impl ValidationType {
    /// Value for the `type` attribute
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            ValidationType::None => "none",
            ValidationType::List { .. } => "list",
            ValidationType::Compare { kind, .. } => kind.as_xlsx(),
            ValidationType::Custom { .. } => "custom",
        }
    }
}

/// What a comparison validation compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Whole,
    Decimal,
    Date,
    Time,
    TextLength,
}

impl CompareKind {
    pub fn as_xlsx(&self) -> &'static str {
        match self {
            CompareKind::Whole => "whole",
            CompareKind::Decimal => "decimal",
            CompareKind::Date => "date",
            CompareKind::Time => "time",
            CompareKind::TextLength => "textLength",
        }
    }

    pub fn from_xlsx(s: &str) -> Option<Self> {
        Some(match s {
            "whole" => CompareKind::Whole,
            "decimal" => CompareKind::Decimal,
            "date" => CompareKind::Date,
            "time" => CompareKind::Time,
            "textLength" => CompareKind::TextLength,
            _ => return None,
        })
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationOperator {
    #[default]
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ValidationOperator {
    pub fn as_xlsx(&self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Parse an `operator` attribute; unknown values fall back to between
    pub fn from_xlsx(s: &str) -> Self {
        match s {
            "notBetween" => ValidationOperator::NotBetween,
            "equal" => ValidationOperator::Equal,
            "notEqual" => ValidationOperator::NotEqual,
            "greaterThan" => ValidationOperator::GreaterThan,
            "lessThan" => ValidationOperator::LessThan,
            "greaterThanOrEqual" => ValidationOperator::GreaterThanOrEqual,
            "lessThanOrEqual" => ValidationOperator::LessThanOrEqual,
            _ => ValidationOperator::Between,
        }
    }

    /// Whether the operator uses a second bound
    pub fn is_range(&self) -> bool {
        matches!(self, ValidationOperator::Between | ValidationOperator::NotBetween)
    }
}

/// Alert style shown for invalid input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationErrorStyle {
    #[default]
    Stop,
    Warning,
    Information,
}

impl ValidationErrorStyle {
    pub fn as_xlsx(&self) -> &'static str {
        match self {
            ValidationErrorStyle::Stop => "stop",
            ValidationErrorStyle::Warning => "warning",
            ValidationErrorStyle::Information => "information",
        }
    }

    pub fn from_xlsx(s: &str) -> Self {
        match s {
            "warning" => ValidationErrorStyle::Warning,
            "information" => ValidationErrorStyle::Information,
            _ => ValidationErrorStyle::Stop,
        }
    }
}
