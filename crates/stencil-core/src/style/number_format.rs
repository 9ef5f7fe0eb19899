//! Number format types

/// First id available to custom formats in a styles part
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Number format attached to a cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (id 0)
    #[default]
    General,

    /// Built-in format by id (below 164)
    BuiltIn(u32),

    /// Custom format code
    Custom(String),
}

impl NumberFormat {
    /// Text format (@)
    pub const ID_TEXT: u32 = 49;

    /// Resolve a `numFmtId`, looking custom ids up in `custom`
    pub fn from_id(id: u32, custom: impl Fn(u32) -> Option<String>) -> Self {
        match id {
            0 => NumberFormat::General,
            id if id < FIRST_CUSTOM_FORMAT_ID => NumberFormat::BuiltIn(id),
            id => custom(id).map_or(NumberFormat::General, NumberFormat::Custom),
        }
    }

    /// Built-in id, if this format has one
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Format code as displayed to users
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }
}

fn builtin_format_string(id: u32) -> &'static str {
    match id {
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        49 => "@",
        _ => "General",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(NumberFormat::from_id(0, |_| None), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(14, |_| None), NumberFormat::BuiltIn(14));
        assert_eq!(
            NumberFormat::from_id(164, |_| Some("0.000".into())),
            NumberFormat::Custom("0.000".into())
        );
        // Dangling custom id degrades to General
        assert_eq!(NumberFormat::from_id(170, |_| None), NumberFormat::General);
    }

    #[test]
    fn test_format_string() {
        assert_eq!(NumberFormat::BuiltIn(NumberFormat::ID_TEXT).format_string(), "@");
        assert_eq!(NumberFormat::Custom("yyyy".into()).format_string(), "yyyy");
    }
}
