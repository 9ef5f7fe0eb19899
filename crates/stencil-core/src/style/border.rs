//! Border style types

use super::Color;

/// Borders around a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// No borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Same edge on all four sides
    pub fn all(style: BorderLineStyle, color: Color) -> Self {
        let edge = Some(BorderEdge { style, color });
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
        }
    }

    /// Check if no edge is set
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// One border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub style: BorderLineStyle,
    pub color: Color,
}

/// OOXML border line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderLineStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

const LINE_NAMES: &[(BorderLineStyle, &str)] = &[
    (BorderLineStyle::Thin, "thin"),
    (BorderLineStyle::Medium, "medium"),
    (BorderLineStyle::Thick, "thick"),
    (BorderLineStyle::Dashed, "dashed"),
    (BorderLineStyle::Dotted, "dotted"),
    (BorderLineStyle::Double, "double"),
    (BorderLineStyle::Hair, "hair"),
    (BorderLineStyle::MediumDashed, "mediumDashed"),
    (BorderLineStyle::DashDot, "dashDot"),
    (BorderLineStyle::MediumDashDot, "mediumDashDot"),
    (BorderLineStyle::DashDotDot, "dashDotDot"),
    (BorderLineStyle::MediumDashDotDot, "mediumDashDotDot"),
    (BorderLineStyle::SlantDashDot, "slantDashDot"),
];

impl BorderLineStyle {
    /// Name used in the `style` attribute
    pub fn as_xlsx(&self) -> &'static str {
        LINE_NAMES
            .iter()
            .find(|(s, _)| s == self)
            .map_or("thin", |(_, name)| name)
    }

    /// Parse a `style` attribute; "none" and unknown values yield None
    pub fn from_xlsx(s: &str) -> Option<Self> {
        LINE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(style, _)| *style)
    }
}
