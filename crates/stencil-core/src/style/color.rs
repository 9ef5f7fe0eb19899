//! Color representation

use std::fmt;

/// Color as stored in OOXML style parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (written with an opaque alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color index with tint in thousandths (-1000..=1000)
    Theme { index: u8, tint: i16 },

    /// Indexed color (legacy palette)
    Indexed(u8),
}

impl Color {
    /// Black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// White
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Yellow
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: i16) -> Self {
        Color::Theme { index, tint }
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            // Opaque ARGB is stored as plain RGB
            8 => match byte(0)? {
                0xFF => Some(Color::Rgb {
                    r: byte(2)?,
                    g: byte(4)?,
                    b: byte(6)?,
                }),
                a => Some(Color::Argb {
                    a,
                    r: byte(2)?,
                    g: byte(4)?,
                    b: byte(6)?,
                }),
            },
            _ => None,
        }
    }

    /// ARGB hex for `rgb` attributes, or None for non-RGB colors
    pub fn to_argb_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("FF{:02X}{:02X}{:02X}", r, g, b)),
            Color::Argb { a, r, g, b } => Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b)),
            _ => None,
        }
    }

    /// RGB components ignoring alpha, for RGB-based colors
    pub fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => Some((*r, *g, *b)),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => f.write_str("auto"),
            Color::Theme { index, tint } => write!(f, "theme{}({})", index, tint),
            Color::Indexed(i) => write!(f, "indexed{}", i),
            rgb => f.write_str(&rgb.to_argb_hex().unwrap_or_default()),
        }
    }
}
