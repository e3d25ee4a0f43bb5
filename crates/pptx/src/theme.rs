//! Named color themes.
//!
//! The table is built once (normally via [`ThemeTable::builtin`]) and handed
//! to the renderer; there is no process-wide theme state.

use std::collections::BTreeMap;

/// Theme used when a requested name is not in the table.
pub const FALLBACK_THEME: &str = "technical";

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex form used by DrawingML `srgbClr` (e.g. "2E5090").
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: Rgb,
    pub text: Rgb,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub code_background: Rgb,
}

impl ColorScheme {
    /// Dark text on white.
    pub const LIGHT: ColorScheme = ColorScheme {
        background: Rgb(0xFF, 0xFF, 0xFF),
        text: Rgb(0x33, 0x33, 0x33),
        primary: Rgb(0x2E, 0x50, 0x90),
        secondary: Rgb(0xFF, 0x6B, 0x6B),
        accent: Rgb(0x4E, 0xCD, 0xC4),
        code_background: Rgb(0xF5, 0xF5, 0xF5),
    };

    /// White text on charcoal.
    pub const DARK: ColorScheme = ColorScheme {
        background: Rgb(0x1E, 0x1E, 0x1E),
        text: Rgb(0xFF, 0xFF, 0xFF),
        primary: Rgb(0x4E, 0xCD, 0xC4),
        secondary: Rgb(0xFF, 0x6B, 0x6B),
        accent: Rgb(0xFF, 0xE6, 0x6D),
        code_background: Rgb(0x2D, 0x2D, 0x2D),
    };

    /// GitHub-dark style palette.
    pub const TECHNICAL: ColorScheme = ColorScheme {
        background: Rgb(0x0D, 0x11, 0x17),
        text: Rgb(0xE6, 0xED, 0xF3),
        primary: Rgb(0x58, 0xA6, 0xFF),
        secondary: Rgb(0x79, 0xC0, 0xFF),
        accent: Rgb(0x79, 0xC0, 0xFF),
        code_background: Rgb(0x0D, 0x11, 0x17),
    };
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::LIGHT
    }
}

/// Immutable mapping from theme name to colors.
#[derive(Debug, Clone)]
pub struct ThemeTable {
    schemes: BTreeMap<String, ColorScheme>,
}

impl ThemeTable {
    /// The built-in `light`, `dark` and `technical` themes.
    pub fn builtin() -> Self {
        let schemes = [
            ("light", ColorScheme::LIGHT),
            ("dark", ColorScheme::DARK),
            ("technical", ColorScheme::TECHNICAL),
        ]
        .into_iter()
        .map(|(name, scheme)| (name.to_string(), scheme))
        .collect();

        Self { schemes }
    }

    /// Look up a theme by exact name.
    pub fn get(&self, name: &str) -> Option<&ColorScheme> {
        self.schemes.get(name)
    }

    /// Look up a theme, falling back to [`FALLBACK_THEME`] for unknown names.
    pub fn resolve(&self, name: &str) -> ColorScheme {
        match self.get(name) {
            Some(scheme) => *scheme,
            None => {
                log::warn!("Unknown theme '{}', using '{}'", name, FALLBACK_THEME);
                self.get(FALLBACK_THEME).copied().unwrap_or_default()
            }
        }
    }

    /// Theme names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
