//! Closed color palette with lenient hex parsing.
//!
//! # Responsibility
//! - Map the eight named palette colors to canonical `RRGGBB` hex.
//! - Parse arbitrary user/import hex input without ever failing.
//!
//! # Invariants
//! - `NoteColor::from_hex(h).hex() == normalize_hex(h)` for every
//!   canonical palette hex.
//! - Malformed input falls back to [`NoteColor::Blue`]; rendering code
//!   must always receive a usable color.

use serde::{Deserialize, Serialize};

/// Canonical hex used when no color was ever chosen.
pub const DEFAULT_COLOR_HEX: &str = "007AFF";

/// Palette color attached to categories and subcategories.
///
/// The eight named variants are the closed palette offered by the UI;
/// `Custom` carries anything else a user or an imported document chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteColor {
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Pink,
    Yellow,
    Gray,
    /// Non-palette sRGB color as 8-bit channels.
    Custom(u8, u8, u8),
}

/// Ordered palette table: (color, canonical hex, display name).
const PALETTE: &[(NoteColor, &str, &str)] = &[
    (NoteColor::Blue, "007AFF", "Blue"),
    (NoteColor::Red, "FF0000", "Red"),
    (NoteColor::Green, "00FF00", "Green"),
    (NoteColor::Orange, "FFA500", "Orange"),
    (NoteColor::Purple, "800080", "Purple"),
    (NoteColor::Pink, "FFC0CB", "Pink"),
    (NoteColor::Yellow, "FFFF00", "Yellow"),
    (NoteColor::Gray, "808080", "Gray"),
];

impl NoteColor {
    /// Parses a hex string into a palette color.
    ///
    /// Input is normalized (leading `#` stripped, uppercased) and
    /// matched against the palette. A valid non-palette 6-digit value
    /// becomes `Custom`. Anything malformed falls back to `Blue`
    /// instead of erroring.
    pub fn from_hex(hex: &str) -> Self {
        let Some(normalized) = normalize_hex(hex) else {
            return Self::Blue;
        };

        for (color, palette_hex, _) in PALETTE {
            if *palette_hex == normalized {
                return *color;
            }
        }

        // normalize_hex already guarantees six hex digits.
        let r = u8::from_str_radix(&normalized[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&normalized[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&normalized[4..6], 16).unwrap_or(0);
        Self::Custom(r, g, b)
    }

    /// Canonical `RRGGBB` uppercase hex for this color.
    pub fn hex(&self) -> String {
        for (color, palette_hex, _) in PALETTE {
            if color == self {
                return (*palette_hex).to_string();
            }
        }
        match self {
            Self::Custom(r, g, b) => format!("{r:02X}{g:02X}{b:02X}"),
            // Unit variants are all covered by the palette table.
            _ => DEFAULT_COLOR_HEX.to_string(),
        }
    }

    /// Display name shown next to swatches.
    pub fn name(&self) -> &'static str {
        for (color, _, name) in PALETTE {
            if color == self {
                return name;
            }
        }
        "Custom"
    }

    /// All named palette colors in display order.
    pub fn palette() -> impl Iterator<Item = NoteColor> {
        PALETTE.iter().map(|(color, _, _)| *color)
    }
}

impl Default for NoteColor {
    fn default() -> Self {
        Self::Blue
    }
}

/// Normalizes a hex string to `RRGGBB` uppercase.
///
/// Returns `None` when the input is not exactly six hex digits after
/// stripping an optional leading `#`.
pub fn normalize_hex(hex: &str) -> Option<String> {
    let stripped = hex.trim().trim_start_matches('#');
    if stripped.len() != 6 || !stripped.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(stripped.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{normalize_hex, NoteColor, DEFAULT_COLOR_HEX};

    #[test]
    fn palette_hex_round_trips() {
        for color in NoteColor::palette() {
            let hex = color.hex();
            assert_eq!(NoteColor::from_hex(&hex), color);
            assert_eq!(NoteColor::from_hex(&format!("#{hex}")).hex(), hex);
            assert_eq!(
                NoteColor::from_hex(&hex.to_ascii_lowercase()).hex(),
                hex,
                "lowercase input should normalize for {}",
                color.name()
            );
        }
    }

    #[test]
    fn non_palette_hex_becomes_custom() {
        let color = NoteColor::from_hex("#123abc");
        assert_eq!(color, NoteColor::Custom(0x12, 0x3A, 0xBC));
        assert_eq!(color.hex(), "123ABC");
        assert_eq!(color.name(), "Custom");
    }

    #[test]
    fn malformed_hex_falls_back_to_blue() {
        for bad in ["", "#", "12345", "1234567", "GGGGGG", "red"] {
            assert_eq!(NoteColor::from_hex(bad), NoteColor::Blue, "input {bad:?}");
        }
        assert_eq!(NoteColor::Blue.hex(), DEFAULT_COLOR_HEX);
    }

    #[test]
    fn normalize_rejects_wrong_length_and_non_hex() {
        assert_eq!(normalize_hex(" #ffa500 ").as_deref(), Some("FFA500"));
        assert!(normalize_hex("ffa50").is_none());
        assert!(normalize_hex("zzzzzz").is_none());
    }
}
