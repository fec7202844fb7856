//! Color values for fills, strokes and legend swatches.

use std::{fmt, str::FromStr};

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// Simple RGB color, serialized as a CSS hex string (`#rrggbb`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const GRAY: Color = Color::rgb(0x66, 0x66, 0x66);

    /// Neutral fill for regions without a joined value.
    pub const NO_DATA: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Build from a packed `0xRRGGBB` literal.
    #[inline]
    pub const fn from_u32(v: u32) -> Self { Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8) }

    /// Parse `#rrggbb` or the short `#rgb` form (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        ensure!(
            digits.chars().all(|c| c.is_ascii_hexdigit()),
            "[Color::from_hex] invalid hex color {hex:?}"
        );

        match digits.len() {
            6 => {
                Ok(Self::from_u32(u32::from_str_radix(digits, 16)?))
            }
            3 => {
                let v = u32::from_str_radix(digits, 16)?;
                let expand = |nibble: u32| (nibble & 0xf) as u8 * 17;
                Ok(Self::rgb(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => bail!("[Color::from_hex] expected 3 or 6 hex digits, got {hex:?}"),
        }
    }
}

impl fmt::Display for Color {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> { Self::from_hex(s) }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> { Self::from_hex(&value) }
}

impl From<Color> for String {
    fn from(color: Color) -> Self { color.to_string() }
}
