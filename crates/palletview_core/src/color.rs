//! RGB colors
//!
//! Scene documents carry colors as 24-bit integers (`0xRRGGBB`). A `"#rrggbb"`
//! string is accepted as well; colors always serialize back as integers.

use serde::{Serialize, Deserialize};

/// RGB color with components in 0.0-1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "u32")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// Create a color from float components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` integer (upper bits are ignored)
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Create a color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Pack into a `0xRRGGBB` integer
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// RGBA array with the given alpha (for GPU upload)
    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Color scaled by an intensity factor
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Parse `#rrggbb`, `0xrrggbb` or bare `rrggbb`
    pub fn parse_hex_str(s: &str) -> Option<Self> {
        let digits = s
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Wire representation of a color
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(u32),
    Text(String),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) => Ok(Color::from_hex(hex)),
            ColorRepr::Text(text) => Color::parse_hex_str(&text)
                .ok_or_else(|| format!("invalid color string '{}'", text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        for hex in [0x000000, 0xffffff, 0x666666, 0x3c8fd0] {
            assert_eq!(Color::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn test_from_hex_channels() {
        let c = Color::from_hex(0xff0080);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_str() {
        assert_eq!(Color::parse_hex_str("#666666"), Some(Color::from_hex(0x666666)));
        assert_eq!(Color::parse_hex_str("0xff0000"), Some(Color::from_hex(0xff0000)));
        assert_eq!(Color::parse_hex_str("#fff"), None);
        assert_eq!(Color::parse_hex_str("zzzzzz"), None);
    }

    #[test]
    fn test_deserialize_integer_and_string() {
        let a: Color = serde_json::from_str("6710886").unwrap();
        let b: Color = serde_json::from_str("\"#666666\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Color::from_hex(0x666666)).unwrap();
        assert_eq!(json, "6710886");
    }
}
