//! Hex color parsing for font colors and solid backgrounds.

use std::sync::LazyLock;

use image::Rgba;
use regex::Regex;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);

    /// Parse a full hex color: `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let value = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::from_u32(value))
            }
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Self(channels))
            }
            _ => None,
        }
    }

    /// Find the first run of six hex digits anywhere in `s`.
    ///
    /// Background specs are classified with this: `"#AA00FF"` and
    /// `"color-aa00ff"` both select a solid canvas.
    pub fn find_hex6(s: &str) -> Option<Self> {
        static RE_HEX6: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"[0-9A-Fa-f]{6}").unwrap());

        let found = RE_HEX6.find(s)?;
        let value = u32::from_str_radix(found.as_str(), 16).ok()?;
        Some(Self::from_u32(value))
    }

    const fn from_u32(value: u32) -> Self {
        Self([
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ])
    }

    #[inline]
    pub const fn rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }

    /// `#rrggbb` form, used as an SVG paint value.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_six_digits() {
        assert_eq!(Rgb::from_hex("#ffffff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("AA00FF"), Some(Rgb([0xaa, 0x00, 0xff])));
        assert_eq!(Rgb::from_hex(" #102030 "), Some(Rgb([0x10, 0x20, 0x30])));
    }

    #[test]
    fn test_from_hex_shorthand() {
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#a0f"), Some(Rgb([0xaa, 0x00, 0xff])));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(Rgb::from_hex("white"), None);
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gggggg"), None);
        assert_eq!(Rgb::from_hex(""), None);
    }

    #[test]
    fn test_find_hex6_anywhere() {
        assert_eq!(Rgb::find_hex6("#AA00FF"), Some(Rgb([0xaa, 0x00, 0xff])));
        assert_eq!(Rgb::find_hex6("color: 000000;"), Some(Rgb::BLACK));
        assert_eq!(Rgb::find_hex6("images/bg.png"), None);
        assert_eq!(Rgb::find_hex6("#fff"), None);
    }

    #[test]
    fn test_to_hex_roundtrip_form() {
        assert_eq!(Rgb([0xaa, 0x00, 0xff]).to_hex(), "#aa00ff");
        assert_eq!(Rgb::BLACK.rgba(), Rgba([0, 0, 0, 255]));
    }
}
