//! 8-bit RGBA colors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels as unit floats, in r, g, b, a order.
    pub fn to_unit(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a].map(|c| f64::from(c) / 255.0)
    }

    /// Build from unit floats; out-of-range channels are clamped.
    pub fn from_unit(r: f64, g: f64, b: f64, a: f64) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(q(r), q(g), q(b), q(a))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color::from_hex("#1a2b3c").unwrap();
        assert_eq!(c, Color::rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_hex(), "#1a2b3c");

        let translucent = Color::from_hex("ff000080").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#ff000080");
    }

    #[test]
    fn rejects_bad_hex() {
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn unit_conversion_is_lossless_for_8bit() {
        for v in [0u8, 1, 127, 128, 200, 255] {
            let c = Color::rgba(v, 255 - v, v / 2, 255);
            let [r, g, b, a] = c.to_unit();
            assert_eq!(Color::from_unit(r, g, b, a), c);
        }
    }
}
