//! CSS text codecs
//!
//! - String escaping for CSS string literals
//! - Colour values and the reserved colour keywords
//! - Locale-independent length formatting
//!
//! - [CSS Syntax Level 3 § 2.1 Escaping](https://www.w3.org/TR/css-syntax-3/#escaping)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StyleError;

// ─────────────────────────────────────────────────────────────────────────────
// String escaping
// ─────────────────────────────────────────────────────────────────────────────

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Two lowercase hex digits for every byte value.
static HEX_TABLE: [[u8; 2]; 256] = build_hex_table();

const fn build_hex_table() -> [[u8; 2]; 256] {
    let mut table = [[0u8; 2]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [HEX_DIGITS[i >> 4], HEX_DIGITS[i & 0x0f]];
        i += 1;
    }
    table
}

/// Escape `s` for use inside a double-quoted CSS string.
///
/// `"` becomes `\"`, printable 7-bit ASCII (0x20-0x7E) is copied as-is, and
/// every other character becomes a backslash followed by exactly six hex
/// digits of its code point. DEL (0x7F) is a control character and is
/// escaped.
#[must_use]
pub fn encode_css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    encode_css_string_into(s, &mut out);
    out
}

/// Like [`encode_css_string`], appending to an existing buffer.
pub fn encode_css_string_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\u{20}'..='\u{7e}' => out.push(ch),
            _ => {
                // [§ 2.1](https://www.w3.org/TR/css-syntax-3/#escaping)
                // "at most 6 hex digits"; using all six means no terminating
                // space is needed.
                let [_, high, mid, low] = u32::from(ch).to_be_bytes();
                out.push('\\');
                for byte in [high, mid, low] {
                    let [hi, lo] = HEX_TABLE[usize::from(byte)];
                    out.push(char::from(hi));
                    out.push(char::from(lo));
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Colours
// ─────────────────────────────────────────────────────────────────────────────

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

#[allow(missing_docs)]
impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const SILVER: Self = Self::rgb(192, 192, 192);
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const MAROON: Self = Self::rgb(128, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const PURPLE: Self = Self::rgb(128, 0, 128);
    pub const FUCHSIA: Self = Self::rgb(255, 0, 255);
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    pub const LIME: Self = Self::rgb(0, 255, 0);
    pub const OLIVE: Self = Self::rgb(128, 128, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const NAVY: Self = Self::rgb(0, 0, 128);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const TEAL: Self = Self::rgb(0, 128, 128);
    pub const AQUA: Self = Self::rgb(0, 255, 255);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The sixteen HTML 4 colours, in the order HTML lists them.
const RESERVED_COLORS: [(Color, &str); 16] = [
    (Color::BLACK, "black"),
    (Color::SILVER, "silver"),
    (Color::GRAY, "gray"),
    (Color::WHITE, "white"),
    (Color::MAROON, "maroon"),
    (Color::RED, "red"),
    (Color::PURPLE, "purple"),
    (Color::FUCHSIA, "fuchsia"),
    (Color::GREEN, "green"),
    (Color::LIME, "lime"),
    (Color::OLIVE, "olive"),
    (Color::YELLOW, "yellow"),
    (Color::NAVY, "navy"),
    (Color::BLUE, "blue"),
    (Color::TEAL, "teal"),
    (Color::AQUA, "aqua"),
];

impl Color {
    /// Create an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // [§ 4.2.1]
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The sixteen reserved keywords, their common aliases and `transparent`.
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "grey" => Some(Self::GRAY),
            "cyan" => Some(Self::AQUA),
            "magenta" => Some(Self::FUCHSIA),
            "transparent" => Some(Self::TRANSPARENT),
            _ => RESERVED_COLORS
                .iter()
                .find(|(_, keyword)| *keyword == name)
                .map(|(color, _)| *color),
        }
    }

    /// Parse `#hex` or a keyword.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            Self::from_hex(text)
        } else {
            Self::from_named(text)
        }
    }

    /// Lowercase `#rrggbb`, ignoring alpha.
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Render a colour the way HTML export expects it.
///
/// The sixteen reserved colours become their keyword; anything else becomes
/// `#rrggbb`.
#[must_use]
pub fn color_to_css_string(color: Color) -> String {
    RESERVED_COLORS
        .iter()
        .find(|(reserved, _)| *reserved == color)
        .map_or_else(|| color.to_hex_string(), |(_, keyword)| (*keyword).to_string())
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&color_to_css_string(*self))
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text).ok_or_else(|| StyleError::InvalidValue {
            key: "color".to_string(),
            value: text,
            reason: "expected #hex or a colour keyword".to_string(),
        })
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color_to_css_string(color)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Length formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Formats lengths with a fixed `.` separator and no exponent.
///
/// Up to `max_fraction_digits` decimals are kept, trailing zeros are dropped
/// and negative zero prints as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthFormatter {
    max_fraction_digits: usize,
}

impl LengthFormatter {
    /// A formatter keeping at most `max_fraction_digits` decimals.
    pub const fn new(max_fraction_digits: usize) -> Self {
        Self {
            max_fraction_digits,
        }
    }

    /// Whole points when the Safari hack is on, four decimals otherwise.
    pub const fn for_safari_hack(enabled: bool) -> Self {
        if enabled { Self::new(0) } else { Self::new(4) }
    }

    /// Maximum number of decimals printed.
    pub const fn max_fraction_digits(&self) -> usize {
        self.max_fraction_digits
    }

    /// Format `value` into a new string.
    pub fn format(&self, value: f64) -> String {
        let mut out = String::new();
        self.format_into(value, &mut out);
        out
    }

    /// Format `value`, appending to `out`.
    pub fn format_into(&self, value: f64, out: &mut String) {
        if !value.is_finite() {
            out.push('0');
            return;
        }
        let text = format!("{value:.prec$}", prec = self.max_fraction_digits);
        let text = if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.')
        } else {
            text.as_str()
        };
        if text == "-0" {
            out.push('0');
        } else {
            out.push_str(text);
        }
    }
}

impl Default for LengthFormatter {
    fn default() -> Self {
        Self::for_safari_hack(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain_ascii_passes_through() {
        assert_eq!(encode_css_string("Arial Bold"), "Arial Bold");
        assert_eq!(encode_css_string("a\\b"), "a\\b");
    }

    #[test]
    fn test_encode_quote() {
        assert_eq!(encode_css_string("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_encode_non_ascii_uses_six_hex_digits() {
        assert_eq!(encode_css_string("é"), "\\0000e9");
        assert_eq!(encode_css_string("€"), "\\0020ac");
        assert_eq!(encode_css_string("😀"), "\\01f600");
        assert_eq!(encode_css_string("a\nb"), "a\\00000ab");
        assert_eq!(encode_css_string("\u{7f}"), "\\00007f");
    }

    #[test]
    fn test_hex_table() {
        assert_eq!(HEX_TABLE[0], *b"00");
        assert_eq!(HEX_TABLE[0xab], *b"ab");
        assert_eq!(HEX_TABLE[255], *b"ff");
    }

    #[test]
    fn test_reserved_colors_map_to_keywords() {
        for (color, keyword) in RESERVED_COLORS {
            assert_eq!(color_to_css_string(color), keyword);
        }
    }

    #[test]
    fn test_other_colors_are_hex() {
        assert_eq!(color_to_css_string(Color::rgb(0x12, 0x34, 0x56)), "#123456");
        assert_eq!(color_to_css_string(Color::rgb(1, 2, 3)), "#010203");
        // Alpha breaks the keyword match.
        let translucent = Color { a: 128, ..Color::RED };
        assert_eq!(color_to_css_string(translucent), "#ff0000");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#f00"), Some(Color::RED));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::LIME));
        assert_eq!(Color::from_hex("#FfA500"), Some(Color::rgb(255, 165, 0)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#é0"), None);
        assert_eq!(Color::from_hex("#+fff00"), None);
        assert_eq!(Color::from_hex("-ff"), None);
    }

    #[test]
    fn test_from_named() {
        assert_eq!(Color::from_named("BLACK"), Some(Color::BLACK));
        assert_eq!(Color::from_named("grey"), Some(Color::GRAY));
        assert_eq!(Color::from_named("unknown"), None);
    }

    #[test]
    fn test_length_formatter() {
        let f = LengthFormatter::for_safari_hack(false);
        assert_eq!(f.format(1.0), "1");
        assert_eq!(f.format(0.5), "0.5");
        assert_eq!(f.format(1.234_56), "1.2346");
        assert_eq!(f.format(-0.000_01), "0");
        assert_eq!(f.format(12_345_678.0), "12345678");

        let hack = LengthFormatter::for_safari_hack(true);
        assert_eq!(hack.format(2.0), "2");
        assert_eq!(hack.format(1.4), "1");
    }
}
