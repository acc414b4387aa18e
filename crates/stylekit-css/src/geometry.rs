//! Border geometry handed over by the layout engine.
//!
//! [CSS Backgrounds and Borders Level 3 § 4](https://www.w3.org/TR/css-backgrounds-3/#borders)
//!
//! These are plain values with structural equality so they can key the
//! builders' format caches.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::codec::Color;

/// Bit pattern used for equality and hashing; `-0.0` folds into `0.0`.
fn length_bits(value: f64) -> u64 {
    if value == 0.0 { 0 } else { value.to_bits() }
}

/// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

/// One side of a box border.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderEdge {
    /// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width), in points.
    pub width: f64,
    /// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    pub style: BorderStyle,
    /// [§ 4.1 'border-color'](https://www.w3.org/TR/css-backgrounds-3/#border-color)
    pub color: Color,
}

impl BorderEdge {
    /// No border.
    pub const EMPTY: Self = Self::new(0.0, BorderStyle::None, Color::BLACK);

    /// Create an edge.
    pub const fn new(width: f64, style: BorderStyle, color: Color) -> Self {
        Self {
            width,
            style,
            color,
        }
    }

    /// Returns true if the edge paints nothing: style `none` or no width.
    pub fn is_empty(&self) -> bool {
        self.style == BorderStyle::None || self.width <= 0.0
    }
}

impl Default for BorderEdge {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for BorderEdge {
    fn eq(&self, other: &Self) -> bool {
        length_bits(self.width) == length_bits(other.width)
            && self.style == other.style
            && self.color == other.color
    }
}

impl Eq for BorderEdge {}

impl Hash for BorderEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        length_bits(self.width).hash(state);
        self.style.hash(state);
        self.color.hash(state);
    }
}

/// [§ 5.1 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
///
/// The two radii of one rounded corner, in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderCorner {
    /// Horizontal radius.
    pub width: f64,
    /// Vertical radius.
    pub height: f64,
}

impl BorderCorner {
    /// A square corner.
    pub const SQUARE: Self = Self::new(0.0, 0.0);

    /// Create a corner.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if neither radius is positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

impl PartialEq for BorderCorner {
    fn eq(&self, other: &Self) -> bool {
        length_bits(self.width) == length_bits(other.width)
            && length_bits(self.height) == length_bits(other.height)
    }
}

impl Eq for BorderCorner {}

impl Hash for BorderCorner {
    fn hash<H: Hasher>(&self, state: &mut H) {
        length_bits(self.width).hash(state);
        length_bits(self.height).hash(state);
    }
}
