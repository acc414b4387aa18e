//! Export configuration flags.
//!
//! The flags arrive as `"true"`/`"false"` strings from the surrounding
//! application's property store and are read once, when builders are made.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StyleError};

/// Property enabling whole-point lengths for Safari.
pub const SAFARI_LENGTH_HACK: &str = "stylekit.html.SafariLengthHack";
/// Property selecting `pre-wrap` over `pre` for preserved whitespace.
pub const USE_WHITESPACE_PRE_WRAP: &str = "stylekit.html.UseWhitespacePreWrap";
/// Property enabling `border-*-radius` output.
pub const ENABLE_ROUND_BORDER_CORNER: &str = "stylekit.html.EnableRoundBorderCorner";

/// Flags consumed by [`StyleBuilderFactory`](crate::StyleBuilderFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Round every non-zero length to a whole point, never below 1pt.
    pub safari_length_hack: bool,
    /// Emit `white-space: pre-wrap` instead of `pre`.
    pub use_whitespace_pre_wrap: bool,
    /// Emit rounded corner radii.
    pub enable_round_border_corner: bool,
}

impl ExportConfig {
    /// Read the flags from a property map. Missing properties are `false`.
    ///
    /// # Errors
    /// Returns [`StyleError::InvalidConfig`] for anything other than
    /// `true`/`false` (case-insensitive).
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let flag = |key: &str| -> Result<bool> {
            properties
                .get(key)
                .map_or(Ok(false), |value| parse_flag(key, value))
        };
        Ok(Self {
            safari_length_hack: flag(SAFARI_LENGTH_HACK)?,
            use_whitespace_pre_wrap: flag(USE_WHITESPACE_PRE_WRAP)?,
            enable_round_border_corner: flag(ENABLE_ROUND_BORDER_CORNER)?,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(StyleError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
