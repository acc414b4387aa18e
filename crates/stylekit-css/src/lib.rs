//! Style-key cascade storage and CSS serialization for HTML report export.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style keys** ([`keys`])
//!   - A registry interning every visual property into a dense index
//!   - The built-in CSS property table, locked at boot
//!
//! - **Declarations and cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Per-rule property tables with `!important` flags
//!   - Rule merging in source order
//!   - A stylesheet rule tree with imports, `@media`, `@page` and namespaces
//!
//! - **Serialization** ([CSSOM § 6.7 Serializing CSS Values](https://www.w3.org/TR/cssom-1/#serializing-css-values))
//!   - CSS string escaping
//!   - Colour keywords and hex colours
//!   - Locale-independent length formatting
//!   - Per-box declaration builders with cached border formatting
//!   - An inheritance filter that drops values the parent already carries
//!
//! # Not Yet Implemented
//!
//! - Selector parsing and matching
//! - Property grammars beyond single values, comma lists and box-side shorthands

/// Declaration builders per [CSSOM § 6.6.2 CSS Declaration Blocks](https://www.w3.org/TR/cssom-1/#css-declaration-blocks).
pub mod builder;
/// CSS string escaping, colours and length formatting.
pub mod codec;
/// Export configuration flags.
pub mod config;
/// Declaration tables and cascade merge per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod declaration;
/// Error types.
pub mod error;
/// Resolved box styles to builder calls.
pub mod factory;
/// Inheritance-aware builder decorator per [CSS Cascading Level 4 § 7.2](https://www.w3.org/TR/css-cascade-4/#inheriting).
pub mod filter;
/// Border edge and corner value types per [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/).
pub mod geometry;
/// Style key registry.
pub mod keys;
/// Least-frequently-used cache.
pub mod lfu;
/// Stylesheet rule tree per [CSSOM § 6.1](https://www.w3.org/TR/cssom-1/#css-style-sheets).
pub mod sheet;
/// Declared values and the value-parser seam per [CSS Values Level 4](https://www.w3.org/TR/css-values-4/).
pub mod value;

pub use builder::{DefaultStyleBuilder, StyleBuilder, StyleCarrier};
pub use codec::{Color, LengthFormatter, color_to_css_string, encode_css_string};
pub use config::ExportConfig;
pub use declaration::{DeclarationRule, cascade};
pub use error::{Result, StyleError};
pub use factory::{ResolvedStyle, StyleBuilderFactory, WhitespaceMode};
pub use filter::FilterStyleBuilder;
pub use geometry::{BorderCorner, BorderEdge, BorderStyle};
pub use keys::{BuiltinKey, KeyContext, KeyIndex, KeyRegistry, StyleKey};
pub use lfu::LfuCache;
pub use sheet::{RuleId, RuleKind, StyleRule, StyleSheet};
pub use value::{CssValue, CssValueParser, LengthUnit, SimpleValueParser};
