//! Turns a box's resolved style record into builder calls.
//!
//! The layout engine decides which values apply to a box; this module only
//! maps them onto CSS properties and applies the export policies from
//! [`ExportConfig`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::builder::{DefaultStyleBuilder, StyleBuilder, StyleCarrier};
use crate::codec::{Color, color_to_css_string, encode_css_string_into};
use crate::config::ExportConfig;
use crate::filter::FilterStyleBuilder;
use crate::geometry::{BorderCorner, BorderEdge};
use crate::keys::{BuiltinKey, KeyRegistry};

/// [CSS Text Level 3 § 7.1 'text-align'](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// [CSS 2.1 § 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum VerticalAlign {
    Baseline,
    Top,
    Middle,
    Bottom,
    Sub,
    Super,
}

/// How the layout engine treated whitespace in a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespaceMode {
    /// Runs of whitespace collapse; lines wrap.
    Collapse,
    /// Whitespace is kept as authored.
    Preserve,
    /// Spaces collapse, line breaks are kept.
    PreserveBreaks,
    /// Spaces collapse; lines never wrap.
    NoWrap,
}

/// Lengths for the four sides of a box, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// The same length on every side.
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Border geometry of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct BoxBorder {
    pub top: BorderEdge,
    pub right: BorderEdge,
    pub bottom: BorderEdge,
    pub left: BorderEdge,
    pub top_left: BorderCorner,
    pub top_right: BorderCorner,
    pub bottom_right: BorderCorner,
    pub bottom_left: BorderCorner,
}

impl BoxBorder {
    /// The same edge on all four sides, square corners.
    pub const fn uniform(edge: BorderEdge) -> Self {
        Self {
            top: edge,
            right: edge,
            bottom: edge,
            left: edge,
            top_left: BorderCorner::SQUARE,
            top_right: BorderCorner::SQUARE,
            bottom_right: BorderCorner::SQUARE,
            bottom_left: BorderCorner::SQUARE,
        }
    }
}

/// The resolved style of one visual box. Lengths are in points; `None`
/// means the layout engine has nothing to say and nothing is emitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ResolvedStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    pub text_align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub white_space: Option<WhitespaceMode>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub text_indent: Option<f64>,
    pub padding: Option<Insets>,
    pub border: Option<BoxBorder>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Creates builders and feeds them resolved styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleBuilderFactory {
    config: ExportConfig,
}

impl StyleBuilderFactory {
    /// Create a factory for one export job.
    #[must_use]
    pub const fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The job's configuration.
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// A fresh builder for one export worker.
    pub fn create_builder(&self, registry: Arc<KeyRegistry>) -> DefaultStyleBuilder {
        DefaultStyleBuilder::with_config(registry, &self.config)
    }

    /// A fresh builder that drops declarations already inherited from
    /// `parent`.
    pub fn create_filtered_builder(
        &self,
        registry: Arc<KeyRegistry>,
        parent: Option<Vec<Option<StyleCarrier>>>,
    ) -> FilterStyleBuilder {
        FilterStyleBuilder::new(self.create_builder(registry), parent)
    }

    /// Emit everything `style` carries.
    pub fn produce(&self, builder: &mut dyn StyleBuilder, style: &ResolvedStyle) {
        self.produce_text_style(builder, style);
        self.produce_box_style(builder, style);
    }

    /// Emit font, colour, alignment and whitespace properties.
    pub fn produce_text_style(&self, builder: &mut dyn StyleBuilder, style: &ResolvedStyle) {
        let registry = Arc::clone(builder.registry());

        if let Some(family) = &style.font_family {
            let mut quoted = String::with_capacity(family.len() + 2);
            quoted.push('"');
            encode_css_string_into(family, &mut quoted);
            quoted.push('"');
            builder.append_raw(registry.key(BuiltinKey::FontFamily), &quoted);
        }
        if let Some(size) = style.font_size {
            let text = builder.format_length(size);
            builder.append_unit(registry.key(BuiltinKey::FontSize), &text, "pt");
        }
        if let Some(bold) = style.bold {
            let weight = if bold { "bold" } else { "normal" };
            builder.append(registry.key(BuiltinKey::FontWeight), weight);
        }
        if let Some(italic) = style.italic {
            let font_style = if italic { "italic" } else { "normal" };
            builder.append(registry.key(BuiltinKey::FontStyle), font_style);
        }
        if style.underline.is_some() || style.strikethrough.is_some() {
            let decoration = match (
                style.underline.unwrap_or(false),
                style.strikethrough.unwrap_or(false),
            ) {
                (true, true) => "underline line-through",
                (true, false) => "underline",
                (false, true) => "line-through",
                (false, false) => "none",
            };
            builder.append(registry.key(BuiltinKey::TextDecoration), decoration);
        }
        if let Some(color) = style.color {
            builder.append(registry.key(BuiltinKey::Color), &color_to_css_string(color));
        }
        if let Some(color) = style.background_color {
            builder.append(
                registry.key(BuiltinKey::BackgroundColor),
                &color_to_css_string(color),
            );
        }
        if let Some(align) = style.text_align {
            builder.append(registry.key(BuiltinKey::TextAlign), &align.to_string());
        }
        if let Some(align) = style.vertical_align {
            builder.append(registry.key(BuiltinKey::VerticalAlign), &align.to_string());
        }
        if let Some(mode) = style.white_space {
            builder.append(registry.key(BuiltinKey::WhiteSpace), self.white_space(mode));
        }
        for (key, value) in [
            (BuiltinKey::LetterSpacing, style.letter_spacing),
            (BuiltinKey::LineHeight, style.line_height),
            (BuiltinKey::TextIndent, style.text_indent),
        ] {
            if let Some(value) = value {
                let text = builder.format_length(value);
                builder.append_unit(registry.key(key), &text, "pt");
            }
        }
    }

    /// Emit padding, borders, corner radii and box size.
    pub fn produce_box_style(&self, builder: &mut dyn StyleBuilder, style: &ResolvedStyle) {
        let registry = Arc::clone(builder.registry());

        if let Some(padding) = style.padding {
            for (key, value) in [
                (BuiltinKey::PaddingTop, padding.top),
                (BuiltinKey::PaddingRight, padding.right),
                (BuiltinKey::PaddingBottom, padding.bottom),
                (BuiltinKey::PaddingLeft, padding.left),
            ] {
                append_box_length(builder, &registry, key, value);
            }
        }

        if let Some(border) = &style.border {
            for (key, edge) in [
                (BuiltinKey::BorderTop, &border.top),
                (BuiltinKey::BorderRight, &border.right),
                (BuiltinKey::BorderBottom, &border.bottom),
                (BuiltinKey::BorderLeft, &border.left),
            ] {
                if !edge.is_empty() {
                    let text = builder.print_edge_as_css(edge);
                    builder.append_raw(registry.key(key), &text);
                }
            }

            if self.config.enable_round_border_corner {
                for (key, corner) in [
                    (BuiltinKey::BorderTopLeftRadius, &border.top_left),
                    (BuiltinKey::BorderTopRightRadius, &border.top_right),
                    (BuiltinKey::BorderBottomRightRadius, &border.bottom_right),
                    (BuiltinKey::BorderBottomLeftRadius, &border.bottom_left),
                ] {
                    if !corner.is_empty() {
                        let text = builder.print_corner_as_css(corner);
                        builder.append_raw(registry.key(key), &text);
                    }
                }
            }
        }

        if let Some(width) = style.width {
            append_box_length(builder, &registry, BuiltinKey::Width, width);
        }
        if let Some(height) = style.height {
            append_box_length(builder, &registry, BuiltinKey::Height, height);
        }
    }

    /// The `white-space` keyword for `mode` under this job's policy.
    pub const fn white_space(&self, mode: WhitespaceMode) -> &'static str {
        match mode {
            WhitespaceMode::Collapse => "normal",
            WhitespaceMode::Preserve if self.config.use_whitespace_pre_wrap => "pre-wrap",
            WhitespaceMode::Preserve => "pre",
            WhitespaceMode::PreserveBreaks => "pre-line",
            WhitespaceMode::NoWrap => "nowrap",
        }
    }
}

/// Box lengths go through the Safari rounding; text metrics do not.
fn append_box_length(
    builder: &mut dyn StyleBuilder,
    registry: &KeyRegistry,
    key: BuiltinKey,
    value: f64,
) {
    let fixed = builder.fix_length_for_safari(value);
    let text = builder.format_length(fixed);
    builder.append_unit(registry.key(key), &text, "pt");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BorderStyle;

    fn render(config: ExportConfig, style: &ResolvedStyle) -> String {
        let factory = StyleBuilderFactory::new(config);
        let mut builder = factory.create_builder(Arc::new(KeyRegistry::boot()));
        factory.produce(&mut builder, style);
        builder.to_css_string(true)
    }

    #[test]
    fn test_whitespace_policy() {
        let style = ResolvedStyle {
            white_space: Some(WhitespaceMode::Preserve),
            ..Default::default()
        };
        assert_eq!(render(ExportConfig::default(), &style), "white-space: pre");
        let config = ExportConfig {
            use_whitespace_pre_wrap: true,
            ..Default::default()
        };
        assert_eq!(render(config, &style), "white-space: pre-wrap");
    }

    #[test]
    fn test_font_family_is_quoted() {
        let style = ResolvedStyle {
            font_family: Some("Sans \"Pro\"".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(ExportConfig::default(), &style),
            "font-family: \"Sans \\\"Pro\\\"\""
        );
    }

    #[test]
    fn test_corners_need_the_flag() {
        let mut border = BoxBorder::uniform(BorderEdge::new(1.0, BorderStyle::Solid, Color::BLACK));
        border.top_left = BorderCorner::new(3.0, 3.0);
        let style = ResolvedStyle {
            border: Some(border),
            ..Default::default()
        };
        assert!(!render(ExportConfig::default(), &style).contains("radius"));
        let config = ExportConfig {
            enable_round_border_corner: true,
            ..Default::default()
        };
        assert!(render(config, &style).contains("border-top-left-radius: 3pt 3pt"));
    }

    #[test]
    fn test_empty_edges_are_skipped() {
        let style = ResolvedStyle {
            border: Some(BoxBorder::default()),
            ..Default::default()
        };
        assert_eq!(render(ExportConfig::default(), &style), "");
    }
}
