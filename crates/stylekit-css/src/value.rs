//! Declared values and the value-parser seam.
//!
//! [`DeclarationRule::set_value_from_string`](crate::DeclarationRule::set_value_from_string)
//! hands raw CSS fragments to a [`CssValueParser`]. [`SimpleValueParser`]
//! tokenizes with `cssparser` and understands single values, comma lists and
//! the box-side shorthands. Property grammars beyond that are out of scope.

use std::fmt;
use std::str::FromStr;

use cssparser::{
    BasicParseErrorKind, Delimiter, ParseError, ParseErrorKind, Parser, ParserInput, Token,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::codec::{Color, LengthFormatter, color_to_css_string, encode_css_string_into};
use crate::error::{Result, StyleError};
use crate::keys::{KeyRegistry, StyleKey};
use stylekit_common::warning::warn_once;

/// [CSS Values Level 4 § 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LengthUnit {
    Pt,
    Px,
    Em,
    Rem,
    Mm,
    Cm,
    In,
    Pc,
}

/// A declared value.
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    /// An identifier such as `bold` or `inherit`.
    Keyword(String),
    /// A number with a unit.
    Length {
        /// Magnitude.
        value: f64,
        /// Unit.
        unit: LengthUnit,
    },
    /// A unitless number.
    Number(f64),
    /// A percentage, stored as the number before `%`.
    Percentage(f64),
    /// A colour.
    Color(Color),
    /// A quoted string, stored unescaped.
    String(String),
    /// A comma separated list (font families).
    List(Vec<CssValue>),
    /// Anything kept verbatim.
    Raw(String),
}

impl CssValue {
    /// Shorthand for a point length.
    pub const fn points(value: f64) -> Self {
        Self::Length {
            value,
            unit: LengthUnit::Pt,
        }
    }

    /// Shorthand for a keyword.
    pub fn keyword(name: &str) -> Self {
        Self::Keyword(name.to_string())
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatter = LengthFormatter::default();
        match self {
            Self::Keyword(text) | Self::Raw(text) => f.write_str(text),
            Self::Length { value, unit } => write!(f, "{}{unit}", formatter.format(*value)),
            Self::Number(value) => f.write_str(&formatter.format(*value)),
            Self::Percentage(value) => write!(f, "{}%", formatter.format(*value)),
            Self::Color(color) => f.write_str(&color_to_css_string(*color)),
            Self::String(text) => {
                let mut quoted = String::with_capacity(text.len() + 2);
                quoted.push('"');
                encode_css_string_into(text, &mut quoted);
                quoted.push('"');
                f.write_str(&quoted)
            }
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// One `(key, value, important)` triple produced by a parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDeclaration {
    /// Target property.
    pub key: StyleKey,
    /// Parsed value.
    pub value: CssValue,
    /// Whether `!important` was present.
    pub important: bool,
}

/// Turns a raw CSS fragment into declarations.
///
/// A shorthand may expand into several keys.
pub trait CssValueParser {
    /// Parse `raw` as the value of `key`.
    ///
    /// # Errors
    /// Returns [`StyleError::InvalidValue`] for text the parser cannot read,
    /// or [`StyleError::UnknownKey`] if an expansion names an unregistered key.
    fn parse(
        &self,
        registry: &KeyRegistry,
        key: &StyleKey,
        raw: &str,
    ) -> Result<Vec<ParsedDeclaration>>;
}

/// Parser for single values, comma lists and the `padding`/`margin`
/// shorthands, tokenized with `cssparser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleValueParser;

impl CssValueParser for SimpleValueParser {
    fn parse(
        &self,
        registry: &KeyRegistry,
        key: &StyleKey,
        raw: &str,
    ) -> Result<Vec<ParsedDeclaration>> {
        let mut input = ParserInput::new(raw);
        let mut parser = Parser::new(&mut input);
        let (mut groups, important) = parse_declaration_value(key, &mut parser)
            .map_err(|error| parse_error(key, raw, &error))?;

        if let Some(longhands) = box_side_longhands(key.name()) {
            let [group] = <[ComponentGroup; 1]>::try_from(groups)
                .map_err(|_| invalid(key, raw, "unexpected comma"))?;
            let [top, right, bottom, left] = expand_box_sides(group.values)
                .ok_or_else(|| invalid(key, raw, "expected one to four values"))?;
            return longhands
                .iter()
                .zip([top, right, bottom, left])
                .map(|(name, value)| -> Result<ParsedDeclaration> {
                    let key = registry
                        .find_key_by_name(name)
                        .ok_or_else(|| StyleError::UnknownKey {
                            name: (*name).to_string(),
                        })?;
                    Ok(ParsedDeclaration {
                        key: key.clone(),
                        value,
                        important,
                    })
                })
                .collect();
        }

        let value = if groups.len() == 1 {
            groups.swap_remove(0).into_value()
        } else {
            CssValue::List(groups.into_iter().map(ComponentGroup::into_value).collect())
        };
        Ok(vec![ParsedDeclaration {
            key: key.clone(),
            value,
            important,
        }])
    }
}

/// Custom errors carry a static reason.
type ValueParseError<'i> = ParseError<'i, &'static str>;

/// The component values between two top-level commas.
struct ComponentGroup {
    /// Source text of the whole group, trimmed.
    text: String,
    values: Vec<CssValue>,
}

impl ComponentGroup {
    /// A lone component stands for itself; anything longer stays verbatim.
    fn into_value(mut self) -> CssValue {
        match (self.values.pop(), self.values.is_empty()) {
            (Some(value), true) => value,
            _ => CssValue::Raw(self.text),
        }
    }
}

fn invalid(key: &StyleKey, value: &str, reason: &str) -> StyleError {
    StyleError::InvalidValue {
        key: key.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_error(key: &StyleKey, raw: &str, error: &ValueParseError<'_>) -> StyleError {
    let reason = match &error.kind {
        ParseErrorKind::Custom(reason) => (*reason).to_string(),
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {token:?}")
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_string()
        }
        ParseErrorKind::Basic(_) => "malformed value".to_string(),
    };
    invalid(key, raw, &reason)
}

/// `<value> [ ! important ]?`, with the value split on top-level commas.
fn parse_declaration_value<'i>(
    key: &StyleKey,
    input: &mut Parser<'i, '_>,
) -> std::result::Result<(Vec<ComponentGroup>, bool), ValueParseError<'i>> {
    let groups = input.parse_until_before(Delimiter::Bang, |value| {
        value.parse_comma_separated(|item| parse_group(key, item))
    })?;
    let important = input.try_parse(cssparser::parse_important).is_ok();
    input.expect_exhausted()?;
    Ok((groups, important))
}

fn parse_group<'i>(
    key: &StyleKey,
    input: &mut Parser<'i, '_>,
) -> std::result::Result<ComponentGroup, ValueParseError<'i>> {
    let start = input.position();
    let mut values = Vec::new();
    while !input.is_exhausted() {
        values.push(parse_component(key, input)?);
    }
    if values.is_empty() {
        return Err(input.new_custom_error("empty value"));
    }
    Ok(ComponentGroup {
        text: input.slice_from(start).trim().to_string(),
        values,
    })
}

/// Read one component value. Functions and blocks are kept as source text.
fn parse_component<'i>(
    key: &StyleKey,
    input: &mut Parser<'i, '_>,
) -> std::result::Result<CssValue, ValueParseError<'i>> {
    let location = input.current_source_location();
    let start = input.position();
    let token = input.next()?.clone();
    let value = match token {
        Token::Dimension { value, unit, .. } => match LengthUnit::from_str(unit.as_ref()) {
            Ok(unit) => CssValue::Length {
                value: f64::from(value),
                unit,
            },
            Err(_) => {
                let text = input.slice_from(start).trim();
                warn_once(
                    "CSS",
                    &format!("unsupported unit '{}' in {}: {text}", &*unit, key.name()),
                );
                CssValue::Raw(text.to_string())
            }
        },
        Token::Number { value, .. } => CssValue::Number(f64::from(value)),
        Token::Percentage { unit_value, .. } => CssValue::Percentage(f64::from(unit_value) * 100.0),
        Token::Hash(hex) | Token::IDHash(hex) => match Color::from_hex(&hex) {
            Some(color) => CssValue::Color(color),
            None => return Err(location.new_custom_error("malformed hex colour")),
        },
        Token::Ident(name) => Color::from_named(&name)
            .map_or_else(|| CssValue::Keyword(name.to_string()), CssValue::Color),
        Token::QuotedString(text) => CssValue::String(text.to_string()),
        Token::Function(_)
        | Token::ParenthesisBlock
        | Token::SquareBracketBlock
        | Token::CurlyBracketBlock => {
            input.parse_nested_block(|nested| {
                while nested.next().is_ok() {}
                Ok::<_, ValueParseError<'i>>(())
            })?;
            CssValue::Raw(input.slice_from(start).trim().to_string())
        }
        bad @ (Token::BadString(_)
        | Token::BadUrl(_)
        | Token::Semicolon
        | Token::CloseParenthesis
        | Token::CloseSquareBracket
        | Token::CloseCurlyBracket) => return Err(location.new_unexpected_token_error(bad)),
        _ => CssValue::Raw(input.slice_from(start).trim().to_string()),
    };
    Ok(value)
}

fn box_side_longhands(name: &str) -> Option<[&'static str; 4]> {
    match name {
        "padding" => Some(["padding-top", "padding-right", "padding-bottom", "padding-left"]),
        "margin" => Some(["margin-top", "margin-right", "margin-bottom", "margin-left"]),
        _ => None,
    }
}

/// [CSS Box Model Level 3 § 3](https://www.w3.org/TR/css-box-3/#margins)
///
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom are set to the first value and the
/// right and left are set to the second. If there are three values, the top
/// is set to the first value, the left and right are set to the second, and
/// the bottom is set to the third."
fn expand_box_sides(values: Vec<CssValue>) -> Option<[CssValue; 4]> {
    let mut values = values.into_iter();
    match (values.next(), values.next(), values.next(), values.next(), values.next()) {
        (Some(all), None, None, None, None) => {
            Some([all.clone(), all.clone(), all.clone(), all])
        }
        (Some(vertical), Some(horizontal), None, None, None) => {
            Some([vertical.clone(), horizontal.clone(), vertical, horizontal])
        }
        (Some(top), Some(horizontal), Some(bottom), None, None) => {
            Some([top, horizontal.clone(), bottom, horizontal])
        }
        (Some(top), Some(right), Some(bottom), Some(left), None) => {
            Some([top, right, bottom, left])
        }
        _ => None,
    }
}
