//! CSS declaration-list serialization.
//!
//! A style builder collects one formatted declaration per style key for a
//! single visual box and prints them in registry index order, so the output
//! does not depend on the order the caller appended in. Builders are cleared
//! and reused for every box an export worker renders.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::codec::{LengthFormatter, color_to_css_string, encode_css_string};
use crate::config::ExportConfig;
use crate::geometry::{BorderCorner, BorderEdge, BorderStyle};
use crate::keys::{KeyRegistry, StyleKey};
use crate::lfu::LfuCache;

/// Capacity of each border format cache.
pub const BORDER_CACHE_CAPACITY: usize = 30;

/// Indent used before every declaration in pretty output.
const PRETTY_INDENT: &str = "    ";

/// One emittable declaration: `(key, formatted value, unit)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCarrier {
    key: StyleKey,
    value: String,
    unit: Option<String>,
}

impl StyleCarrier {
    /// Create a carrier. `value` must already be safe CSS.
    pub fn new(key: StyleKey, value: impl Into<String>, unit: Option<String>) -> Self {
        Self {
            key,
            value: value.into(),
            unit,
        }
    }

    /// The property.
    pub const fn key(&self) -> &StyleKey {
        &self.key
    }

    /// The formatted value, without unit.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The unit suffix, if any.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(self.key.name());
        out.push_str(": ");
        out.push_str(&self.value);
        if let Some(unit) = &self.unit {
            out.push_str(unit);
        }
    }
}

/// Collects resolved declarations for one box and renders them as CSS.
///
/// Implementors provide [`append_carrier`](Self::append_carrier) and the
/// read/format operations; the `append*` family is built on top of it.
pub trait StyleBuilder {
    /// Store `carrier` in its key's slot.
    ///
    /// With `replace == false` an occupied slot is left untouched.
    fn append_carrier(&mut self, carrier: StyleCarrier, replace: bool);

    /// CSS-escape `value` and store it, replacing any earlier value.
    fn append(&mut self, key: &StyleKey, value: &str) {
        self.append_escaped(key, value, None, true);
    }

    /// Store `value` verbatim. The caller guarantees it is valid CSS.
    fn append_raw(&mut self, key: &StyleKey, value: &str) {
        self.append_carrier(StyleCarrier::new(key.clone(), value, None), true);
    }

    /// Like [`append`](Self::append) with a unit suffix such as `pt`.
    fn append_unit(&mut self, key: &StyleKey, value: &str, unit: &str) {
        self.append_escaped(key, value, Some(unit), true);
    }

    /// Like [`append`](Self::append); with `replace == false` the first
    /// value appended in this cycle wins.
    fn append_with_replace(&mut self, key: &StyleKey, value: &str, replace: bool) {
        self.append_escaped(key, value, None, replace);
    }

    /// Like [`append_unit`](Self::append_unit); with `replace == false` the
    /// first value appended in this cycle wins.
    fn append_unit_with_replace(&mut self, key: &StyleKey, value: &str, unit: &str, replace: bool) {
        self.append_escaped(key, value, Some(unit), replace);
    }

    /// Escape `value` and hand the carrier to
    /// [`append_carrier`](Self::append_carrier).
    fn append_escaped(&mut self, key: &StyleKey, value: &str, unit: Option<&str>, replace: bool) {
        let carrier = StyleCarrier::new(key.clone(), encode_css_string(value), unit.map(str::to_owned));
        self.append_carrier(carrier, replace);
    }

    /// Blank every slot for the next box.
    fn clear(&mut self);

    /// Returns true if no slot is set.
    fn is_empty(&self) -> bool;

    /// The carrier stored for `key`.
    fn get(&self, key: &StyleKey) -> Option<&StyleCarrier>;

    /// Independent copy of the slot table, indexed by key index.
    fn to_array(&self) -> Vec<Option<StyleCarrier>>;

    /// Render the declarations.
    ///
    /// Compact output is `name: value; name: value`. Pretty output puts
    /// every declaration on its own line, indented by four spaces, with
    /// declarations separated by `;`.
    fn to_css_string(&self, compact: bool) -> String;

    /// Write [`to_css_string`](Self::to_css_string) to `writer`.
    ///
    /// # Errors
    /// Returns the writer's error unchanged.
    fn print(&self, writer: &mut dyn io::Write, compact: bool) -> io::Result<()> {
        writer.write_all(self.to_css_string(compact).as_bytes())
    }

    /// Format one border side, e.g. `1pt solid black`, or `none`.
    fn print_edge_as_css(&mut self, edge: &BorderEdge) -> String;

    /// Format one corner's radii, e.g. `4pt 4pt`.
    fn print_corner_as_css(&mut self, corner: &BorderCorner) -> String;

    /// Apply the Safari whole-point rounding when enabled.
    fn fix_length_for_safari(&self, value: f64) -> f64;

    /// Format a length with the builder's number format.
    fn format_length(&self, value: f64) -> String;

    /// The registry the slot table is sized from.
    fn registry(&self) -> &Arc<KeyRegistry>;
}

/// Whole-point rounding for Safari.
///
/// `0` stays `0`; every other value rounds to the nearest integer but never
/// below `1`, because Safari drops fractional-point borders entirely.
#[must_use]
pub fn fix_length_for_safari(value: f64, enabled: bool) -> f64 {
    if !enabled || value == 0.0 {
        return value;
    }
    value.round().max(1.0)
}

/// The standard [`StyleBuilder`].
#[derive(Debug, Clone)]
pub struct DefaultStyleBuilder {
    registry: Arc<KeyRegistry>,
    slots: Vec<Option<StyleCarrier>>,
    edge_cache: LfuCache<BorderEdge, String>,
    corner_cache: LfuCache<BorderCorner, String>,
    formatter: LengthFormatter,
    safari_length_hack: bool,
}

impl DefaultStyleBuilder {
    /// Create a builder with one slot per registered key.
    ///
    /// # Panics
    /// Panics if `registry` is not locked.
    #[must_use]
    pub fn new(registry: Arc<KeyRegistry>, safari_length_hack: bool) -> Self {
        registry.assert_locked();
        let slots = vec![None; registry.key_count()];
        Self {
            registry,
            slots,
            edge_cache: LfuCache::new(BORDER_CACHE_CAPACITY),
            corner_cache: LfuCache::new(BORDER_CACHE_CAPACITY),
            formatter: LengthFormatter::for_safari_hack(safari_length_hack),
            safari_length_hack,
        }
    }

    /// Create a builder honouring `config.safari_length_hack`.
    pub fn with_config(registry: Arc<KeyRegistry>, config: &ExportConfig) -> Self {
        Self::new(registry, config.safari_length_hack)
    }

    /// Whether whole-point rounding is on.
    pub const fn safari_length_hack(&self) -> bool {
        self.safari_length_hack
    }

    /// The border edge format cache.
    pub const fn edge_cache(&self) -> &LfuCache<BorderEdge, String> {
        &self.edge_cache
    }

    /// The border corner format cache.
    pub const fn corner_cache(&self) -> &LfuCache<BorderCorner, String> {
        &self.corner_cache
    }

    fn format_points(&self, value: f64, out: &mut String) {
        self.formatter
            .format_into(fix_length_for_safari(value, self.safari_length_hack), out);
        out.push_str("pt");
    }
}

impl StyleBuilder for DefaultStyleBuilder {
    fn append_carrier(&mut self, carrier: StyleCarrier, replace: bool) {
        self.registry.check_key(carrier.key());
        let slot = &mut self.slots[carrier.key().index().0];
        if replace || slot.is_none() {
            *slot = Some(carrier);
        }
    }

    fn clear(&mut self) {
        self.slots.fill(None);
    }

    fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn get(&self, key: &StyleKey) -> Option<&StyleCarrier> {
        self.registry.check_key(key);
        self.slots[key.index().0].as_ref()
    }

    fn to_array(&self) -> Vec<Option<StyleCarrier>> {
        self.slots.clone()
    }

    fn to_css_string(&self, compact: bool) -> String {
        let mut out = String::new();
        for (i, carrier) in self.slots.iter().flatten().enumerate() {
            if compact {
                if i > 0 {
                    out.push_str("; ");
                }
            } else {
                if i > 0 {
                    out.push(';');
                }
                out.push('\n');
                out.push_str(PRETTY_INDENT);
            }
            carrier.write_to(&mut out);
        }
        out
    }

    fn print_edge_as_css(&mut self, edge: &BorderEdge) -> String {
        if edge.style == BorderStyle::None || edge.width <= 0.0 {
            return "none".to_string();
        }
        if let Some(cached) = self.edge_cache.get(edge) {
            return cached.clone();
        }

        let mut text = String::new();
        self.format_points(edge.width, &mut text);
        text.push(' ');
        text.push_str(&edge.style.to_string());
        text.push(' ');
        text.push_str(&color_to_css_string(edge.color));
        log::trace!("border edge cache miss: {text}");
        self.edge_cache.put(*edge, text.clone());
        text
    }

    fn print_corner_as_css(&mut self, corner: &BorderCorner) -> String {
        if let Some(cached) = self.corner_cache.get(corner) {
            return cached.clone();
        }

        let mut text = String::new();
        self.format_points(corner.width, &mut text);
        text.push(' ');
        self.format_points(corner.height, &mut text);
        log::trace!("border corner cache miss: {text}");
        self.corner_cache.put(*corner, text.clone());
        text
    }

    fn fix_length_for_safari(&self, value: f64) -> f64 {
        fix_length_for_safari(value, self.safari_length_hack)
    }

    fn format_length(&self, value: f64) -> String {
        self.formatter.format(value)
    }

    fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }
}

impl fmt::Display for DefaultStyleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Color;
    use crate::keys::BuiltinKey;

    fn builder(hack: bool) -> DefaultStyleBuilder {
        DefaultStyleBuilder::new(Arc::new(KeyRegistry::boot()), hack)
    }

    #[test]
    fn test_safari_fix() {
        assert_eq!(fix_length_for_safari(0.0, true), 0.0);
        assert_eq!(fix_length_for_safari(0.3, true), 1.0);
        assert_eq!(fix_length_for_safari(2.5, true), 3.0);
        assert_eq!(fix_length_for_safari(1.4, true), 1.0);
        assert_eq!(fix_length_for_safari(0.3, false), 0.3);
    }

    #[test]
    fn test_edge_formatting() {
        let mut b = builder(false);
        let edge = BorderEdge::new(0.5, BorderStyle::Solid, Color::rgb(0x12, 0x34, 0x56));
        assert_eq!(b.print_edge_as_css(&edge), "0.5pt solid #123456");
        assert_eq!(b.edge_cache().len(), 1);
    }

    #[test]
    fn test_edge_formatting_with_hack() {
        let mut b = builder(true);
        let edge = BorderEdge::new(0.25, BorderStyle::Dashed, Color::BLACK);
        assert_eq!(b.print_edge_as_css(&edge), "1pt dashed black");
    }

    #[test]
    fn test_hidden_style_is_printed() {
        let mut b = builder(false);
        let edge = BorderEdge::new(1.0, BorderStyle::Hidden, Color::BLACK);
        assert_eq!(b.print_edge_as_css(&edge), "1pt hidden black");
    }

    #[test]
    fn test_corner_formatting() {
        let mut b = builder(false);
        assert_eq!(
            b.print_corner_as_css(&BorderCorner::new(4.0, 2.25)),
            "4pt 2.25pt"
        );
    }

    #[test]
    fn test_display_is_compact() {
        let mut b = builder(false);
        let registry = Arc::clone(b.registry());
        b.append_unit(registry.key(BuiltinKey::FontSize), "10", "pt");
        b.append(registry.key(BuiltinKey::Color), "red");
        assert_eq!(b.to_string(), "color: red; font-size: 10pt");
    }
}
