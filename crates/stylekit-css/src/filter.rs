//! Inheritance-aware builder decorator.
//!
//! Nested rich text repeats the same inherited font and colour values on
//! every level. [`FilterStyleBuilder`] drops an inherited declaration when the
//! enclosing element already carries the identical one, since HTML
//! inheritance supplies it anyway.

use std::io;
use std::sync::Arc;

use crate::builder::{DefaultStyleBuilder, StyleBuilder, StyleCarrier};
use crate::geometry::{BorderCorner, BorderEdge};
use crate::keys::{KeyRegistry, StyleKey};

/// Wraps a builder and filters inherited declarations against a parent
/// snapshot taken with [`StyleBuilder::to_array`].
#[derive(Debug, Clone)]
pub struct FilterStyleBuilder<B = DefaultStyleBuilder> {
    inner: B,
    parent: Option<Vec<Option<StyleCarrier>>>,
}

impl<B: StyleBuilder> FilterStyleBuilder<B> {
    /// Wrap `inner`. Without a parent snapshot every call passes through.
    pub const fn new(inner: B, parent: Option<Vec<Option<StyleCarrier>>>) -> Self {
        Self { inner, parent }
    }

    /// Replace the parent snapshot.
    pub fn set_parent(&mut self, parent: Option<Vec<Option<StyleCarrier>>>) {
        self.parent = parent;
    }

    /// The parent snapshot.
    pub fn parent(&self) -> Option<&[Option<StyleCarrier>]> {
        self.parent.as_deref()
    }

    /// The wrapped builder.
    pub const fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwrap.
    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Returns true if the parent already carries this exact declaration.
    fn is_inherited_unchanged(&self, carrier: &StyleCarrier) -> bool {
        if !carrier.key().is_inherited() {
            return false;
        }
        let Some(parent) = &self.parent else {
            return false;
        };
        parent
            .get(carrier.key().index().0)
            .and_then(Option::as_ref)
            .is_some_and(|inherited| inherited == carrier)
    }
}

impl<B: StyleBuilder> StyleBuilder for FilterStyleBuilder<B> {
    fn append_carrier(&mut self, carrier: StyleCarrier, replace: bool) {
        if self.is_inherited_unchanged(&carrier) {
            log::trace!("skipping inherited {}: {}", carrier.key().name(), carrier.value());
            return;
        }
        self.inner.append_carrier(carrier, replace);
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn get(&self, key: &StyleKey) -> Option<&StyleCarrier> {
        self.inner.get(key)
    }

    fn to_array(&self) -> Vec<Option<StyleCarrier>> {
        self.inner.to_array()
    }

    fn to_css_string(&self, compact: bool) -> String {
        self.inner.to_css_string(compact)
    }

    fn print(&self, writer: &mut dyn io::Write, compact: bool) -> io::Result<()> {
        self.inner.print(writer, compact)
    }

    fn print_edge_as_css(&mut self, edge: &BorderEdge) -> String {
        self.inner.print_edge_as_css(edge)
    }

    fn print_corner_as_css(&mut self, corner: &BorderCorner) -> String {
        self.inner.print_corner_as_css(corner)
    }

    fn fix_length_for_safari(&self, value: f64) -> f64 {
        self.inner.fix_length_for_safari(value)
    }

    fn format_length(&self, value: f64) -> String {
        self.inner.format_length(value)
    }

    fn registry(&self) -> &Arc<KeyRegistry> {
        self.inner.registry()
    }
}
