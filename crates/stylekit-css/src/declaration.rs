//! Per-rule declaration storage and rule-to-rule merging.
//!
//! A [`DeclarationRule`] is a dense table with one value slot and one
//! important flag per registered key. The table is allocated on first write
//! and sized from the locked registry, so indexing by [`KeyIndex`] never
//! needs to grow it.

use std::sync::Arc;

use crate::error::Result;
use crate::keys::{KeyIndex, KeyRegistry, StyleKey};
use crate::value::{CssValue, CssValueParser};

/// One rule's property table.
#[derive(Debug, Clone)]
pub struct DeclarationRule {
    registry: Arc<KeyRegistry>,
    values: Vec<Option<Arc<CssValue>>>,
    important: Vec<bool>,
}

impl DeclarationRule {
    /// Create an empty rule. Nothing is allocated until the first write.
    ///
    /// # Panics
    /// Panics if `registry` is not locked.
    pub fn new(registry: Arc<KeyRegistry>) -> Self {
        registry.assert_locked();
        Self {
            registry,
            values: Vec::new(),
            important: Vec::new(),
        }
    }

    /// The registry the slot table is sized from.
    pub const fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    fn ensure_allocated(&mut self) {
        if self.values.is_empty() {
            let count = self.registry.key_count();
            self.values = vec![None; count];
            self.important = vec![false; count];
        }
    }

    fn slot(&self, key: &StyleKey) -> usize {
        self.registry.check_key(key);
        key.index().0
    }

    /// Store a normal (non-important) value.
    pub fn set_value(&mut self, key: &StyleKey, value: impl Into<Arc<CssValue>>) {
        self.set_value_with_priority(key, value, false);
    }

    /// Store a value declared `!important`.
    pub fn set_important_value(&mut self, key: &StyleKey, value: impl Into<Arc<CssValue>>) {
        self.set_value_with_priority(key, value, true);
    }

    /// Store a value and its important flag.
    pub fn set_value_with_priority(
        &mut self,
        key: &StyleKey,
        value: impl Into<Arc<CssValue>>,
        important: bool,
    ) {
        let slot = self.slot(key);
        self.ensure_allocated();
        self.values[slot] = Some(value.into());
        self.important[slot] = important;
    }

    /// The value stored for `key`, if any.
    pub fn get_value(&self, key: &StyleKey) -> Option<&Arc<CssValue>> {
        let slot = self.slot(key);
        self.values.get(slot).and_then(Option::as_ref)
    }

    /// Whether `key` was declared `!important`. False when unset.
    pub fn is_important(&self, key: &StyleKey) -> bool {
        let slot = self.slot(key);
        self.important.get(slot).copied().unwrap_or(false)
    }

    /// Empty the value slot for `key`.
    ///
    /// The important flag is left as it was.
    pub fn remove_value(&mut self, key: &StyleKey) {
        let slot = self.slot(key);
        if let Some(value) = self.values.get_mut(slot) {
            *value = None;
        }
    }

    /// Parse a raw CSS fragment and store every declaration it expands to.
    ///
    /// Nothing is stored if any part fails to parse.
    ///
    /// # Errors
    /// Propagates the parser's error.
    pub fn set_value_from_string(
        &mut self,
        key: &StyleKey,
        raw: &str,
        parser: &dyn CssValueParser,
    ) -> Result<()> {
        self.registry.check_key(key);
        let declarations = parser.parse(&self.registry, key, raw)?;
        for declaration in declarations {
            self.set_value_with_priority(&declaration.key, declaration.value, declaration.important);
        }
        Ok(())
    }

    /// Reset every slot, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.values.fill(None);
        self.important.fill(false);
    }

    /// True iff nothing was ever written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots holding a value.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Set slots in key index order as `(key, value, important)`.
    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &Arc<CssValue>, bool)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(move |(index, value)| {
                let value = value.as_ref()?;
                let key = self.registry.get(KeyIndex(index))?;
                Some((key, value, self.important[index]))
            })
    }

    /// Merge `source` into this rule.
    ///
    /// Every value `source` holds overwrites the value here. The resulting
    /// important flag is the AND of both sides' flags, so a slot only stays
    /// important if both rules declared it important.
    ///
    /// # Panics
    /// Panics if the two rules use different registries.
    pub fn merge_from(&mut self, source: &Self) {
        assert!(
            Arc::ptr_eq(&self.registry, &source.registry),
            "cannot merge declaration rules built against different registries"
        );
        if source.is_empty() {
            return;
        }
        self.ensure_allocated();
        for (index, value) in source.values.iter().enumerate() {
            if let Some(value) = value {
                self.values[index] = Some(Arc::clone(value));
                self.important[index] = source.important[index] && self.important[index];
            }
        }
    }
}

/// Fold `rules` in source order into one rule, later rules winning.
#[must_use]
pub fn cascade(registry: &Arc<KeyRegistry>, rules: &[&DeclarationRule]) -> DeclarationRule {
    let mut result = DeclarationRule::new(Arc::clone(registry));
    for rule in rules {
        result.merge_from(rule);
    }
    result
}
