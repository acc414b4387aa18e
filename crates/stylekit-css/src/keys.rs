//! Style key interning.
//!
//! Every visual property the exporter knows about is interned once at boot
//! into a [`KeyRegistry`], which hands out a dense [`KeyIndex`] per name.
//! Declaration rules and style builders size their slot tables from the
//! locked registry's key count and index them directly, so the registry must
//! never grow after [`KeyRegistry::lock`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock};

use bitflags::bitflags;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::error::{Result, StyleError};
use stylekit_common::warning::warn_once;

bitflags! {
    /// Element contexts in which a style key is meaningful.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyContext: u32 {
        /// Inline-level content (text runs, spans).
        const INLINE = 1;
        /// Block-level boxes.
        const BLOCK = 1 << 1;
        /// Table rows, sections and cells.
        const TABLE = 1 << 2;
        /// Page boxes (`@page`).
        const PAGE = 1 << 3;
        /// Page margin areas (`@top-left` and friends).
        const PAGE_MARGIN = 1 << 4;
        /// Generated content (`::before`, `::after`).
        const PSEUDO_ELEMENT = 1 << 5;
        /// Every context.
        const ALL = Self::INLINE.bits()
            | Self::BLOCK.bits()
            | Self::TABLE.bits()
            | Self::PAGE.bits()
            | Self::PAGE_MARGIN.bits()
            | Self::PSEUDO_ELEMENT.bits();
    }
}

/// A type-safe index into registry-sized slot tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyIndex(pub usize);

/// Identity of the registry a key was minted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RegistryId(u32);

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

impl RegistryId {
    fn next() -> Self {
        Self(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable identity of one style property.
///
/// Keys are cheap to clone; the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleKey {
    name: Arc<str>,
    index: KeyIndex,
    transient: bool,
    inherited: bool,
    validity: KeyContext,
    registry: RegistryId,
}

impl StyleKey {
    /// The CSS property name, e.g. `font-size`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dense index assigned at registration.
    pub const fn index(&self) -> KeyIndex {
        self.index
    }

    /// Computed temporaries are never persisted.
    pub const fn is_transient(&self) -> bool {
        self.transient
    }

    /// Whether the value propagates to descendant elements.
    pub const fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// Contexts in which this key is meaningful.
    pub const fn validity(&self) -> KeyContext {
        self.validity
    }

    /// Returns true if the key applies to any of the given contexts.
    pub const fn is_valid_in(&self, context: KeyContext) -> bool {
        self.validity.intersects(context)
    }
}

/// The compile-time table of keys every registry is booted with.
///
/// Declaration order is registration order, so on a booted registry
/// `BuiltinKey::X as usize` equals the index of `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum BuiltinKey {
    Color,
    BackgroundColor,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    TextDecoration,
    TextAlign,
    VerticalAlign,
    WhiteSpace,
    LetterSpacing,
    WordSpacing,
    LineHeight,
    TextIndent,
    Direction,
    Padding,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    Margin,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderLeft,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,
    Width,
    Height,
    Overflow,
    Display,
    Visibility,
    #[strum(serialize = "-stylekit-computed-font-size")]
    ComputedFontSize,
}

impl BuiltinKey {
    /// The CSS property name this key is registered under.
    pub fn css_name(self) -> &'static str {
        self.into()
    }

    /// [CSS Cascading Level 4 § 7.1](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    /// "Some properties are inherited from an ancestor element to its descendants."
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Color
                | Self::FontFamily
                | Self::FontSize
                | Self::FontWeight
                | Self::FontStyle
                | Self::TextDecoration
                | Self::TextAlign
                | Self::WhiteSpace
                | Self::LetterSpacing
                | Self::WordSpacing
                | Self::LineHeight
                | Self::TextIndent
                | Self::Direction
                | Self::Visibility
                | Self::ComputedFontSize
        )
    }

    /// Only the computed font size is a temporary.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::ComputedFontSize)
    }

    /// Contexts the key applies to.
    pub const fn validity(self) -> KeyContext {
        match self {
            Self::TextAlign | Self::TextIndent => KeyContext::BLOCK
                .union(KeyContext::TABLE)
                .union(KeyContext::PAGE_MARGIN),
            Self::VerticalAlign => KeyContext::INLINE.union(KeyContext::TABLE),
            Self::Width | Self::Height | Self::Overflow => KeyContext::BLOCK
                .union(KeyContext::TABLE)
                .union(KeyContext::PAGE)
                .union(KeyContext::PAGE_MARGIN),
            Self::Margin
            | Self::MarginTop
            | Self::MarginRight
            | Self::MarginBottom
            | Self::MarginLeft => KeyContext::ALL.difference(KeyContext::TABLE),
            _ => KeyContext::ALL,
        }
    }
}

/// Owns the name <-> key <-> index bijection.
///
/// Indices form a dense `0..key_count()` range. Once locked the registry is
/// immutable and may be shared read-only by any number of export workers.
#[derive(Debug)]
pub struct KeyRegistry {
    id: RegistryId,
    keys: Vec<StyleKey>,
    by_name: HashMap<Arc<str>, KeyIndex>,
    locked: bool,
}

static SHARED: LazyLock<Arc<KeyRegistry>> = LazyLock::new(|| Arc::new(KeyRegistry::boot()));

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRegistry {
    /// Create an empty, unlocked registry.
    pub fn new() -> Self {
        Self {
            id: RegistryId::next(),
            keys: Vec::new(),
            by_name: HashMap::new(),
            locked: false,
        }
    }

    /// Create a registry holding every [`BuiltinKey`], already locked.
    #[must_use]
    pub fn boot() -> Self {
        let mut registry = Self::new();
        for builtin in BuiltinKey::iter() {
            let _ = registry.insert_key(
                builtin.css_name(),
                builtin.is_transient(),
                builtin.is_inherited(),
                builtin.validity(),
            );
        }
        registry.lock();
        log::debug!("booted style key registry with {} keys", registry.key_count());
        registry
    }

    /// The process-wide booted registry.
    ///
    /// Initialized on first use; every caller shares the same instance.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Register every [`BuiltinKey`] on an unlocked registry.
    ///
    /// Lets callers add project-specific keys next to the built-in set
    /// before locking.
    ///
    /// # Errors
    /// Returns [`StyleError::RegistryLocked`] if the registry is locked.
    pub fn register_builtin_keys(&mut self) -> Result<()> {
        for builtin in BuiltinKey::iter() {
            let _ = self.create_key(
                builtin.css_name(),
                builtin.is_transient(),
                builtin.is_inherited(),
                builtin.validity(),
            )?;
        }
        Ok(())
    }

    /// Intern a key, or return the existing key of the same name.
    ///
    /// # Errors
    /// Returns [`StyleError::RegistryLocked`] once [`lock`](Self::lock) was called.
    pub fn create_key(
        &mut self,
        name: &str,
        transient: bool,
        inherited: bool,
        validity: KeyContext,
    ) -> Result<StyleKey> {
        if self.locked {
            log::error!("attempt to register style key '{name}' after the registry was locked");
            return Err(StyleError::RegistryLocked {
                name: name.to_string(),
            });
        }
        Ok(self.insert_key(name, transient, inherited, validity))
    }

    fn insert_key(
        &mut self,
        name: &str,
        transient: bool,
        inherited: bool,
        validity: KeyContext,
    ) -> StyleKey {
        if let Some(&index) = self.by_name.get(name) {
            let existing = &self.keys[index.0];
            if existing.transient != transient
                || existing.inherited != inherited
                || existing.validity != validity
            {
                warn_once(
                    "KEYS",
                    &format!("style key '{name}' re-registered with different flags; keeping the first"),
                );
            }
            return existing.clone();
        }

        let index = KeyIndex(self.keys.len());
        let name: Arc<str> = Arc::from(name);
        let key = StyleKey {
            name: Arc::clone(&name),
            index,
            transient,
            inherited,
            validity,
            registry: self.id,
        };
        self.keys.push(key.clone());
        let _ = self.by_name.insert(name, index);
        key
    }

    /// Look a key up by its CSS property name.
    #[must_use]
    pub fn find_key_by_name(&self, name: &str) -> Option<&StyleKey> {
        self.by_name.get(name).map(|index| &self.keys[index.0])
    }

    /// Look a key up by index.
    pub fn get(&self, index: KeyIndex) -> Option<&StyleKey> {
        self.keys.get(index.0)
    }

    /// The registered key for a built-in property.
    ///
    /// # Panics
    /// Panics if the registry was built without the built-in table.
    pub fn key(&self, builtin: BuiltinKey) -> &StyleKey {
        self.find_key_by_name(builtin.css_name()).unwrap_or_else(|| {
            panic!(
                "style key registry has no built-in key '{}'",
                builtin.css_name()
            )
        })
    }

    /// Freeze the registry. Irreversible.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether [`lock`](Self::lock) has been called.
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of registered keys; slot tables are sized from this.
    pub const fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// All keys in index order.
    pub fn all_keys(&self) -> &[StyleKey] {
        &self.keys
    }

    /// Returns true if `key` was minted by this registry.
    pub fn owns(&self, key: &StyleKey) -> bool {
        key.registry == self.id && key.index.0 < self.keys.len()
    }

    /// Fail fast on a key minted by a different registry.
    ///
    /// # Panics
    /// Panics if `key` does not belong to this registry.
    pub fn check_key(&self, key: &StyleKey) {
        assert!(
            self.owns(key),
            "style key '{}' (index {}) does not belong to this registry",
            key.name,
            key.index.0
        );
    }

    /// Panic unless the registry is locked.
    ///
    /// # Panics
    /// Panics if the registry can still grow.
    pub(crate) fn assert_locked(&self) {
        assert!(
            self.locked,
            "style key registry must be locked before sizing slot tables"
        );
    }
}
