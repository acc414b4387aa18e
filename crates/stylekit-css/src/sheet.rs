//! Stylesheet and rule tree.
//!
//! A [`StyleSheet`] owns its rules in an arena indexed by [`RuleId`], plus
//! any imported child sheets. Rules refer to their parent rule by id; these
//! back-references are for read-only context lookups such as "which media
//! block am I in", never for mutating the parent.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::declaration::{DeclarationRule, cascade};
use crate::keys::KeyRegistry;

/// A type-safe index into a stylesheet's rule arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub usize);

/// [CSS Paged Media Level 3 § 5.3](https://www.w3.org/TR/css-page-3/#margin-boxes)
///
/// The page margin boxes a page-area rule can target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum PageArea {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// What kind of rule a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// A selector rule.
    Style {
        /// Raw selector texts.
        selectors: Vec<String>,
    },
    /// `@page [name][:pseudo]`
    Page {
        /// Named page type.
        name: Option<String>,
        /// `:first`, `:left`, `:right`.
        pseudo: Option<String>,
    },
    /// A margin box inside an `@page` rule.
    PageArea {
        /// The targeted area.
        area: PageArea,
    },
    /// `@media` block.
    Media {
        /// Media query list.
        media: Vec<String>,
    },
    /// `@font-face`
    FontFace,
}

/// One rule node.
#[derive(Debug, Clone)]
pub struct StyleRule {
    id: RuleId,
    kind: RuleKind,
    parent: Option<RuleId>,
    children: Vec<RuleId>,
    declarations: DeclarationRule,
}

impl StyleRule {
    /// This rule's id in its sheet.
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// The rule kind.
    pub const fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// The enclosing rule, if nested.
    pub const fn parent(&self) -> Option<RuleId> {
        self.parent
    }

    /// Nested rules in document order.
    pub fn children(&self) -> &[RuleId] {
        &self.children
    }

    /// The rule's declarations.
    pub const fn declarations(&self) -> &DeclarationRule {
        &self.declarations
    }

    /// Mutable access to the declarations.
    pub const fn declarations_mut(&mut self) -> &mut DeclarationRule {
        &mut self.declarations
    }
}

/// [CSSOM § 6.1 CSS Style Sheets](https://www.w3.org/TR/cssom-1/#css-style-sheets)
#[derive(Debug, Clone)]
pub struct StyleSheet {
    registry: Arc<KeyRegistry>,
    href: Option<String>,
    rules: Vec<StyleRule>,
    top_level: Vec<RuleId>,
    imports: Vec<StyleSheet>,
    namespaces: HashMap<String, String>,
}

impl StyleSheet {
    /// Create an empty sheet.
    ///
    /// # Panics
    /// Panics if `registry` is not locked.
    pub fn new(registry: Arc<KeyRegistry>) -> Self {
        registry.assert_locked();
        Self {
            registry,
            href: None,
            rules: Vec::new(),
            top_level: Vec::new(),
            imports: Vec::new(),
            namespaces: HashMap::new(),
        }
    }

    /// Create an empty sheet loaded from `href`.
    pub fn with_href(registry: Arc<KeyRegistry>, href: impl Into<String>) -> Self {
        let mut sheet = Self::new(registry);
        sheet.href = Some(href.into());
        sheet
    }

    /// Where the sheet came from, if anywhere.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// The registry every rule's declarations are sized from.
    pub const fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    fn alloc(&mut self, kind: RuleKind, parent: Option<RuleId>) -> RuleId {
        let id = RuleId(self.rules.len());
        self.rules.push(StyleRule {
            id,
            kind,
            parent,
            children: Vec::new(),
            declarations: DeclarationRule::new(Arc::clone(&self.registry)),
        });
        id
    }

    /// Append a top-level rule.
    pub fn add_rule(&mut self, kind: RuleKind) -> RuleId {
        let id = self.alloc(kind, None);
        self.top_level.push(id);
        id
    }

    /// Append a rule nested inside `parent`.
    ///
    /// # Panics
    /// Panics if `parent` is not a rule of this sheet.
    pub fn add_nested_rule(&mut self, parent: RuleId, kind: RuleKind) -> RuleId {
        assert!(parent.0 < self.rules.len(), "unknown parent rule {parent:?}");
        let id = self.alloc(kind, Some(parent));
        self.rules[parent.0].children.push(id);
        id
    }

    /// Look up a rule.
    pub fn rule(&self, id: RuleId) -> Option<&StyleRule> {
        self.rules.get(id.0)
    }

    /// Look up a rule for editing its declarations.
    pub fn rule_mut(&mut self, id: RuleId) -> Option<&mut StyleRule> {
        self.rules.get_mut(id.0)
    }

    /// The rule enclosing `id`.
    pub fn parent_rule(&self, id: RuleId) -> Option<&StyleRule> {
        self.rule(id)?.parent.and_then(|parent| self.rule(parent))
    }

    /// Enclosing rules of `id`, innermost first.
    pub fn ancestors(&self, id: RuleId) -> impl Iterator<Item = &StyleRule> + '_ {
        std::iter::successors(self.parent_rule(id), move |rule| self.parent_rule(rule.id))
    }

    /// Media list of the innermost `@media` block around `id`.
    pub fn enclosing_media(&self, id: RuleId) -> Option<&[String]> {
        self.ancestors(id).find_map(|rule| match &rule.kind {
            RuleKind::Media { media } => Some(media.as_slice()),
            _ => None,
        })
    }

    /// Every rule of this sheet in allocation order.
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Top-level rules in document order.
    pub fn top_level_rules(&self) -> impl Iterator<Item = &StyleRule> + '_ {
        self.top_level.iter().filter_map(|&id| self.rule(id))
    }

    /// Attach an imported sheet. Imports cascade before this sheet's rules.
    ///
    /// # Panics
    /// Panics if `sheet` was built against a different registry.
    pub fn add_import(&mut self, sheet: Self) {
        assert!(
            Arc::ptr_eq(&self.registry, &sheet.registry),
            "imported stylesheet uses a different key registry"
        );
        self.imports.push(sheet);
    }

    /// Imported sheets in import order.
    pub fn imports(&self) -> &[Self] {
        &self.imports
    }

    /// [CSS Namespaces § 3](https://www.w3.org/TR/css-namespaces-3/#declaration)
    ///
    /// Bind `prefix` to `uri`; the empty prefix is the default namespace.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let _ = self.namespaces.insert(prefix.into(), uri.into());
    }

    /// The URI bound to `prefix` in this sheet.
    pub fn resolve_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Every rule in cascade order: imports first (recursively), then this
    /// sheet's rules depth-first in document order.
    pub fn cascade_order(&self) -> Vec<&StyleRule> {
        let mut out = Vec::with_capacity(self.rules.len());
        for import in &self.imports {
            out.extend(import.cascade_order());
        }
        for &id in &self.top_level {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    fn collect_subtree<'a>(&'a self, id: RuleId, out: &mut Vec<&'a StyleRule>) {
        let Some(rule) = self.rule(id) else { return };
        out.push(rule);
        for &child in &rule.children {
            self.collect_subtree(child, out);
        }
    }

    /// Merge the declarations of `ids` in the order given.
    pub fn cascade_rules(&self, ids: &[RuleId]) -> DeclarationRule {
        let rules: Vec<&DeclarationRule> = ids
            .iter()
            .filter_map(|&id| self.rule(id))
            .map(StyleRule::declarations)
            .collect();
        cascade(&self.registry, &rules)
    }
}
