//! Integration tests for declaration rules, merging and the stylesheet tree.

use std::sync::Arc;

use stylekit_css::{
    BuiltinKey, CssValue, DeclarationRule, KeyRegistry, LengthUnit, RuleKind, SimpleValueParser,
    StyleError, StyleSheet, cascade,
};

fn registry() -> Arc<KeyRegistry> {
    Arc::new(KeyRegistry::boot())
}

fn text(rule: &DeclarationRule, key: BuiltinKey) -> Option<String> {
    rule.get_value(rule.registry().key(key))
        .map(|value| value.to_string())
}

#[test]
fn test_merge_overwrites_and_keeps_untouched_slots() {
    let registry = registry();
    let color = registry.key(BuiltinKey::Color);
    let size = registry.key(BuiltinKey::FontSize);

    let mut target = DeclarationRule::new(Arc::clone(&registry));
    target.set_value(color, CssValue::keyword("red"));
    target.set_value(size, CssValue::points(10.0));

    let mut source = DeclarationRule::new(Arc::clone(&registry));
    source.set_value(color, CssValue::keyword("blue"));

    target.merge_from(&source);
    assert_eq!(text(&target, BuiltinKey::Color).as_deref(), Some("blue"));
    assert_eq!(text(&target, BuiltinKey::FontSize).as_deref(), Some("10pt"));
}

#[test]
fn test_merge_important_is_and_of_both_sides() {
    let registry = registry();
    let color = registry.key(BuiltinKey::Color);

    // important source over a normal target: not important
    let mut target = DeclarationRule::new(Arc::clone(&registry));
    target.set_value(color, CssValue::keyword("red"));
    let mut source = DeclarationRule::new(Arc::clone(&registry));
    source.set_important_value(color, CssValue::keyword("blue"));
    target.merge_from(&source);
    assert_eq!(text(&target, BuiltinKey::Color).as_deref(), Some("blue"));
    assert!(!target.is_important(color));

    // important on both sides stays important
    let mut target = DeclarationRule::new(Arc::clone(&registry));
    target.set_important_value(color, CssValue::keyword("red"));
    target.merge_from(&source);
    assert!(target.is_important(color));

    // a normal source clears the flag
    let mut normal = DeclarationRule::new(Arc::clone(&registry));
    normal.set_value(color, CssValue::keyword("green"));
    target.merge_from(&normal);
    assert_eq!(text(&target, BuiltinKey::Color).as_deref(), Some("green"));
    assert!(!target.is_important(color));
}

#[test]
fn test_merge_from_empty_source_changes_nothing() {
    let registry = registry();
    let mut target = DeclarationRule::new(Arc::clone(&registry));
    let source = DeclarationRule::new(Arc::clone(&registry));
    target.merge_from(&source);
    assert!(target.is_empty());
}

#[test]
fn test_remove_value_keeps_important_flag() {
    let registry = registry();
    let color = registry.key(BuiltinKey::Color);
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    rule.set_important_value(color, CssValue::keyword("red"));
    rule.remove_value(color);
    assert!(rule.get_value(color).is_none());
    assert!(rule.is_important(color));
}

#[test]
fn test_clone_is_independent() {
    let registry = registry();
    let color = registry.key(BuiltinKey::Color);
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    rule.set_value(color, CssValue::keyword("red"));
    let copy = rule.clone();
    rule.set_value(color, CssValue::keyword("blue"));
    assert_eq!(text(&copy, BuiltinKey::Color).as_deref(), Some("red"));
}

#[test]
fn test_set_value_from_string_expands_shorthand() {
    let registry = registry();
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    rule.set_value_from_string(
        registry.key(BuiltinKey::Padding),
        "1pt 2pt 3pt !important",
        &SimpleValueParser,
    )
    .unwrap();

    assert_eq!(text(&rule, BuiltinKey::PaddingTop).as_deref(), Some("1pt"));
    assert_eq!(text(&rule, BuiltinKey::PaddingRight).as_deref(), Some("2pt"));
    assert_eq!(text(&rule, BuiltinKey::PaddingBottom).as_deref(), Some("3pt"));
    assert_eq!(text(&rule, BuiltinKey::PaddingLeft).as_deref(), Some("2pt"));
    assert!(rule.is_important(registry.key(BuiltinKey::PaddingLeft)));
    assert!(rule.get_value(registry.key(BuiltinKey::Padding)).is_none());
    assert_eq!(rule.len(), 4);
}

#[test]
fn test_set_value_from_string_parses_single_values() {
    let registry = registry();
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    let parser = SimpleValueParser;
    rule.set_value_from_string(registry.key(BuiltinKey::FontSize), "12px", &parser)
        .unwrap();
    rule.set_value_from_string(
        registry.key(BuiltinKey::FontFamily),
        "\"Open Sans\", serif",
        &parser,
    )
    .unwrap();

    let size = rule.get_value(registry.key(BuiltinKey::FontSize)).unwrap();
    assert_eq!(
        **size,
        CssValue::Length {
            value: 12.0,
            unit: LengthUnit::Px
        }
    );
    assert_eq!(
        text(&rule, BuiltinKey::FontFamily).as_deref(),
        Some("\"Open Sans\", serif")
    );
}

#[test]
fn test_set_value_from_string_tokenizes_css() {
    let registry = registry();
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    let parser = SimpleValueParser;
    rule.set_value_from_string(registry.key(BuiltinKey::Color), "red ! important", &parser)
        .unwrap();
    rule.set_value_from_string(registry.key(BuiltinKey::Padding), "calc(1pt + 2pt)", &parser)
        .unwrap();
    rule.set_value_from_string(
        registry.key(BuiltinKey::FontFamily),
        "\"a\\\"b, c\", serif",
        &parser,
    )
    .unwrap();
    rule.set_value_from_string(registry.key(BuiltinKey::FontSize), "1e1pt", &parser)
        .unwrap();

    assert_eq!(text(&rule, BuiltinKey::Color).as_deref(), Some("red"));
    assert!(rule.is_important(registry.key(BuiltinKey::Color)));
    for side in [
        BuiltinKey::PaddingTop,
        BuiltinKey::PaddingRight,
        BuiltinKey::PaddingBottom,
        BuiltinKey::PaddingLeft,
    ] {
        assert_eq!(text(&rule, side).as_deref(), Some("calc(1pt + 2pt)"));
    }
    assert_eq!(
        text(&rule, BuiltinKey::FontFamily).as_deref(),
        Some("\"a\\\"b, c\", serif")
    );
    assert_eq!(
        **rule.get_value(registry.key(BuiltinKey::FontSize)).unwrap(),
        CssValue::points(10.0)
    );
}

#[test]
fn test_set_value_from_string_rejects_empty_input() {
    let registry = registry();
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    let err = rule
        .set_value_from_string(registry.key(BuiltinKey::Color), "   ", &SimpleValueParser)
        .unwrap_err();
    assert!(matches!(err, StyleError::InvalidValue { .. }));
    assert!(rule.is_empty());
}

#[test]
fn test_iter_yields_set_slots_in_index_order() {
    let registry = registry();
    let mut rule = DeclarationRule::new(Arc::clone(&registry));
    rule.set_value(registry.key(BuiltinKey::Width), CssValue::points(50.0));
    rule.set_important_value(registry.key(BuiltinKey::Color), CssValue::keyword("red"));

    let seen: Vec<(&str, bool)> = rule
        .iter()
        .map(|(key, _, important)| (key.name(), important))
        .collect();
    assert_eq!(seen, vec![("color", true), ("width", false)]);
}

#[test]
fn test_cascade_in_source_order() {
    let registry = registry();
    let color = registry.key(BuiltinKey::Color);
    let mut a = DeclarationRule::new(Arc::clone(&registry));
    a.set_value(color, CssValue::keyword("red"));
    let mut b = DeclarationRule::new(Arc::clone(&registry));
    b.set_value(color, CssValue::keyword("blue"));

    let merged = cascade(&registry, &[&a, &b]);
    assert_eq!(text(&merged, BuiltinKey::Color).as_deref(), Some("blue"));
    let merged = cascade(&registry, &[&b, &a]);
    assert_eq!(text(&merged, BuiltinKey::Color).as_deref(), Some("red"));
}

#[test]
fn test_sheet_cascade_rules() {
    let registry = registry();
    let mut sheet = StyleSheet::new(Arc::clone(&registry));
    let body = sheet.add_rule(RuleKind::Style {
        selectors: vec!["body".to_string()],
    });
    let print = sheet.add_rule(RuleKind::Media {
        media: vec!["print".to_string()],
    });
    let printed_body = sheet.add_nested_rule(
        print,
        RuleKind::Style {
            selectors: vec!["body".to_string()],
        },
    );

    let size = registry.key(BuiltinKey::FontSize);
    sheet
        .rule_mut(body)
        .unwrap()
        .declarations_mut()
        .set_value(size, CssValue::points(10.0));
    sheet
        .rule_mut(printed_body)
        .unwrap()
        .declarations_mut()
        .set_value(size, CssValue::points(9.0));

    let merged = sheet.cascade_rules(&[body, printed_body]);
    assert_eq!(text(&merged, BuiltinKey::FontSize).as_deref(), Some("9pt"));
    assert_eq!(sheet.cascade_order().len(), 3);
    assert_eq!(sheet.rules().len(), 3);
}

#[test]
#[should_panic(expected = "different registries")]
fn test_merge_across_registries_panics() {
    let mut a = DeclarationRule::new(registry());
    let b = DeclarationRule::new(registry());
    a.merge_from(&b);
}
