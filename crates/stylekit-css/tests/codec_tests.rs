//! Integration tests for CSS escaping, colours, lengths and the LFU cache.

use proptest::prelude::*;
use stylekit_css::{Color, LengthFormatter, LfuCache, color_to_css_string, encode_css_string};

#[test]
fn test_escape_control_and_non_ascii() {
    assert_eq!(encode_css_string("a\nb"), "a\\00000ab");
    assert_eq!(encode_css_string("\t"), "\\000009");
    assert_eq!(encode_css_string("\u{1F600}"), "\\01f600");
    assert_eq!(encode_css_string("\u{2014}"), "\\002014");
}

#[test]
fn test_escape_keeps_printable_ascii() {
    assert_eq!(encode_css_string("Arial Bold 12"), "Arial Bold 12");
    // backslash is inside the pass-through range; DEL is not
    assert_eq!(encode_css_string("a\\b"), "a\\b");
    assert_eq!(encode_css_string("\u{7f}"), "\\00007f");
    assert_eq!(encode_css_string("say \"hi\""), "say \\\"hi\\\"");
    assert_eq!(encode_css_string(""), "");
}

#[test]
fn test_reserved_colors_round_trip_through_keywords() {
    for name in [
        "black", "silver", "gray", "white", "maroon", "red", "purple", "fuchsia", "green", "lime",
        "olive", "yellow", "navy", "blue", "teal", "aqua",
    ] {
        let color = Color::from_named(name).unwrap();
        assert_eq!(color_to_css_string(color), name);
    }
}

#[test]
fn test_aliases_print_as_canonical_keyword() {
    assert_eq!(color_to_css_string(Color::from_named("GREY").unwrap()), "gray");
    assert_eq!(color_to_css_string(Color::from_named("cyan").unwrap()), "aqua");
    assert_eq!(color_to_css_string(Color::from_named("magenta").unwrap()), "fuchsia");
}

#[test]
fn test_non_reserved_colors_print_as_hex() {
    assert_eq!(color_to_css_string(Color::rgb(0xfe, 0, 0)), "#fe0000");
    assert_eq!(color_to_css_string(Color::parse("#ABC").unwrap()), "#aabbcc");
    assert!(Color::parse("#12345").is_none());
    assert!(Color::parse("not-a-colour").is_none());
}

#[test]
fn test_color_serde() {
    let color: Color = serde_json::from_str("\"#102030\"").unwrap();
    assert_eq!(color, Color::rgb(0x10, 0x20, 0x30));
    assert_eq!(serde_json::to_string(&Color::RED).unwrap(), "\"red\"");
    assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
}

#[test]
fn test_length_formatter_digits() {
    let default = LengthFormatter::default();
    assert_eq!(default.format(12.0), "12");
    assert_eq!(default.format(0.125), "0.125");
    assert_eq!(default.format(2.000_04), "2");
    assert_eq!(default.format(-1.5), "-1.5");
    assert_eq!(default.format(f64::NAN), "0");

    let whole = LengthFormatter::for_safari_hack(true);
    assert_eq!(whole.format(2.6), "3");
    assert_eq!(whole.format(-0.2), "0");
}

#[test]
fn test_lfu_keeps_hot_entries() {
    let mut cache = LfuCache::new(2);
    cache.put("a", 1);
    cache.put("b", 2);
    assert_eq!(cache.get(&"a"), Some(&1));
    cache.put("c", 3);

    assert!(cache.contains_key(&"a"));
    assert!(!cache.contains_key(&"b"));
    assert!(cache.contains_key(&"c"));
    assert!(cache.validate());
}

#[test]
fn test_lfu_reput_resets_frequency() {
    let mut cache = LfuCache::new(2);
    cache.put("a", 1);
    cache.put("b", 2);
    let _ = cache.get(&"a");
    let _ = cache.get(&"a");
    cache.put("a", 10);
    assert_eq!(cache.frequency(&"a"), Some(0));

    // "b" and "a" are both cold; "b" was inserted earlier and goes first.
    cache.put("c", 3);
    assert!(!cache.contains_key(&"b"));
    assert_eq!(cache.get(&"a"), Some(&10));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_lfu_clear() {
    let mut cache = LfuCache::new(3);
    cache.put(1, "one");
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.capacity(), 3);
    assert!(cache.validate());
}

#[test]
#[should_panic(expected = "capacity must be at least 1")]
fn test_lfu_zero_capacity_panics() {
    let _ = LfuCache::<u32, u32>::new(0);
}

#[test]
fn test_hex_colour_rejects_signs() {
    assert!(Color::from_hex("#+fff00").is_none());
    assert!(Color::parse("#-12").is_none());
}

proptest! {
    #[test]
    fn prop_escaped_output_is_printable_ascii(s in any::<String>()) {
        let encoded = encode_css_string(&s);
        prop_assert!(encoded.chars().all(|c| (' '..='~').contains(&c)));
    }

    #[test]
    fn prop_escapes_are_six_hex_digits(c in any::<char>()) {
        prop_assume!(!(' '..='~').contains(&c));
        let encoded = encode_css_string(&c.to_string());
        prop_assert_eq!(encoded, format!("\\{:06x}", u32::from(c)));
    }

    #[test]
    fn prop_plain_ascii_is_unchanged(s in "[ !#-~]*") {
        prop_assert_eq!(encode_css_string(&s), s);
    }
}
