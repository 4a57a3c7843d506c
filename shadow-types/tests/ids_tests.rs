use proptest::prelude::*;
use serde_json::json;
use shadow_types::{PostId, TermId};
use std::collections::HashSet;
use std::str::FromStr;

// ── PostId ────────────────────────────────────────────────────────

#[test]
fn post_id_display_and_parse() {
    let id = PostId::new(42);
    let parsed = PostId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn post_id_parse_invalid() {
    assert!(PostId::from_str("forty-two").is_err());
}

#[test]
fn post_id_default_is_zero() {
    assert!(PostId::default().is_zero());
    assert!(!PostId::new(7).is_zero());
}

#[test]
fn post_id_hash_and_eq() {
    let mut set = HashSet::new();
    set.insert(PostId::new(3));
    set.insert(PostId::new(3));
    assert_eq!(set.len(), 1);
}

#[test]
fn post_id_serializes_as_bare_integer() {
    let json = serde_json::to_string(&PostId::new(19)).unwrap();
    assert_eq!(json, "19");
}

#[test]
fn coerce_integer() {
    assert_eq!(PostId::coerce(&json!(12)), PostId::new(12));
}

#[test]
fn coerce_numeric_string() {
    assert_eq!(PostId::coerce(&json!("12")), PostId::new(12));
    assert_eq!(PostId::coerce(&json!(" 8 ")), PostId::new(8));
}

#[test]
fn coerce_float_truncates() {
    assert_eq!(PostId::coerce(&json!(4.9)), PostId::new(4));
    assert_eq!(PostId::coerce(&json!("4.9")), PostId::new(4));
}

#[test]
fn coerce_garbage_is_zero() {
    assert!(PostId::coerce(&json!("abc")).is_zero());
    assert!(PostId::coerce(&json!(null)).is_zero());
    assert!(PostId::coerce(&json!([1, 2])).is_zero());
    assert!(PostId::coerce(&json!({"id": 1})).is_zero());
}

#[test]
fn coerce_bool() {
    assert_eq!(PostId::coerce(&json!(true)), PostId::new(1));
    assert!(PostId::coerce(&json!(false)).is_zero());
}

// ── TermId ────────────────────────────────────────────────────────

#[test]
fn term_id_display_and_parse() {
    let id = TermId::new(5);
    assert_eq!(TermId::from_str("5").unwrap(), id);
    assert_eq!(id.to_string(), "5");
}

#[test]
fn term_id_zero_means_absent() {
    assert!(TermId::default().is_zero());
    assert!(TermId::new(0).is_zero());
}

proptest! {
    #[test]
    fn coerce_is_identity_for_integers(n in any::<i64>()) {
        prop_assert_eq!(PostId::coerce(&json!(n)), PostId::new(n));
    }

    #[test]
    fn coerce_parses_integer_strings(n in any::<i64>()) {
        prop_assert_eq!(PostId::coerce(&json!(n.to_string())), PostId::new(n));
    }
}
