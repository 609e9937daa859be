use oxc::syntax::identifier;

use crate::concat_string;

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

/// Quotes `value` as a JavaScript string literal.
pub fn js_string_literal(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_validate_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", js_string_literal(prop), "]")
  }
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
}

#[test]
fn test_property_access_str() {
  assert_eq!(property_access_str("ns", "foo"), "ns.foo");
  assert_eq!(property_access_str("ns", "a-b"), "ns[\"a-b\"]");
}
