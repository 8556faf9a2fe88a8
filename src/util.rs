// Helpers for pulling scalars out of loosely-typed JSON.
//
// Payloads come from several backend versions, so numbers sometimes arrive
// as strings ("1,234"), labels as numbers, and fields as `null`. Everything
// here returns `None` instead of guessing, and callers apply their defaults.
use serde_json::Value;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in exported figures (commas, spaces).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed, including
///   non-finite results.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric value of a JSON scalar. Numeric strings are accepted.
pub fn value_as_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}

/// Label of a JSON scalar. Empty strings count as missing; strings are kept
/// byte-for-byte (no trimming, no case folding).
pub fn value_as_label(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Look up a record field: by `name` on objects, by `index` on positional
/// tuples. Anything else has no fields.
pub fn field<'a>(item: &'a Value, name: &str, index: usize) -> Option<&'a Value> {
    match item {
        Value::Object(map) => map.get(name).filter(|v| !v.is_null()),
        Value::Array(items) => items.get(index).filter(|v| !v.is_null()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_grouped_numeric_strings() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("12k")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn value_as_f64_accepts_numbers_and_numeric_strings() {
        assert_eq!(value_as_f64(Some(&json!(5))), Some(5.0));
        assert_eq!(value_as_f64(Some(&json!("7"))), Some(7.0));
        assert_eq!(value_as_f64(Some(&json!(true))), None);
        assert_eq!(value_as_f64(Some(&json!(null))), None);
    }

    #[test]
    fn labels_are_not_trimmed_and_empty_is_missing() {
        assert_eq!(value_as_label(Some(&json!(" SQL "))), Some(" SQL ".to_string()));
        assert_eq!(value_as_label(Some(&json!(""))), None);
        assert_eq!(value_as_label(Some(&json!(42))), Some("42".to_string()));
    }

    #[test]
    fn field_reads_named_or_positional() {
        let named = json!({"skill": "Rust", "freq": 3});
        let tuple = json!(["Rust", 3]);
        assert_eq!(field(&named, "skill", 0), Some(&json!("Rust")));
        assert_eq!(field(&tuple, "skill", 0), Some(&json!("Rust")));
        assert_eq!(field(&tuple, "freq", 1), Some(&json!(3)));
        assert_eq!(field(&json!("Rust"), "skill", 0), None);
    }
}
