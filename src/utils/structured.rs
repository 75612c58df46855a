//! Lenient readers over loosely-typed JSON maps.
//!
//! Stage results are first deserialized strictly with serde. When the LLM's
//! output does not match the schema, each result type falls back to its
//! [`FromStructured`] implementation, which reads whatever fields are present
//! through the helpers below and uses zero values for everything else.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A JSON object recovered from an LLM response.
pub type StructuredMap = Map<String, Value>;

/// Total, best-effort construction from a structured map.
///
/// Implementations must never fail: missing or mistyped fields take the
/// type's zero value (empty string, empty list, empty map, `0`).
pub trait FromStructured: Sized {
    fn from_structured(map: &StructuredMap) -> Self;
}

/// Strict typed construction: every required field present and well-typed.
pub fn from_map_strict<T: DeserializeOwned>(map: &StructuredMap) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(map.clone()))
}

/// Flatten any JSON value into display text.
///
/// Objects become `key: value` pairs and arrays become their items, both
/// joined with `", "`. `null` becomes the empty string.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, value_to_text(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Serde adapter: accept any JSON value for a text field, flattened with
/// [`value_to_text`].
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// Serde adapter: accept a bare string where a list of strings is expected.
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(items) => items,
    })
}

/// Read `key` as text, coercing non-string values with [`value_to_text`].
pub fn text(map: &StructuredMap, key: &str) -> String {
    map.get(key).map(value_to_text).unwrap_or_default()
}

/// Read `key` as a list of strings.
///
/// A bare string becomes a one-element list; non-string items are
/// flattened to text and empty items dropped.
pub fn string_list(map: &StructuredMap, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Read `key` as an integer. Floats are truncated and numeric strings parsed.
pub fn integer(map: &StructuredMap, key: &str) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Read `key` as a list of integers, skipping items that are not numeric.
pub fn integer_list(map: &StructuredMap, key: &str) -> Vec<i64> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Read `key` as an opaque JSON object.
pub fn object(map: &StructuredMap, key: &str) -> StructuredMap {
    match map.get(key) {
        Some(Value::Object(inner)) => inner.clone(),
        _ => StructuredMap::new(),
    }
}

/// Read `key` as a list of opaque JSON objects, skipping other items.
pub fn object_list(map: &StructuredMap, key: &str) -> Vec<StructuredMap> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Read `key` as a nested typed value; absent or non-object yields defaults.
pub fn nested<T: FromStructured>(map: &StructuredMap, key: &str) -> T {
    match map.get(key) {
        Some(Value::Object(inner)) => T::from_structured(inner),
        _ => T::from_structured(&StructuredMap::new()),
    }
}

/// Read `key` as a list of typed values built from the object items.
pub fn list_of<T: FromStructured>(map: &StructuredMap, key: &str) -> Vec<T> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(T::from_structured)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> StructuredMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_coercion() {
        let m = map(json!({
            "s": "plain",
            "n": 3,
            "obj": {"age": "20s", "income": "mid"},
            "list": ["a", "b"],
            "null": null
        }));
        assert_eq!(text(&m, "s"), "plain");
        assert_eq!(text(&m, "n"), "3");
        assert_eq!(text(&m, "obj"), "age: 20s, income: mid");
        assert_eq!(text(&m, "list"), "a, b");
        assert_eq!(text(&m, "null"), "");
        assert_eq!(text(&m, "missing"), "");
    }

    #[test]
    fn test_string_list_accepts_single_string() {
        let m = map(json!({"one": "only", "many": ["x", "", 2], "bad": 5}));
        assert_eq!(string_list(&m, "one"), vec!["only"]);
        assert_eq!(string_list(&m, "many"), vec!["x", "2"]);
        assert!(string_list(&m, "bad").is_empty());
        assert!(string_list(&m, "missing").is_empty());
    }

    #[test]
    fn test_integer_reads() {
        let m = map(json!({"i": 2, "f": 1.9, "s": " 4 ", "bad": "x", "ids": [1, "2", null]}));
        assert_eq!(integer(&m, "i"), 2);
        assert_eq!(integer(&m, "f"), 1);
        assert_eq!(integer(&m, "s"), 4);
        assert_eq!(integer(&m, "bad"), 0);
        assert_eq!(integer(&m, "missing"), 0);
        assert_eq!(integer_list(&m, "ids"), vec![1, 2]);
    }

    #[test]
    fn test_serde_adapters() {
        #[derive(Deserialize)]
        struct Sample {
            #[serde(deserialize_with = "deserialize_text")]
            demographics: String,
            #[serde(deserialize_with = "deserialize_string_list")]
            assumptions: Vec<String>,
        }

        let sample: Sample = serde_json::from_value(json!({
            "demographics": {"age": "30s"},
            "assumptions": "single"
        }))
        .unwrap();
        assert_eq!(sample.demographics, "age: 30s");
        assert_eq!(sample.assumptions, vec!["single"]);

        let sample: Sample = serde_json::from_value(json!({
            "demographics": ["urban", "renters"],
            "assumptions": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(sample.demographics, "urban, renters");
        assert_eq!(sample.assumptions.len(), 2);
    }

    #[test]
    fn test_object_reads() {
        let m = map(json!({"o": {"k": 1}, "l": [{"a": 1}, 2, {"b": 2}], "s": "x"}));
        assert_eq!(object(&m, "o")["k"], 1);
        assert!(object(&m, "s").is_empty());
        assert_eq!(object_list(&m, "l").len(), 2);
    }
}
