//! JSON extraction utilities for parsing LLM responses.
//!
//! LLM responses frequently wrap the requested JSON object in commentary or
//! markdown fences, or carry small syntactic defects. This module recovers a
//! JSON object from such text in two layers:
//!
//! # Structural recovery
//!
//! 1. Direct parse of the trimmed response
//! 2. The interior of the first fenced code block (```` ```json ```` or bare ```` ``` ````)
//! 3. The span from the first `{` to its matching `}` (string and escape aware)
//!
//! # Lexical repair
//!
//! Each candidate span goes through [`parse_candidate`]:
//! 1. Parse as-is
//! 2. Strip trailing commas before `}` / `]`, then parse
//! 3. Escape raw control characters inside string literals, then parse
//!
//! Only JSON objects are accepted; a candidate that parses to any other JSON
//! value is rejected.
//!
//! # Example
//!
//! ```
//! use strategy_brain::utils::json_extraction::extract_structured;
//!
//! let response = "Sure! ```json\n{\"a\": 1,}\n``` Hope that helps!";
//! let map = extract_structured(response).unwrap();
//! assert_eq!(map["a"], 1);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::structured::StructuredMap;

/// Number of characters of the raw response kept in diagnostics.
pub const PREVIEW_CHARS: usize = 200;

/// Error type for JSON extraction failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsonExtractionError {
    #[error("Response is empty")]
    EmptyInput,
    #[error("No JSON object could be recovered from response. Content starts with: '{content_preview}'")]
    NotFound { content_preview: String },
}

impl JsonExtractionError {
    fn not_found(content: &str) -> Self {
        JsonExtractionError::NotFound {
            content_preview: preview(content),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`, cut on a char boundary.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

/// Extract a JSON object from an LLM response.
///
/// # Errors
///
/// Returns [`JsonExtractionError::EmptyInput`] for empty or whitespace-only
/// input, and [`JsonExtractionError::NotFound`] when neither a fenced block
/// nor an outer brace span yields a parseable object.
pub fn extract_structured(content: &str) -> Result<StructuredMap, JsonExtractionError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(JsonExtractionError::EmptyInput);
    }

    // Well-formed responses are returned without any repair applied.
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(map);
    }

    if let Some(block) = find_fenced_block(trimmed) {
        if let Some(map) = parse_candidate(block) {
            return Ok(map);
        }
        tracing::debug!("Fenced block did not contain a parseable JSON object");
    }

    if let Some(span) = find_outer_object(trimmed) {
        if let Some(map) = parse_candidate(span) {
            return Ok(map);
        }
    }

    Err(JsonExtractionError::not_found(content))
}

fn fenced_block_regex() -> Option<&'static Regex> {
    static FENCED_BLOCK: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED_BLOCK
        .get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").ok())
        .as_ref()
}

/// Interior of the first fenced code block, trimmed.
pub fn find_fenced_block(content: &str) -> Option<&str> {
    let caps = fenced_block_regex()?.captures(content)?;
    Some(caps.get(1)?.as_str().trim())
}

/// Span from the first `{` in `content` to its matching closing brace.
pub fn find_outer_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let rest = &content[start..];
    let end = find_matching_brace(rest)?;
    Some(&rest[..=end])
}

/// Helper function to find the matching closing brace for a JSON object.
///
/// `s` must start at the opening brace. Braces inside string literals are
/// ignored, and a backslash inside a string escapes the following character.
///
/// # Returns
///
/// The byte index of the matching closing brace, or None if the object is
/// never closed.
pub fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Run the lexical repair passes over a candidate span.
///
/// Returns the first pass that parses to a JSON object.
pub fn parse_candidate(candidate: &str) -> Option<StructuredMap> {
    if let Some(map) = parse_object(candidate) {
        return Some(map);
    }

    let without_commas = strip_trailing_commas(candidate);
    if let Some(map) = parse_object(&without_commas) {
        tracing::debug!("Recovered JSON after stripping trailing commas");
        return Some(map);
    }

    let escaped = escape_control_characters(&without_commas);
    if let Some(map) = parse_object(&escaped) {
        tracing::debug!("Recovered JSON after escaping control characters");
        return Some(map);
    }

    None
}

fn parse_object(candidate: &str) -> Option<StructuredMap> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn is_raw_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}')
}

/// Remove commas that directly precede a closing `}` or `]`.
///
/// Commas inside string literals are left untouched.
pub fn strip_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let mut lookahead = chars.clone();
                let next = lookahead.find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Replace raw control characters (0x00-0x1F, 0x7F).
///
/// Inside string literals `\n`, `\r` and `\t` become their escape sequences
/// and every other control character is deleted. Outside strings, JSON
/// whitespace is kept and other control characters are deleted. A control
/// character directly after a backslash is treated as the intended escape
/// letter.
pub fn escape_control_characters(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    let mut in_string = false;
    let mut escape_next = false;

    for c in s.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            if !is_raw_control(c) || matches!(c, '\n' | '\r' | '\t') {
                out.push(c);
            }
            continue;
        }

        if escape_next {
            match c {
                '\n' => out.push('n'),
                '\r' => out.push('r'),
                '\t' => out.push('t'),
                // Still waiting for the escaped character.
                c if is_raw_control(c) => continue,
                c => out.push(c),
            }
            escape_next = false;
            continue;
        }

        match c {
            '\\' => {
                escape_next = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if is_raw_control(c) => {}
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(map: StructuredMap) -> Value {
        Value::Object(map)
    }

    #[test]
    fn test_direct_json() {
        let input = r#"{"key": "value", "n": [1, 2, {"x": null}]}"#;
        let result = extract_structured(input).unwrap();
        let expected: Value = serde_json::from_str(input).unwrap();
        assert_eq!(as_value(result), expected);
    }

    #[test]
    fn test_json_code_block() {
        let input = r#"Here is the response:
```json
{"key": "value"}
```
Hope this helps!"#;
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"key": "value"}));
    }

    #[test]
    fn test_generic_code_block() {
        let input = "Response:\n```\n{\"key\": \"value\"}\n```";
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_block_with_trailing_comma() {
        let input = "Sure! ```json\n{\"a\": 1,}\n``` Hope that helps!";
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"a": 1}));
    }

    #[test]
    fn test_json_with_text() {
        let input =
            r#"Sure, here's the JSON you requested: {"name": "test", "count": 5} - that's it!"#;
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"name": "test", "count": 5}));
    }

    #[test]
    fn test_unparseable_fence_falls_through_to_brace_scan() {
        let input = "```json\nnot json at all\n```\nActual: {\"ok\": true}";
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"ok": true}));
    }

    #[test]
    fn test_trailing_commas_nested() {
        let input = r#"{"items": [1, 2, 3,], "inner": {"a": "b",},}"#;
        let result = extract_structured(input).unwrap();
        assert_eq!(
            as_value(result),
            json!({"items": [1, 2, 3], "inner": {"a": "b"}})
        );
    }

    #[test]
    fn test_strip_trailing_commas_ignores_strings() {
        let input = r#"{"text": "a,}", "list": [1,]}"#;
        assert_eq!(
            strip_trailing_commas(input),
            r#"{"text": "a,}", "list": [1]}"#
        );
    }

    #[test]
    fn test_raw_control_characters_inside_strings() {
        let input = "{\"body\": \"line one\nline two\tend\r\"}";
        let result = extract_structured(input).unwrap();
        assert_eq!(
            as_value(result),
            json!({"body": "line one\nline two\tend\r"})
        );
    }

    #[test]
    fn test_pretty_printed_json_with_raw_newline_in_string() {
        let input = "{\n  \"headline\": \"first\nsecond\",\n  \"n\": 1,\n}";
        let result = extract_structured(input).unwrap();
        assert_eq!(
            as_value(result),
            json!({"headline": "first\nsecond", "n": 1})
        );
    }

    #[test]
    fn test_other_control_characters_are_deleted() {
        let input = "{\"a\": \"x\u{1}y\u{7f}z\"}";
        let result = extract_structured(input).unwrap();
        assert_eq!(as_value(result), json!({"a": "xyz"}));
    }

    #[test]
    fn test_escape_control_characters_keeps_existing_escapes() {
        let input = r#"{"a": "already\nescaped", "b": "quote \" inside"}"#;
        assert_eq!(escape_control_characters(input), input);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(extract_structured(""), Err(JsonExtractionError::EmptyInput));
        assert_eq!(
            extract_structured("   \n\t "),
            Err(JsonExtractionError::EmptyInput)
        );
    }

    #[test]
    fn test_no_json_content() {
        let err = extract_structured("I cannot help with that.").unwrap_err();
        assert!(matches!(err, JsonExtractionError::NotFound { .. }));
        assert!(err.to_string().contains("I cannot help"));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(extract_structured("[1, 2, 3]").is_err());
        assert!(extract_structured("42").is_err());
        assert!(extract_structured("\"just a string\"").is_err());
    }

    #[test]
    fn test_truncated_object_is_rejected() {
        let err = extract_structured(r#"{"a": {"b": 1}"#).unwrap_err();
        assert!(matches!(err, JsonExtractionError::NotFound { .. }));
    }

    #[test]
    fn test_preview_is_limited_to_200_chars() {
        let long = "あ".repeat(500);
        match extract_structured(&long).unwrap_err() {
            JsonExtractionError::NotFound { content_preview } => {
                assert_eq!(content_preview.chars().count(), PREVIEW_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_find_matching_brace_simple() {
        assert_eq!(find_matching_brace("{}"), Some(1));
        assert_eq!(find_matching_brace(r#"{"a": 1}"#), Some(7));
    }

    #[test]
    fn test_find_matching_brace_nested() {
        let s = r#"{"a": {"b": {}}} trailing"#;
        assert_eq!(find_matching_brace(s), Some(15));
    }

    #[test]
    fn test_find_matching_brace_with_strings() {
        let s = r#"{"a": "}{", "b": "\"}"} tail"#;
        let end = find_matching_brace(s).unwrap();
        assert_eq!(&s[..=end], r#"{"a": "}{", "b": "\"}"}"#);
    }

    #[test]
    fn test_find_matching_brace_unclosed() {
        assert_eq!(find_matching_brace(r#"{"a": {"#), None);
    }

    #[test]
    fn test_find_fenced_block() {
        assert_eq!(find_fenced_block("x ```json\n{}\n``` y"), Some("{}"));
        assert_eq!(find_fenced_block("no fences here"), None);
    }
}
