//! Extraction behaviour over realistic model replies, through the public API.

use serde_json::{json, Value};
use strategy_brain::{extract_structured, JsonExtractionError};

fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[test]
fn test_well_formed_replies_are_unchanged() {
    let replies = [
        r#"{"a": 1, "b": [1, 2, {"c": null}], "d": "x,}"}"#,
        "{\n  \"idea\": \"Own the commute\",\n  \"alternative_ideas\": []\n}",
        r#"{"quote": "she said \"hi\" {twice}", "tab": "a\tb"}"#,
    ];

    for reply in replies {
        let expected: Value = serde_json::from_str(reply).unwrap();
        let extracted = extract_structured(reply).unwrap();
        assert_eq!(Value::Object(extracted), expected, "reply: {}", reply);
    }
}

#[test]
fn test_fence_surrounded_by_prose() {
    let reply = "Here is the analysis you asked for.\n\n```json\n{\"barriers\": [{\"id\": 1, \"barrier\": \"Too expensive\"}]}\n```\n\nLet me know if you need more.";
    let map = extract_structured(reply).unwrap();
    assert_eq!(
        map,
        object(json!({"barriers": [{"id": 1, "barrier": "Too expensive"}]}))
    );
}

#[test]
fn test_trailing_commas_anywhere() {
    let reply = "Sure! ```json\n{\"a\": 1,}\n``` Hope that helps!";
    assert_eq!(extract_structured(reply).unwrap(), object(json!({"a": 1})));

    let reply = "{\"list\": [1, 2, 3,], \"nested\": {\"x\": \"y\",},}";
    assert_eq!(
        extract_structured(reply).unwrap(),
        object(json!({"list": [1, 2, 3], "nested": {"x": "y"}}))
    );
}

#[test]
fn test_commas_inside_strings_survive_repair() {
    let reply = "{\"copy\": \"Stop, look,}\", \"extra\": [\"a\",],}";
    let map = extract_structured(reply).unwrap();
    assert_eq!(map["copy"], "Stop, look,}");
    assert_eq!(map["extra"], json!(["a"]));
}

#[test]
fn test_raw_newline_and_tab_inside_strings() {
    let reply = "{\"body\": \"line one\nline two\", \"cell\": \"a\tb\"}";
    let map = extract_structured(reply).unwrap();
    assert_eq!(map["body"], "line one\nline two");
    assert_eq!(map["cell"], "a\tb");
}

#[test]
fn test_object_found_by_brace_matching() {
    let reply = "Thinking about it {carefully}... final answer: {\"ok\": true}";
    // The first `{` opens a span that is not JSON, so nothing is recovered.
    assert!(extract_structured(reply).is_err());

    let reply = "Final answer: {\"ok\": true, \"note\": \"use } sparingly\"} and done.";
    assert_eq!(
        extract_structured(reply).unwrap(),
        object(json!({"ok": true, "note": "use } sparingly"}))
    );
}

#[test]
fn test_empty_and_whitespace_fail() {
    assert_eq!(extract_structured(""), Err(JsonExtractionError::EmptyInput));
    assert_eq!(extract_structured(" \n\t "), Err(JsonExtractionError::EmptyInput));
}

#[test]
fn test_non_objects_fail() {
    for reply in ["[1, 2, 3]", "\"just a string\"", "42", "no json here at all"] {
        assert!(
            matches!(extract_structured(reply), Err(JsonExtractionError::NotFound { .. })),
            "reply: {}",
            reply
        );
    }
}

#[test]
fn test_failure_preview_is_bounded() {
    let reply = "é".repeat(500);
    match extract_structured(&reply) {
        Err(JsonExtractionError::NotFound { content_preview }) => {
            assert_eq!(content_preview.chars().count(), 200);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
