use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::extract::extract_fragments;

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("number pattern"))
}

/// Decode one fragment's content into a parameter map: child tags become keys,
/// child contents become typed values. Duplicate child names overwrite
/// (last wins).
pub fn decode_parameters(content: &str) -> Map<String, Value> {
    let mut parameters = Map::new();
    for child in extract_fragments(content) {
        parameters.insert(child.tag_name, decode_value(&child.content));
    }
    parameters
}

/// Values that look like JSON literals are parsed strictly; everything else
/// (including anything that fails the strict parse) stays a raw trimmed
/// string. Empty stays an empty string, never null.
fn decode_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    if looks_like_json_literal(trimmed) {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    Value::String(trimmed.to_string())
}

fn looks_like_json_literal(trimmed: &str) -> bool {
    matches!(trimmed, "true" | "false" | "null")
        || number_regex().is_match(trimmed)
        || trimmed.starts_with('{')
        || trimmed.starts_with('[')
}
