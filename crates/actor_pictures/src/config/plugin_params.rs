//! Decoder for the host engine's plugin-parameter encoding, where every list
//! and struct is stored as a JSON string nested inside another JSON string.

use serde_json::{Map, Value};

use super::types::ConfigError;

const LIST_KEYS: [&str; 3] = ["actorPictures", "pictureCalibrations", "animationPictures"];
const NESTED_LIST_KEYS: [&str; 4] = [
    "normalPictures",
    "pictures",
    "patternCounts",
    "repeatDurations",
];
const NESTED_STRUCT_LIST_KEYS: [&str; 2] = ["statePictures", "damagePictures"];

/// Expands plugin parameters into the native document shape. A top-level list
/// that is not valid JSON is fatal; a broken entry is left as-is so the
/// registry reports and skips just that entry.
pub fn expand_plugin_parameters(params: Value) -> Result<Value, ConfigError> {
    let Value::Object(params) = params else {
        return Err(ConfigError::NotAnObject);
    };

    let mut expanded = Map::with_capacity(params.len());
    for (key, value) in params {
        let value = match LIST_KEYS.iter().find(|list_key| **list_key == key) {
            Some(list_key) => Value::Array(expand_top_level_list(list_key, value)?),
            None => value,
        };
        expanded.insert(key, value);
    }
    Ok(Value::Object(expanded))
}

fn expand_top_level_list(key: &'static str, value: Value) -> Result<Vec<Value>, ConfigError> {
    let entries = match value {
        Value::String(text) if text.trim().is_empty() => Vec::new(),
        Value::String(text) => serde_json::from_str::<Vec<Value>>(&text)
            .map_err(|source| ConfigError::NestedJson { key, source })?,
        Value::Array(entries) => entries,
        other => {
            return Err(ConfigError::NestedJson {
                key,
                source: serde::de::Error::custom(format!(
                    "expected a json string or list, got {other}"
                )),
            })
        }
    };
    Ok(entries.into_iter().map(expand_struct).collect())
}

fn expand_struct(value: Value) -> Value {
    let value = parse_nested(value);
    let Value::Object(mut fields) = value else {
        return value;
    };

    for key in NESTED_LIST_KEYS {
        if let Some(field) = fields.remove(key) {
            fields.insert(key.to_string(), parse_nested(field));
        }
    }
    for key in NESTED_STRUCT_LIST_KEYS {
        if let Some(field) = fields.remove(key) {
            let field = match parse_nested(field) {
                Value::Array(items) => Value::Array(items.into_iter().map(expand_struct).collect()),
                other => other,
            };
            fields.insert(key.to_string(), field);
        }
    }
    Value::Object(fields)
}

fn parse_nested(value: Value) -> Value {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
                return Value::String(text);
            }
            serde_json::from_str::<Value>(trimmed).unwrap_or(Value::String(text))
        }
        other => other,
    }
}
