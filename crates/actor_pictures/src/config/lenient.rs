//! Field deserializers that accept both JSON numbers and the stringly values
//! the host engine writes into plugin parameters (`"3"`, `"true"`, `""`).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub(crate) fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_int(&value)
        .map_err(D::Error::custom)?
        .ok_or_else(|| D::Error::custom("expected an integer, got an empty value"))
}

pub(crate) fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_int(&value).map_err(D::Error::custom)
}

pub(crate) fn opt_int_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => {
            return Err(D::Error::custom(format!(
                "expected a list of integers, got {other}"
            )))
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse_int(item) {
            Ok(Some(number)) => parsed.push(number),
            Ok(None) => {
                return Err(D::Error::custom(format!(
                    "expected an integer at position {index}, got an empty value"
                )))
            }
            Err(message) => {
                return Err(D::Error::custom(format!("at position {index}: {message}")))
            }
        }
    }
    Ok(Some(parsed))
}

/// Anything other than `true`, `"true"` or an empty value reads as `false`.
pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) => match text.trim() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => {
                warn!(value = other, "config_flag_not_boolean");
                Ok(Some(false))
            }
        },
        other => {
            warn!(value = %other, "config_flag_not_boolean");
            Ok(Some(false))
        }
    }
}

fn parse_int(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                    .map(|float| float as i64)
            })
            .map(Some)
            .ok_or_else(|| format!("expected an integer, got {number}")),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("expected an integer, got \"{text}\"")),
        other => Err(format!("expected an integer, got {other}")),
    }
}
