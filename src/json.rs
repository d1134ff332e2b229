//! Path-based access into parsed JSON documents with empty/zero defaults.

use serde_json::Value;
use tracing::warn;

static NULL: Value = Value::Null;

/// Value at `path`, or `Null` when any step is missing or not an object.
pub fn value_at<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
        .unwrap_or(&NULL)
}

/// String at `path`, or "" when missing or not a string
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> &'a str {
    value_at(value, path).as_str().unwrap_or_default()
}

/// Integer at `path`, or 0 when missing or not an integer
pub fn i64_at(value: &Value, path: &[&str]) -> i64 {
    value_at(value, path).as_i64().unwrap_or_default()
}

/// Parse numeric text such as "53.4794892"; malformed text yields NaN.
pub fn parse_f64_or_nan(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}

/// Parse an upstream response body, logging and returning `None` on failure.
pub fn parse_document(body: &str, source: &str) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str(body) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Failed to parse {} response: {}", source, e);
            None
        }
    }
}
