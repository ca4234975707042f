//! Status and body of a remote call, parsed leniently so that error
//! normalization always receives a well-formed payload.

use serde_json::{Map, Value};

/// HTTP status plus the JSON body of a response.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteReply {
    pub status: u16,
    pub body: Value,
}

impl RemoteReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Builds a reply from a raw response body. Empty or malformed bodies become `{}`.
    pub fn from_text(status: u16, text: &str) -> Self {
        Self {
            status,
            body: parse_body(text),
        }
    }

    pub fn is_http_error(&self) -> bool {
        self.status >= 400
    }

    /// Looks up a top-level string field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}

/// Parses a response body as JSON, falling back to an empty object.
pub fn parse_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return empty_object();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) | Err(_) => empty_object(),
        Ok(value) => value,
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// JS-style truthiness for payload markers such as `error` or `success`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
