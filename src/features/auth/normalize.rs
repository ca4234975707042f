//! Maps the error payloads of the auth endpoints onto dialog fields.
//!
//! Backends disagree on the error shape: a field-keyed `errors` map, a list of
//! location-tagged validation entries under `detail`, or a single free-text
//! message under `detail`, `error`, or `message`. Field detectors run in order
//! and all contribute; the free-text message is then attributed by mode.

use super::copy;
use super::types::{FieldErrors, FieldKey, Mode};
use serde_json::Value;

/// Remote errors in the same shape the validator produces, plus a general message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedErrors {
    pub field_errors: FieldErrors,
    pub general: Option<String>,
}

/// A detector reads one payload shape and records the field errors it finds.
type FieldDetector = fn(&Value, &mut FieldErrors);

const FIELD_DETECTORS: &[FieldDetector] = &[from_error_map, from_location_entries];

/// Keys checked for a free-text message, highest priority first.
const MESSAGE_KEYS: &[&str] = &["detail", "error", "message"];

pub fn normalize(payload: &Value, status: u16, mode: Mode) -> NormalizedErrors {
    let mut field_errors = FieldErrors::new();
    for detect in FIELD_DETECTORS {
        detect(payload, &mut field_errors);
    }

    let message = extract_message(payload);
    let outage = message.is_none() && status >= 500;

    if field_errors.is_empty() {
        match mode {
            Mode::Login if !outage => {
                let text = message.clone().unwrap_or_else(|| copy::LOGIN_FAILED.to_string());
                field_errors.insert(FieldKey::Email, text.clone());
                field_errors.insert(FieldKey::Password, text);
            }
            Mode::Signup => {
                if let Some(field) = message.as_deref().and_then(signup_field_for) {
                    field_errors.insert(field, message.clone().unwrap_or_default());
                }
            }
            Mode::Login => {}
        }
    }

    let general = if !field_errors.is_empty() {
        None
    } else if message.is_some() {
        message
    } else if status >= 500 {
        Some(copy::SERVER_UNREACHABLE.to_string())
    } else {
        None
    };

    NormalizedErrors {
        field_errors,
        general,
    }
}

/// Errors from a failed request that never produced a response.
pub fn transport_failure() -> NormalizedErrors {
    NormalizedErrors {
        field_errors: FieldErrors::new(),
        general: Some(copy::SERVER_UNREACHABLE.to_string()),
    }
}

/// `{"errors": {"email": "taken"}}` or `{"errors": {"email": ["taken", ...]}}`.
fn from_error_map(payload: &Value, field_errors: &mut FieldErrors) {
    let Some(errors) = payload.get("errors").and_then(Value::as_object) else {
        return;
    };
    for (name, value) in errors {
        let message = match value {
            Value::String(text) => Some(text.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        };
        if let (Some(field), Some(message)) = (FieldKey::from_remote(name), message) {
            field_errors.insert(field, message.to_string());
        }
    }
}

/// `{"detail": [{"loc": ["body", "password"], "msg": "too short"}]}`.
fn from_location_entries(payload: &Value, field_errors: &mut FieldErrors) {
    let Some(entries) = payload.get("detail").and_then(Value::as_array) else {
        return;
    };
    for entry in entries {
        let field = entry
            .get("loc")
            .and_then(Value::as_array)
            .and_then(|loc| loc.last())
            .and_then(Value::as_str)
            .and_then(FieldKey::from_remote);
        let message = entry.get("msg").and_then(Value::as_str);
        if let (Some(field), Some(message)) = (field, message) {
            field_errors.insert(field, message.to_string());
        }
    }
}

/// First string under `detail`, `error`, or `message`; `error` may also be an
/// object carrying its own `message`.
pub fn extract_message(payload: &Value) -> Option<String> {
    MESSAGE_KEYS.iter().find_map(|key| {
        let value = payload.get(*key)?;
        let text = match value {
            Value::String(text) => text.as_str(),
            Value::Object(inner) if *key == "error" => inner.get("message")?.as_str()?,
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

fn signup_field_for(message: &str) -> Option<FieldKey> {
    let lowered = message.to_lowercase();
    if lowered.contains("email") || lowered.contains("e-mail") {
        Some(FieldKey::Email)
    } else if copy::PASSWORD_WORDS.iter().any(|word| lowered.contains(word)) {
        Some(FieldKey::Password)
    } else {
        None
    }
}
