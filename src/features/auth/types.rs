//! Dialog modes, form fields, and the request and response payloads of the auth
//! endpoints. Request payloads carry passwords, so they must never be logged.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Which of the two dialog flows is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Login,
    Signup,
}

impl Mode {
    /// Maps loose host-provided spellings onto a mode; anything unknown is login.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "signup" | "register" | "sign-up" => Mode::Signup,
            _ => Mode::Login,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Login => "login",
            Mode::Signup => "signup",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Login => Mode::Signup,
            Mode::Signup => Mode::Login,
        }
    }

    /// Field that receives focus when the dialog opens in this mode.
    pub fn initial_field(self) -> FieldKey {
        match self {
            Mode::Login => FieldKey::Email,
            Mode::Signup => FieldKey::Name,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Form fields of the dialog. Declaration order is the focus priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Email,
    Password,
    Name,
    Confirm,
    Terms,
}

impl FieldKey {
    pub const ALL: [FieldKey; 5] = [
        FieldKey::Email,
        FieldKey::Password,
        FieldKey::Name,
        FieldKey::Confirm,
        FieldKey::Terms,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Email => "email",
            FieldKey::Password => "password",
            FieldKey::Name => "name",
            FieldKey::Confirm => "confirm",
            FieldKey::Terms => "terms",
        }
    }

    /// Maps a remote field name onto a dialog field, including the names the
    /// registration endpoint uses for the split name and the terms flag.
    pub fn from_remote(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "email" => Some(FieldKey::Email),
            "password" => Some(FieldKey::Password),
            "name" | "first_name" | "last_name" | "full_name" => Some(FieldKey::Name),
            "confirm" | "confirm_password" | "password_confirmation" => Some(FieldKey::Confirm),
            "terms" | "terms_accepted" => Some(FieldKey::Terms),
            _ => None,
        }
    }

    /// True for fields that only exist in the signup form.
    pub fn is_signup_only(self) -> bool {
        matches!(self, FieldKey::Name | FieldKey::Confirm | FieldKey::Terms)
    }
}

/// Per-field messages, ordered by focus priority.
pub type FieldErrors = BTreeMap<FieldKey, String>;

/// Values read from the dialog form, already normalized for submission.
#[derive(Debug, Default)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm: SecretString,
    pub terms: bool,
}

impl FormValues {
    /// Normalizes raw input: the name is trimmed, the email trimmed and lowercased.
    /// Passwords are kept verbatim.
    pub fn from_raw(name: &str, email: &str, password: &str, confirm: &str, terms: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password: SecretString::from(password.to_string()),
            confirm: SecretString::from(confirm.to_string()),
            terms,
        }
    }

    /// Splits the full name into first and last name for the registration payload.
    pub fn split_name(&self) -> (String, String) {
        let mut parts = self.name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.collect::<Vec<_>>().join(" ");
        (first, last)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

impl<'a> LoginRequest<'a> {
    pub fn from_values(values: &'a FormValues) -> Self {
        Self {
            email: &values.email,
            password: values.password.expose_secret(),
            remember_me: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: String,
    pub last_name: String,
    pub title: &'a str,
    pub firm_name: &'a str,
    pub terms_accepted: bool,
    pub remember_me: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct OAuthInitiateRequest {
    pub redirect_uri: String,
}

/// Credential obtained from a successful login.
#[derive(Debug)]
pub struct Session {
    pub token: SecretString,
    pub user: Option<Value>,
}
