//! Client-side validation of the dialog form.
//!
//! Every rule runs independently so the user sees all problems at once; the
//! focus target is the first failing field in [`FieldKey`] order.

use super::copy;
use super::types::{FieldErrors, FieldKey, FormValues, Mode};
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::LazyLock;

/// Minimum password length enforced before anything is sent.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub field_errors: FieldErrors,
    pub focus_field: Option<FieldKey>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Loose `local@domain.tld` shape check on already-normalized input.
pub fn valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|regex| regex.is_match(email))
}

pub fn validate(values: &FormValues, mode: Mode) -> ValidationResult {
    let mut field_errors = FieldErrors::new();

    if values.email.is_empty() || !valid_email(&values.email) {
        field_errors.insert(FieldKey::Email, copy::EMAIL_INVALID.to_string());
    }

    let password = values.password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        field_errors.insert(
            FieldKey::Password,
            copy::password_too_short(MIN_PASSWORD_LENGTH),
        );
    }

    if mode == Mode::Signup {
        if values.name.trim().is_empty() {
            field_errors.insert(FieldKey::Name, copy::NAME_REQUIRED.to_string());
        }
        let confirm = values.confirm.expose_secret();
        if confirm.is_empty() || confirm != password {
            field_errors.insert(FieldKey::Confirm, copy::CONFIRM_MISMATCH.to_string());
        }
        if !values.terms {
            field_errors.insert(FieldKey::Terms, copy::TERMS_REQUIRED.to_string());
        }
    }

    let focus_field = field_errors.keys().next().copied();
    ValidationResult {
        field_errors,
        focus_field,
    }
}

#[cfg(test)]
mod tests {
    use super::{EMAIL_PATTERN, FieldKey, FormValues, Mode, valid_email, validate};

    fn login(email: &str, password: &str) -> FormValues {
        FormValues::from_raw("", email, password, "", false)
    }

    fn signup(name: &str, password: &str, confirm: &str, terms: bool) -> FormValues {
        FormValues::from_raw(name, "max@example.de", password, confirm, terms)
    }

    #[test]
    fn email_shape_is_loose_but_requires_domain_dot() {
        assert!(valid_email("max@example.de"));
        assert!(valid_email("a.b+c@sub.example.co.uk"));
        assert!(!valid_email("max@example"));
        assert!(!valid_email("max.example.de"));
        assert!(!valid_email("max @example.de"));
        assert!(!valid_email(""));
    }

    #[test]
    fn email_pattern_is_compiled_once() {
        let first = EMAIL_PATTERN.as_ref().map(std::ptr::from_ref);
        assert!(first.is_some());
        assert!(valid_email("max@example.de"));
        assert_eq!(EMAIL_PATTERN.as_ref().map(std::ptr::from_ref), first);
    }

    #[test]
    fn missing_or_malformed_email_focuses_email() {
        for email in ["", "   ", "nobody", "a@b", "@example.de"] {
            let result = validate(&login(email, "secret1"), Mode::Login);
            assert!(result.field_errors.contains_key(&FieldKey::Email), "{email:?}");
            assert_eq!(result.focus_field, Some(FieldKey::Email), "{email:?}");
        }
    }

    #[test]
    fn email_error_wins_focus_over_password() {
        let result = validate(&login("nobody", "123"), Mode::Login);
        assert_eq!(result.field_errors.len(), 2);
        assert_eq!(result.focus_field, Some(FieldKey::Email));
    }

    #[test]
    fn short_password_is_rejected() {
        let result = validate(&login("max@example.de", "12345"), Mode::Login);
        assert!(!result.is_valid());
        assert_eq!(result.focus_field, Some(FieldKey::Password));

        let result = validate(&login("max@example.de", "123456"), Mode::Login);
        assert!(result.is_valid());
        assert_eq!(result.focus_field, None);
    }

    #[test]
    fn login_ignores_signup_fields() {
        let result = validate(&login("max@example.de", "secret1"), Mode::Login);
        assert!(result.is_valid());
    }

    #[test]
    fn signup_without_terms_always_reports_terms() {
        let result = validate(&signup("Max Muster", "secret1", "secret1", false), Mode::Signup);
        assert_eq!(result.field_errors.len(), 1);
        assert!(result.field_errors.contains_key(&FieldKey::Terms));
        assert_eq!(result.focus_field, Some(FieldKey::Terms));

        let result = validate(&signup("", "1", "2", false), Mode::Signup);
        assert!(result.field_errors.contains_key(&FieldKey::Terms));
    }

    #[test]
    fn signup_confirm_must_match_exactly() {
        let result = validate(&signup("Max", "secret1", "secret1 ", true), Mode::Signup);
        assert_eq!(
            result.field_errors.keys().copied().collect::<Vec<_>>(),
            vec![FieldKey::Confirm]
        );
        assert_eq!(result.focus_field, Some(FieldKey::Confirm));
    }

    #[test]
    fn signup_collects_every_error_in_priority_order() {
        let values = FormValues::from_raw("  ", "", "", "", false);
        let result = validate(&values, Mode::Signup);
        assert_eq!(
            result.field_errors.keys().copied().collect::<Vec<_>>(),
            vec![
                FieldKey::Email,
                FieldKey::Password,
                FieldKey::Name,
                FieldKey::Confirm,
                FieldKey::Terms
            ]
        );
        assert_eq!(result.focus_field, Some(FieldKey::Email));
    }
}
