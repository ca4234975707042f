//! Fixed German copy for the dialog. Everything the dialog shows is looked up
//! here; the state machine never patches text incrementally.

use super::types::Mode;

/// Per-mode text for the dialog chrome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeCopy {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub submit: &'static str,
    pub submit_busy: &'static str,
    pub footer_prompt: &'static str,
    pub footer_toggle: &'static str,
}

const LOGIN: ModeCopy = ModeCopy {
    title: "Willkommen zurück",
    subtitle: "Melden Sie sich an, um Ihr Dashboard zu öffnen.",
    submit: "Anmelden",
    submit_busy: "Anmelden…",
    footer_prompt: "Noch kein Konto?",
    footer_toggle: "Jetzt registrieren",
};

const SIGNUP: ModeCopy = ModeCopy {
    title: "Konto erstellen",
    subtitle: "Registrieren Sie sich kostenlos und legen Sie direkt los.",
    submit: "Registrieren",
    submit_busy: "Registrieren…",
    footer_prompt: "Bereits registriert?",
    footer_toggle: "Jetzt anmelden",
};

impl ModeCopy {
    pub fn for_mode(mode: Mode) -> &'static ModeCopy {
        match mode {
            Mode::Login => &LOGIN,
            Mode::Signup => &SIGNUP,
        }
    }

    pub fn submit_label(&self, submitting: bool) -> &'static str {
        if submitting {
            self.submit_busy
        } else {
            self.submit
        }
    }
}

pub const EMAIL_INVALID: &str = "Bitte geben Sie eine gültige E-Mail-Adresse ein.";
pub const NAME_REQUIRED: &str = "Bitte geben Sie Ihren vollständigen Namen ein.";
pub const CONFIRM_MISMATCH: &str = "Die Passwörter stimmen nicht überein.";
pub const TERMS_REQUIRED: &str = "Bitte akzeptieren Sie die Bedingungen.";

pub fn password_too_short(min_length: usize) -> String {
    format!("Passwort benötigt mindestens {min_length} Zeichen.")
}

pub const LOGIN_FAILED: &str = "Anmeldung fehlgeschlagen. Bitte überprüfen Sie Ihre Zugangsdaten.";
pub const SERVER_UNREACHABLE: &str =
    "Der Server ist momentan nicht erreichbar. Bitte versuchen Sie es später erneut.";
pub const TOKEN_MISSING: &str = "Token konnte nicht erstellt werden.";
pub const REDIRECTING: &str = "Weiterleitung zum Dashboard …";
pub const OAUTH_FAILED: &str = "Google-Anmeldung konnte nicht gestartet werden.";

/// Locale words that attribute a free-text signup error to the password field.
pub const PASSWORD_WORDS: &[&str] = &["passwort", "password"];
