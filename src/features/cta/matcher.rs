//! Which elements count as auth calls to action, and which mode they open.

use crate::features::auth::Mode;

/// Explicit opt-in selectors. Matches are bound regardless of their text.
pub const CTA_SELECTORS: &[&str] = &[
    r#"[data-auth="cta"]"#,
    r#"a[data-auth="login"]"#,
    r#"a[data-auth="signup"]"#,
    r#"button[data-auth="login"]"#,
    r#"button[data-auth="signup"]"#,
    r#"a[data-framer-name*="cta" i]"#,
    r#"button[data-framer-name*="cta" i]"#,
];

/// Plain links and buttons checked by the text heuristic.
pub const CLICKABLE_SELECTOR: &str = "a, button";

/// Lowercase phrases that mark a link or button as an auth CTA.
pub const CTA_PHRASES: &[&str] = &[
    "registrieren",
    "jetzt starten",
    "sign up",
    "signup",
    "login",
    "anmelden",
    "zum dashboard",
    "kostenlos testen",
];

/// Set to `"1"` on every bound node.
pub const BOUND_ATTR: &str = "data-auth-bound";
pub const MODE_ATTR: &str = "data-auth-mode";

const SIGNUP_TEXT_MARKERS: &[&str] = &["registr", "sign up"];

pub fn matches_phrase(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    !text.is_empty() && CTA_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// An explicit mode attribute wins; otherwise signup wording in the text
/// selects signup, and everything else opens login.
pub fn derive_mode(mode_attr: Option<&str>, text: &str) -> Mode {
    match mode_attr.map(|value| value.trim().to_lowercase()).as_deref() {
        Some("signup" | "register") => return Mode::Signup,
        Some("login" | "signin") => return Mode::Login,
        _ => {}
    }

    let text = text.to_lowercase();
    if SIGNUP_TEXT_MARKERS.iter().any(|marker| text.contains(marker)) {
        Mode::Signup
    } else {
        Mode::Login
    }
}

#[cfg(test)]
mod tests {
    use super::{Mode, derive_mode, matches_phrase};

    #[test]
    fn phrases_match_case_insensitively_inside_longer_text() {
        assert!(matches_phrase("  Jetzt Registrieren  "));
        assert!(matches_phrase("Kostenlos testen →"));
        assert!(matches_phrase("LOGIN"));
        assert!(!matches_phrase("Preise"));
        assert!(!matches_phrase("   "));
    }

    #[test]
    fn mode_attribute_wins_over_text() {
        assert_eq!(derive_mode(Some("signup"), "Login"), Mode::Signup);
        assert_eq!(derive_mode(Some("Register"), ""), Mode::Signup);
        assert_eq!(derive_mode(Some("signin"), "Jetzt registrieren"), Mode::Login);
    }

    #[test]
    fn text_markers_select_signup() {
        assert_eq!(derive_mode(None, "Jetzt Registrieren"), Mode::Signup);
        assert_eq!(derive_mode(None, "Sign up free"), Mode::Signup);
        assert_eq!(derive_mode(Some("unknown"), "Registrierung"), Mode::Signup);
    }

    #[test]
    fn everything_else_is_login() {
        assert_eq!(derive_mode(None, "Zum Dashboard"), Mode::Login);
        assert_eq!(derive_mode(None, ""), Mode::Login);
        assert_eq!(derive_mode(Some(""), "Anmelden"), Mode::Login);
    }
}
