//! Persists a freshly obtained session so the dashboard can pick it up.
//!
//! The token goes to the durable key-value store and to two cookies. Every
//! write is best effort: a blocked store or cookie jar must not turn a
//! successful login into a failure.

use super::types::Session;
use crate::app_lib::{AppError, BestEffort};
use secrecy::ExposeSecret;
use tracing::debug;
use url::Host;

pub const TOKEN_KEY: &str = "landing_auth_token";
pub const USER_KEY: &str = "landing_auth_user";
pub const SESSION_COOKIES: [&str; 2] = ["sat", "sid"];
pub const COOKIE_MAX_AGE_SECS: u32 = 60 * 60 * 24;

/// Client-side storage the session is written to.
pub trait SessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;
    /// Assigns one raw `name=value; attr...` string to the cookie jar.
    fn write_cookie(&self, cookie: &str) -> Result<(), AppError>;
    fn hostname(&self) -> Option<String>;
}

pub fn persist_session<S: SessionStore + ?Sized>(store: &S, session: &Session) {
    let token = session.token.expose_secret();
    store.set_item(TOKEN_KEY, token).best_effort("store token");
    if let Some(user) = &session.user {
        match serde_json::to_string(user) {
            Ok(encoded) => store.set_item(USER_KEY, &encoded).best_effort("store user"),
            Err(err) => debug!(error = %err, "user record not serializable"),
        }
    }

    let domain = store.hostname().and_then(|host| parent_domain(&host));
    for name in SESSION_COOKIES {
        let cookie = cookie_string(name, token, COOKIE_MAX_AGE_SECS);
        store.write_cookie(&cookie).best_effort("write cookie");
        if let Some(domain) = &domain {
            store
                .write_cookie(&format!("{cookie}; domain={domain}"))
                .best_effort("write parent domain cookie");
        }
    }
    debug!(parent_domain = domain.as_deref(), "session persisted");
}

/// Builds the host-only cookie string; the value is percent-encoded.
pub fn cookie_string(name: &str, value: &str, max_age: u32) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{name}={encoded}; path=/; max-age={max_age}; secure; samesite=None")
}

/// `.example.de` for `app.example.de`; `None` for two-label hosts and IPs.
pub fn parent_domain(hostname: &str) -> Option<String> {
    let hostname = hostname.trim().trim_end_matches('.');
    if !matches!(Host::parse(hostname), Ok(Host::Domain(_))) {
        return None;
    }
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() <= 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    Some(format!(".{}", labels[labels.len() - 2..].join(".")))
}

#[cfg(test)]
mod tests {
    use super::{cookie_string, parent_domain};

    #[test]
    fn cookie_carries_all_attributes() {
        assert_eq!(
            cookie_string("sat", "t1", 86400),
            "sat=t1; path=/; max-age=86400; secure; samesite=None"
        );
    }

    #[test]
    fn cookie_value_is_encoded() {
        let cookie = cookie_string("sid", "a b;c=d", 10);
        assert!(cookie.starts_with("sid=a+b%3Bc%3Dd;"), "{cookie}");
    }

    #[test]
    fn parent_domain_needs_more_than_two_labels() {
        assert_eq!(parent_domain("www.example.de").as_deref(), Some(".example.de"));
        assert_eq!(parent_domain("a.b.example.de").as_deref(), Some(".example.de"));
        assert_eq!(parent_domain("example.de"), None);
        assert_eq!(parent_domain("localhost"), None);
    }

    #[test]
    fn parent_domain_skips_ip_hosts() {
        assert_eq!(parent_domain("192.168.0.10"), None);
        assert_eq!(parent_domain("[::1]"), None);
        assert_eq!(parent_domain(""), None);
    }
}
