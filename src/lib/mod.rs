//! Shared utilities for configuration, errors, logging, HTTP access, and build
//! metadata.
//!
//! ## Remote contract
//!
//! The dialog talks to three endpoints on the configured API base:
//!
//! 1. **Login:** `POST /api/auth/login` with the credentials; the response carries
//!    the session token.
//! 2. **Registration:** `POST /api/auth/register` with the signup fields; a
//!    successful registration is followed by a login with the same credentials.
//! 3. **OAuth:** `POST /api/auth/oauth/google/initiate` with the callback URL;
//!    the response carries the provider URL the page navigates to.
//!
//! Centralizing these helpers keeps network behavior consistent between the
//! submit flow and the OAuth button. Callers must avoid logging request bodies
//! since they carry passwords.

pub(crate) mod api;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod errors;
pub mod logging;
pub mod reply;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub use config::AppConfig;
pub use errors::{AppError, BestEffort};
pub use reply::RemoteReply;
