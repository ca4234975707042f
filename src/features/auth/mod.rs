//! Auth dialog feature: validation, remote error normalization, the dialog
//! state machine with its focus trap, session persistence, and the submission
//! flow that ties them together. Passwords and tokens pass through this module
//! and must never be logged.
//!
//! Flow Overview: a submit validates locally, then calls login (or register
//! followed by login). Rejections are normalized into the same per-field errors
//! the validator produces; a token is persisted to storage and cookies before a
//! short delayed navigation to the dashboard.

pub mod client;
pub mod copy;
pub mod dialog;
pub mod focus_trap;
pub mod normalize;
pub mod session;
pub mod submit;
pub mod types;
pub mod validation;

pub use dialog::{DialogController, DialogSnapshot, DialogSurface};
pub use types::{FieldErrors, FieldKey, FormValues, Mode};
