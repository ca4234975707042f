//! Leptos markup for the auth dialog. Components only project the dialog
//! snapshot; event handling is wired by the browser module after mounting.

pub(crate) mod auth_dialog;

pub(crate) use auth_dialog::{
    AuthDialog, BODY_MODAL_CLASS, CLOSE_SELECTOR, DIALOG_SELECTOR, FOCUSABLE_SELECTOR,
    FORM_SELECTOR, GOOGLE_SELECTOR, OVERLAY_SELECTOR, TOGGLE_SELECTOR, WITHIN_DIALOG_SELECTOR,
    field_input_id,
};

use crate::features::auth::DialogSnapshot;
use leptos::prelude::*;

/// Appends the dialog to `<body>`; it stays mounted for the life of the page.
pub(crate) fn mount_dialog(state: RwSignal<DialogSnapshot>) {
    mount_to_body(move || view! { <AuthDialog state=state /> });
}
