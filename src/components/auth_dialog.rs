use crate::features::auth::{DialogSnapshot, FieldKey};
use leptos::prelude::*;

pub(crate) const OVERLAY_SELECTOR: &str = "[data-auth-overlay]";
pub(crate) const DIALOG_SELECTOR: &str = "[data-auth-dialog]";
pub(crate) const FORM_SELECTOR: &str = "[data-auth-form]";
pub(crate) const CLOSE_SELECTOR: &str = "[data-auth-close]";
pub(crate) const GOOGLE_SELECTOR: &str = "[data-auth-google]";
pub(crate) const TOGGLE_SELECTOR: &str = "[data-auth-footer-toggle]";
/// Matches the dialog and its overlay; clicks inside are never intercepted.
pub(crate) const WITHIN_DIALOG_SELECTOR: &str = ".landing-auth-modal, .landing-auth-overlay";
pub(crate) const FOCUSABLE_SELECTOR: &str = r#"a[href], button:not([disabled]), textarea:not([disabled]), input:not([disabled]), select:not([disabled]), [tabindex]:not([tabindex="-1"])"#;
/// Set on `<body>` while the dialog is open.
pub(crate) const BODY_MODAL_CLASS: &str = "landing-auth-modal-open";

pub(crate) fn field_input_id(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Name => "landing-auth-name",
        FieldKey::Email => "landing-auth-email",
        FieldKey::Password => "landing-auth-password",
        FieldKey::Confirm => "landing-auth-confirm",
        FieldKey::Terms => "landing-auth-terms",
    }
}

/// Overlay, dialog chrome, and the login/signup form.
#[component]
pub(crate) fn AuthDialog(state: RwSignal<DialogSnapshot>) -> impl IntoView {
    let open = move || state.with(|snapshot| snapshot.open);
    let busy = move || state.with(|snapshot| snapshot.submitting);

    view! {
        <div
            class="landing-auth-overlay"
            class:is-open=open
            style:display=move || state.with(DialogSnapshot::overlay_display)
            data-auth-overlay=""
            data-mode=move || state.with(|snapshot| snapshot.mode.as_str())
            aria-hidden=move || (!open()).to_string()
        >
            <div
                class="landing-auth-modal"
                data-auth-dialog=""
                role="dialog"
                aria-modal="true"
                aria-labelledby="landing-auth-title"
                tabindex="-1"
            >
                <button type="button" class="landing-auth-close" data-auth-close="" aria-label="Schließen">
                    <span aria-hidden="true">"×"</span>
                </button>
                <div class="landing-auth-header">
                    <h2 class="landing-auth-title" id="landing-auth-title">
                        {move || state.with(|snapshot| snapshot.title)}
                    </h2>
                    <p class="landing-auth-subtitle">
                        {move || state.with(|snapshot| snapshot.subtitle)}
                    </p>
                </div>
                <button
                    type="button"
                    class="landing-auth-google"
                    data-auth-google=""
                    disabled=move || state.with(|snapshot| snapshot.oauth_pending)
                >
                    <span>"Mit Google fortfahren"</span>
                </button>
                <div class="landing-auth-divider">
                    <span>"oder mit E-Mail"</span>
                </div>
                <form class="landing-auth-form" data-auth-form="" novalidate=true>
                    <TextField
                        state=state
                        field=FieldKey::Name
                        label="Vollständiger Name"
                        input_type="text"
                        autocomplete="name"
                        placeholder="Dr. Max Müller"
                    />
                    <TextField
                        state=state
                        field=FieldKey::Email
                        label="E-Mail-Adresse"
                        input_type="email"
                        autocomplete="email"
                        placeholder="kanzlei@example.de"
                    />
                    <TextField
                        state=state
                        field=FieldKey::Password
                        label="Passwort"
                        input_type="password"
                        autocomplete="current-password"
                        placeholder="••••••••"
                    />
                    <TextField
                        state=state
                        field=FieldKey::Confirm
                        label="Passwort bestätigen"
                        input_type="password"
                        autocomplete="new-password"
                        placeholder="Passwort bestätigen"
                    />
                    <TermsField state=state />
                    <div class="landing-auth-global-error" role="alert">
                        {move || state.with(|snapshot| snapshot.general_error.clone())}
                    </div>
                    <div class="landing-auth-message" aria-live="polite">
                        {move || state.with(|snapshot| snapshot.message.clone())}
                    </div>
                    <button
                        type="submit"
                        class="landing-auth-submit"
                        disabled=busy
                        aria-busy=move || busy().to_string()
                    >
                        {move || state.with(|snapshot| snapshot.submit_label)}
                    </button>
                </form>
                <div class="landing-auth-footer">
                    <span>{move || state.with(|snapshot| snapshot.footer_prompt)}</span>
                    <button type="button" data-auth-footer-toggle="">
                        {move || state.with(|snapshot| snapshot.footer_toggle)}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn TextField(
    state: RwSignal<DialogSnapshot>,
    field: FieldKey,
    label: &'static str,
    input_type: &'static str,
    autocomplete: &'static str,
    placeholder: &'static str,
) -> impl IntoView {
    let id = field_input_id(field);
    let error = move || state.with(|snapshot| snapshot.error_for(field).map(str::to_string));

    view! {
        <div
            class="landing-auth-field"
            data-auth-field=field.as_str()
            data-invalid=move || error().map(|_| "true")
            style:display=move || state.with(|snapshot| snapshot.field_display(field))
        >
            <label for=id>{label}</label>
            <input
                id=id
                name=field.as_str()
                type=input_type
                autocomplete=autocomplete
                placeholder=placeholder
            />
            <p class="landing-auth-field-error" aria-live="polite">
                {error}
            </p>
        </div>
    }
}

#[component]
fn TermsField(state: RwSignal<DialogSnapshot>) -> impl IntoView {
    let field = FieldKey::Terms;
    let error = move || state.with(|snapshot| snapshot.error_for(field).map(str::to_string));

    view! {
        <div
            class="landing-auth-field landing-auth-field--checkbox"
            data-auth-field=field.as_str()
            data-invalid=move || error().map(|_| "true")
            style:display=move || state.with(|snapshot| snapshot.field_display(field))
        >
            <label class="landing-auth-checkbox">
                <input id=field_input_id(field) type="checkbox" name=field.as_str() />
                <span>
                    "Ich stimme den "
                    <a href="/terms" target="_blank" rel="noopener">"AGB"</a>
                    " und "
                    <a href="/privacy" target="_blank" rel="noopener">"Datenschutzbestimmungen"</a>
                    " zu."
                </span>
            </label>
            <p class="landing-auth-field-error" aria-live="polite">
                {error}
            </p>
        </div>
    }
}
