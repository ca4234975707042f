//! Submission flow: validate, call the endpoint for the active mode, then either
//! show the normalized rejection or persist the session and schedule the
//! dashboard redirect.
//!
//! The dialog is shared with event handlers as `Rc<RefCell<_>>`. No borrow is
//! held across the network await: a submit is split into a synchronous
//! [`prepare`] step, the remote calls, and a synchronous completion step.

use super::client::AuthApi;
use super::copy;
use super::dialog::{DialogController, DialogSurface};
use super::normalize::{self, NormalizedErrors};
use super::session::{SessionStore, persist_session};
use super::types::{FormValues, LoginRequest, Mode, OAuthInitiateRequest, RegisterRequest, Session};
use super::validation::validate;
use crate::app_lib::reply::is_truthy;
use crate::app_lib::{AppError, RemoteReply};
use crate::features::schedule::{Navigator, Scheduler};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use url::Url;

/// Registration fields the landing page does not ask for.
const DEFAULT_FIRST_NAME: &str = "Landing";
const DEFAULT_LAST_NAME: &str = "User";
const DEFAULT_TITLE: &str = "Rechtsanwalt";
const DEFAULT_FIRM_NAME: &str = "Landing-Kanzlei";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitSettings {
    pub dashboard_path: String,
    pub redirect_delay_ms: u32,
    /// Absolute OAuth callback URL; `None` disables the OAuth button flow.
    pub oauth_redirect_uri: Option<String>,
}

/// How a submit attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight.
    Busy,
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The remote side rejected the request or could not be reached.
    Rejected,
    /// The session was persisted and the redirect is scheduled.
    Succeeded,
}

/// Validated input captured when a submit starts.
#[derive(Debug)]
pub struct SubmitPlan {
    pub mode: Mode,
    pub values: FormValues,
}

#[derive(Debug)]
pub enum SubmitFailure {
    Rejected { status: u16, payload: Value },
    Transport(AppError),
}

impl SubmitFailure {
    fn into_errors(self, mode: Mode) -> NormalizedErrors {
        match self {
            SubmitFailure::Rejected { status, payload } => {
                normalize::normalize(&payload, status, mode)
            }
            SubmitFailure::Transport(err) => {
                warn!(error = %err, "auth request failed");
                normalize::transport_failure()
            }
        }
    }
}

impl From<AppError> for SubmitFailure {
    fn from(err: AppError) -> Self {
        SubmitFailure::Transport(err)
    }
}

/// Idle to Submitting: clears feedback and validates. Returns the outcome
/// instead of a plan when the submit ends here, either because one is already
/// running or because the form is invalid (errors are shown and the first
/// invalid field is focused).
pub fn prepare<S: DialogSurface>(
    dialog: &mut DialogController<S>,
) -> Result<SubmitPlan, SubmitOutcome> {
    if dialog.is_submitting() {
        return Err(SubmitOutcome::Busy);
    }

    dialog.clear_feedback();
    let mode = dialog.mode();
    let values = dialog.read_values();
    let result = validate(&values, mode);
    if !result.is_valid() {
        dialog.show_errors(NormalizedErrors {
            field_errors: result.field_errors,
            general: None,
        });
        if let Some(field) = result.focus_field {
            dialog.focus_field(field);
        }
        return Err(SubmitOutcome::Invalid);
    }

    dialog.set_submitting(true);
    Ok(SubmitPlan { mode, values })
}

pub struct SubmissionController<A, St, Sc, N> {
    api: A,
    store: St,
    scheduler: Sc,
    navigator: Rc<N>,
    settings: SubmitSettings,
}

impl<A, St, Sc, N> SubmissionController<A, St, Sc, N>
where
    A: AuthApi,
    St: SessionStore,
    Sc: Scheduler,
    N: Navigator + 'static,
{
    pub fn new(api: A, store: St, scheduler: Sc, navigator: Rc<N>, settings: SubmitSettings) -> Self {
        Self {
            api,
            store,
            scheduler,
            navigator,
            settings,
        }
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    pub async fn submit<S: DialogSurface + 'static>(
        &self,
        dialog: &Rc<RefCell<DialogController<S>>>,
    ) -> SubmitOutcome {
        let plan = match prepare(&mut dialog.borrow_mut()) {
            Ok(plan) => plan,
            Err(outcome) => return outcome,
        };

        debug!(mode = %plan.mode, "submitting auth form");
        let result = self.execute(&plan).await;
        self.complete(dialog, plan.mode, result)
    }

    async fn execute(&self, plan: &SubmitPlan) -> Result<Session, SubmitFailure> {
        if plan.mode == Mode::Signup {
            self.register(&plan.values).await?;
        }
        let reply = self.api.login(&LoginRequest::from_values(&plan.values)).await?;
        interpret_login(reply, &plan.values.email)
    }

    async fn register(&self, values: &FormValues) -> Result<(), SubmitFailure> {
        let reply = self.api.register(&registration_request(values)).await?;
        let rejected = reply.is_http_error()
            || reply.body.get("error").is_some_and(is_truthy)
            || reply.body.get("detail").is_some_and(is_truthy);
        if rejected {
            return Err(SubmitFailure::Rejected {
                status: reply.status,
                payload: reply.body,
            });
        }
        Ok(())
    }

    fn complete<S: DialogSurface + 'static>(
        &self,
        dialog: &Rc<RefCell<DialogController<S>>>,
        mode: Mode,
        result: Result<Session, SubmitFailure>,
    ) -> SubmitOutcome {
        let mut controller = dialog.borrow_mut();
        controller.set_submitting(false);

        match result {
            Ok(session) => {
                persist_session(&self.store, &session);
                controller.set_message(copy::REDIRECTING);
                let timer = self
                    .scheduler
                    .schedule(self.settings.redirect_delay_ms, self.redirect_task(dialog));
                controller.arm_redirect(timer);
                info!(mode = %mode, "authenticated, redirect scheduled");
                SubmitOutcome::Succeeded
            }
            Err(failure) => {
                let errors = failure.into_errors(mode);
                if !controller.is_open() {
                    debug!("dialog closed during submit, discarding errors");
                    return SubmitOutcome::Rejected;
                }
                let focus = errors.field_errors.keys().next().copied();
                controller.show_errors(errors);
                if let Some(field) = focus {
                    controller.focus_field(field);
                }
                SubmitOutcome::Rejected
            }
        }
    }

    /// Closes the dialog, then navigates to the dashboard.
    fn redirect_task<S: DialogSurface + 'static>(
        &self,
        dialog: &Rc<RefCell<DialogController<S>>>,
    ) -> Box<dyn FnOnce()> {
        let dialog = Rc::downgrade(dialog);
        let navigator = Rc::clone(&self.navigator);
        let target = self.settings.dashboard_path.clone();
        Box::new(move || {
            if let Some(dialog) = dialog.upgrade() {
                match dialog.try_borrow_mut() {
                    Ok(mut controller) => controller.complete_redirect(),
                    Err(_) => debug!("dialog busy when redirect fired"),
                }
            }
            navigator.navigate(&target);
        })
    }

    /// Starts the Google OAuth flow and navigates to the provider on success.
    pub async fn start_oauth<S: DialogSurface>(&self, dialog: &Rc<RefCell<DialogController<S>>>) {
        {
            let mut controller = dialog.borrow_mut();
            if controller.is_oauth_pending() {
                return;
            }
            controller.clear_feedback();
            controller.set_oauth_pending(true);
        }

        match self.initiate_oauth().await {
            Ok(auth_url) => {
                info!("redirecting to oauth provider");
                self.navigator.navigate(&auth_url);
            }
            Err(message) => {
                let mut controller = dialog.borrow_mut();
                controller.set_general_error(message);
                controller.set_oauth_pending(false);
            }
        }
    }

    async fn initiate_oauth(&self) -> Result<String, String> {
        let Some(redirect_uri) = self.settings.oauth_redirect_uri.clone() else {
            warn!("oauth callback url unavailable");
            return Err(copy::OAUTH_FAILED.to_string());
        };
        let reply = self
            .api
            .initiate_oauth(&OAuthInitiateRequest { redirect_uri })
            .await
            .map_err(|err| {
                warn!(error = %err, "oauth initiation failed");
                copy::OAUTH_FAILED.to_string()
            })?;

        match reply.str_field("auth_url").filter(|url| !url.is_empty()) {
            Some(url) if !reply.is_http_error() => Ok(url.to_string()),
            _ => Err(normalize::extract_message(&reply.body)
                .unwrap_or_else(|| copy::OAUTH_FAILED.to_string())),
        }
    }
}

/// Reads a login reply: a rejection marker or a missing token is a failure.
pub fn interpret_login(reply: RemoteReply, email: &str) -> Result<Session, SubmitFailure> {
    let body = &reply.body;
    let rejected = reply.is_http_error()
        || body.get("error").is_some_and(is_truthy)
        || body.get("success") == Some(&Value::Bool(false));
    if rejected {
        return Err(SubmitFailure::Rejected {
            status: reply.status,
            payload: reply.body,
        });
    }

    let Some(token) = extract_token(body) else {
        let status = if reply.status == 0 { 500 } else { reply.status };
        return Err(SubmitFailure::Rejected {
            status,
            payload: json!({ "error": copy::TOKEN_MISSING }),
        });
    };

    let user = match body.get("user") {
        Some(user) if is_truthy(user) => user.clone(),
        _ => json!({ "email": email }),
    };
    Ok(Session {
        token: SecretString::from(token.to_string()),
        user: Some(user),
    })
}

/// `token`, then `access_token`, then `tokens.access_token`.
fn extract_token(body: &Value) -> Option<&str> {
    [
        body.get("token"),
        body.get("access_token"),
        body.get("tokens").and_then(|tokens| tokens.get("access_token")),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|token| !token.is_empty())
}

pub fn registration_request(values: &FormValues) -> RegisterRequest<'_> {
    let (first, last) = values.split_name();
    let first_name = if first.is_empty() {
        DEFAULT_FIRST_NAME.to_string()
    } else {
        first
    };
    let last_name = if last.is_empty() {
        DEFAULT_LAST_NAME.to_string()
    } else {
        last
    };
    RegisterRequest {
        email: &values.email,
        password: values.password.expose_secret(),
        first_name,
        last_name,
        title: DEFAULT_TITLE,
        firm_name: DEFAULT_FIRM_NAME,
        terms_accepted: values.terms,
        remember_me: false,
    }
}

/// Absolute callback URL for the OAuth provider, rooted at the page origin.
pub fn oauth_callback_url(origin: &str, callback_path: &str) -> Result<String, AppError> {
    let base = Url::parse(origin)
        .map_err(|err| AppError::Config(format!("Invalid page origin {origin:?}: {err}")))?;
    base.join(callback_path)
        .map(String::from)
        .map_err(|err| AppError::Config(format!("Invalid OAuth callback path: {err}")))
}
