//! The auth dialog state machine.
//!
//! `DialogController` owns every piece of dialog state: mode, open flag,
//! submitting flag, errors, status message, the focus back-reference, the
//! focus trap, and the pending redirect. After each transition it renders a
//! [`DialogSnapshot`] through the [`DialogSurface`]; everything visible is a
//! projection of that snapshot.

use super::copy::ModeCopy;
use super::focus_trap::{self, FocusTrap, TrapAction, TrapKey};
use super::normalize::NormalizedErrors;
use super::types::{FieldErrors, FieldKey, FormValues, Mode};
use crate::app_lib::{AppError, BestEffort};
use crate::features::schedule::TimerHandle;
use tracing::debug;

/// Document access the dialog needs. The browser implementation renders the
/// snapshot reactively and reads the form inputs.
pub trait DialogSurface {
    /// Handle to a focusable element.
    type Focus: Clone + PartialEq;
    /// Installed keyboard listener; dropping it uninstalls it.
    type KeyListener;

    fn render(&self, snapshot: &DialogSnapshot);
    fn read_values(&self) -> FormValues;
    fn reset_values(&self);
    /// Marks the host page as having an active modal (scroll lock, inert styling).
    fn set_page_modal(&self, active: bool);
    fn field_element(&self, field: FieldKey) -> Option<Self::Focus>;
    fn dialog_element(&self) -> Option<Self::Focus>;
    /// Visible, enabled focusable descendants of the dialog, in tab order.
    fn focusable_elements(&self) -> Vec<Self::Focus>;
    fn active_element(&self) -> Option<Self::Focus>;
    fn focus(&self, target: &Self::Focus) -> Result<(), AppError>;
    fn install_key_listener(&self) -> Self::KeyListener;
}

/// Everything the dialog shows, derived from controller state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogSnapshot {
    pub mode: Mode,
    pub open: bool,
    pub submitting: bool,
    pub oauth_pending: bool,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub submit_label: &'static str,
    pub footer_prompt: &'static str,
    pub footer_toggle: &'static str,
    pub field_errors: FieldErrors,
    pub general_error: Option<String>,
    pub message: Option<String>,
}

impl DialogSnapshot {
    pub fn error_for(&self, field: FieldKey) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// Signup-only fields are hidden in login mode.
    pub fn shows_field(&self, field: FieldKey) -> bool {
        self.mode == Mode::Signup || !field.is_signup_only()
    }

    /// Inline `display` for the overlay. A closed dialog stays hidden even
    /// when the host page ships no stylesheet for it.
    pub fn overlay_display(&self) -> &'static str {
        if self.open { "" } else { "none" }
    }

    /// Inline `display` for a field row.
    pub fn field_display(&self, field: FieldKey) -> &'static str {
        if self.shows_field(field) { "" } else { "none" }
    }
}

pub struct DialogController<S: DialogSurface> {
    surface: S,
    mode: Mode,
    open: bool,
    submitting: bool,
    oauth_pending: bool,
    field_errors: FieldErrors,
    general_error: Option<String>,
    message: Option<String>,
    last_focused: Option<S::Focus>,
    focus_trap: FocusTrap<S::KeyListener>,
    redirect: Option<Box<dyn TimerHandle>>,
}

impl<S: DialogSurface> DialogController<S> {
    /// Creates a closed dialog in login mode and renders it once.
    pub fn new(surface: S) -> Self {
        let controller = Self {
            surface,
            mode: Mode::Login,
            open: false,
            submitting: false,
            oauth_pending: false,
            field_errors: FieldErrors::new(),
            general_error: None,
            message: None,
            last_focused: None,
            focus_trap: FocusTrap::default(),
            redirect: None,
        };
        controller.render();
        controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_oauth_pending(&self) -> bool {
        self.oauth_pending
    }

    pub fn has_pending_redirect(&self) -> bool {
        self.redirect.is_some()
    }

    pub fn is_trap_active(&self) -> bool {
        self.focus_trap.is_active()
    }

    pub fn snapshot(&self) -> DialogSnapshot {
        let copy = ModeCopy::for_mode(self.mode);
        DialogSnapshot {
            mode: self.mode,
            open: self.open,
            submitting: self.submitting,
            oauth_pending: self.oauth_pending,
            title: copy.title,
            subtitle: copy.subtitle,
            submit_label: copy.submit_label(self.submitting),
            footer_prompt: copy.footer_prompt,
            footer_toggle: copy.footer_toggle,
            field_errors: self.field_errors.clone(),
            general_error: self.general_error.clone(),
            message: self.message.clone(),
        }
    }

    /// Opens the dialog in `mode`. An open dialog only switches mode and drops
    /// its status message.
    pub fn open(&mut self, mode: Mode) {
        self.cancel_redirect();
        self.message = None;
        self.set_mode(mode);
        if self.open {
            return;
        }

        debug!(mode = %mode, "opening auth dialog");
        self.last_focused = self.surface.active_element();
        self.open = true;
        self.surface.set_page_modal(true);
        self.render();

        let surface = &self.surface;
        self.focus_trap.activate(|| surface.install_key_listener());
        self.focus_initial_field();
    }

    /// Switches mode. A real change drops all errors and the status message.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.field_errors.clear();
            self.general_error = None;
            self.message = None;
        }
        self.render();
    }

    /// Footer toggle: flips the mode and focuses the new mode's first field.
    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
        if self.open {
            self.focus_initial_field();
        }
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }

        debug!("closing auth dialog");
        self.open = false;
        self.surface.set_page_modal(false);
        self.focus_trap.deactivate();
        self.field_errors.clear();
        self.general_error = None;
        self.message = None;
        self.cancel_redirect();
        self.surface.reset_values();
        self.render();

        if let Some(target) = self.last_focused.take() {
            self.surface.focus(&target).best_effort("restore focus");
        }
    }

    /// Toggles the busy label and disabled state of the submit control.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
        self.render();
    }

    pub fn set_oauth_pending(&mut self, pending: bool) {
        self.oauth_pending = pending;
        self.render();
    }

    pub fn read_values(&self) -> FormValues {
        self.surface.read_values()
    }

    /// Removes all field errors, the general error, and the status message.
    pub fn clear_feedback(&mut self) {
        self.field_errors.clear();
        self.general_error = None;
        self.message = None;
        self.render();
    }

    /// Shows errors from validation or from the normalizer; both land here.
    pub fn show_errors(&mut self, errors: NormalizedErrors) {
        self.field_errors = errors.field_errors;
        if errors.general.is_some() {
            self.general_error = errors.general;
        }
        self.render();
    }

    pub fn set_general_error(&mut self, message: impl Into<String>) {
        self.general_error = Some(message.into());
        self.render();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.render();
    }

    pub fn focus_field(&self, field: FieldKey) {
        match self.surface.field_element(field) {
            Some(target) => self.surface.focus(&target).best_effort("focus field"),
            None => debug!(field = field.as_str(), "field element missing"),
        }
    }

    /// Focuses the mode's first field, falling back to the dialog itself.
    pub fn focus_initial_field(&self) {
        let focused = self
            .surface
            .field_element(self.mode.initial_field())
            .is_some_and(|target| self.surface.focus(&target).is_ok());
        if !focused && let Some(dialog) = self.surface.dialog_element() {
            self.surface.focus(&dialog).best_effort("focus dialog");
        }
    }

    /// Focus trap key handling; returns what happened so the caller can
    /// prevent the browser default.
    pub fn handle_key(&mut self, key: TrapKey) -> TrapAction {
        if !self.open {
            return TrapAction::Ignore;
        }

        let focusables = self.surface.focusable_elements();
        let active = self.surface.active_element();
        let action = focus_trap::decide(key, &focusables, active.as_ref());
        match action {
            TrapAction::Close => self.close(),
            TrapAction::MoveTo(index) => {
                if let Some(target) = focusables.get(index) {
                    self.surface.focus(target).best_effort("move focus");
                }
            }
            TrapAction::Ignore | TrapAction::Suppress => {}
        }
        action
    }

    /// Keeps the redirect timer so closing or reopening can cancel it.
    pub fn arm_redirect(&mut self, timer: Box<dyn TimerHandle>) {
        self.redirect = Some(timer);
    }

    /// Called by the redirect timer once it fires: forgets the fired timer and
    /// closes the dialog before the page navigates away.
    pub fn complete_redirect(&mut self) {
        self.redirect = None;
        self.close();
    }

    /// Drops the pending redirect, which cancels it. The redirect status
    /// message goes with it.
    pub fn cancel_redirect(&mut self) {
        if self.redirect.take().is_some() {
            debug!("pending redirect cancelled");
            self.message = None;
            self.render();
        }
    }

    fn render(&self) {
        self.surface.render(&self.snapshot());
    }
}
