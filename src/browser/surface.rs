//! `DialogSurface` for the mounted Leptos dialog.

use super::listener::EventListenerGuard;
use crate::app_lib::AppError;
use crate::components::{BODY_MODAL_CLASS, DIALOG_SELECTOR, FOCUSABLE_SELECTOR, field_input_id};
use crate::features::auth::focus_trap::TrapKey;
use crate::features::auth::{DialogController, DialogSnapshot, DialogSurface, FieldKey, FormValues};
use gloo_timers::callback::Timeout;
use leptos::prelude::{RwSignal, Set, WithUntracked};
use std::cell::{OnceCell, RefCell};
use std::rc::Weak;
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent};

pub(crate) struct DomSurface {
    document: Document,
    state: RwSignal<DialogSnapshot>,
    controller: OnceCell<Weak<RefCell<DialogController<DomSurface>>>>,
}

impl DomSurface {
    pub(crate) fn new(document: Document, state: RwSignal<DialogSnapshot>) -> Self {
        Self {
            document,
            state,
            controller: OnceCell::new(),
        }
    }

    /// Gives the key listener access to the controller that owns this surface.
    pub(crate) fn attach_controller(&self, controller: Weak<RefCell<DialogController<DomSurface>>>) {
        let _ = self.controller.set(controller);
    }

    fn input(&self, field: FieldKey) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(field_input_id(field))
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }

    fn value(&self, field: FieldKey) -> String {
        self.input(field).map(|input| input.value()).unwrap_or_default()
    }
}

impl DialogSurface for DomSurface {
    type Focus = HtmlElement;
    type KeyListener = Option<EventListenerGuard>;

    fn render(&self, snapshot: &DialogSnapshot) {
        self.state.set(snapshot.clone());
    }

    fn read_values(&self) -> FormValues {
        FormValues::from_raw(
            &self.value(FieldKey::Name),
            &self.value(FieldKey::Email),
            &self.value(FieldKey::Password),
            &self.value(FieldKey::Confirm),
            self.input(FieldKey::Terms)
                .is_some_and(|input| input.checked()),
        )
    }

    fn reset_values(&self) {
        for field in FieldKey::ALL {
            if let Some(input) = self.input(field) {
                input.set_value("");
                input.set_checked(false);
            }
        }
    }

    fn set_page_modal(&self, active: bool) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().toggle_with_force(BODY_MODAL_CLASS, active);
        }
    }

    /// Fields hidden by the current mode have no focus target.
    fn field_element(&self, field: FieldKey) -> Option<HtmlElement> {
        if !self.state.with_untracked(|snapshot| snapshot.shows_field(field)) {
            return None;
        }
        self.input(field).map(HtmlElement::from)
    }

    fn dialog_element(&self) -> Option<HtmlElement> {
        self.document
            .query_selector(DIALOG_SELECTOR)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn focusable_elements(&self) -> Vec<HtmlElement> {
        let Some(dialog) = self.dialog_element() else {
            return Vec::new();
        };
        let Ok(list) = dialog.query_selector_all(FOCUSABLE_SELECTOR) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .filter(|element| element.offset_parent().is_some() && !element.has_attribute("disabled"))
            .collect()
    }

    fn active_element(&self) -> Option<HtmlElement> {
        self.document
            .active_element()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    /// Focus moves run on the next tick, after the snapshot has been rendered,
    /// so fields revealed by the same transition can receive focus. Detached
    /// and disabled targets are refused up front.
    fn focus(&self, target: &HtmlElement) -> Result<(), AppError> {
        if !target.is_connected() {
            return Err(AppError::Dom("focus target is detached".to_string()));
        }
        if target.has_attribute("disabled") {
            return Err(AppError::Dom("focus target is disabled".to_string()));
        }
        let target = target.clone();
        let _ = Timeout::new(0, move || {
            if target.focus().is_err() {
                debug!("deferred focus failed");
            }
        })
        .forget();
        Ok(())
    }

    fn install_key_listener(&self) -> Option<EventListenerGuard> {
        let controller = self.controller.get()?.clone();
        let listener = EventListenerGuard::listen(&self.document, "keydown", true, move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(controller) = controller.upgrade() else {
                return;
            };
            let Ok(mut dialog) = controller.try_borrow_mut() else {
                return;
            };
            let action = dialog.handle_key(TrapKey::from_key(&event.key(), event.shift_key()));
            if action.prevents_default() {
                event.prevent_default();
            }
        });
        match listener {
            Ok(listener) => Some(listener),
            Err(err) => {
                debug!(error = %err, "focus trap unavailable");
                None
            }
        }
    }
}
