//! Window-level entry points: the global open/close functions, posted
//! messages, host hooks, and the ready event.

use super::Context;
use super::listener::EventListenerGuard;
use crate::app_lib::AppError;
use crate::features::auth::Mode;
use crate::features::bridge::{
    BridgeMessage, CLOSE_FUNCTION, HOST_CLOSE_HOOK, HOST_OPEN_HOOK, OPEN_FUNCTION, OpenRoute,
    READY_EVENT, open_message, open_route,
};
use js_sys::{Function, JSON, Reflect};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, MessageEvent, Window};

/// Keeps the exposed closures and the message listener alive.
pub(super) struct Globals {
    _open: Closure<dyn Fn(JsValue)>,
    _close: Closure<dyn Fn()>,
    _messages: EventListenerGuard,
}

pub(super) fn expose(context: &Rc<Context>) -> Result<Globals, AppError> {
    let window = context.window().clone();

    let weak = Rc::downgrade(context);
    let open = Closure::<dyn Fn(JsValue)>::new(move |mode: JsValue| {
        if let Some(context) = weak.upgrade() {
            request_open(&context, Mode::parse(&mode.as_string().unwrap_or_default()));
        }
    });
    set_global(&window, OPEN_FUNCTION, open.as_ref())?;

    let weak = Rc::downgrade(context);
    let close = Closure::<dyn Fn()>::new(move || {
        if let Some(context) = weak.upgrade() {
            request_close(&context);
        }
    });
    set_global(&window, CLOSE_FUNCTION, close.as_ref())?;

    let weak = Rc::downgrade(context);
    let messages = EventListenerGuard::listen(&window, "message", false, move |event| {
        let Some(event) = event.dyn_ref::<MessageEvent>() else {
            return;
        };
        let Some(message) = message_json(&event.data()).and_then(|data| BridgeMessage::parse(&data))
        else {
            return;
        };
        let Some(context) = weak.upgrade() else {
            return;
        };
        debug!(?message, "bridge message received");
        match message.mode() {
            Some(mode) => request_open(&context, mode),
            None => request_close(&context),
        }
    })?;

    match CustomEvent::new(READY_EVENT) {
        Ok(ready) => {
            let _ = window.dispatch_event(&ready);
        }
        Err(_) => debug!("ready event unavailable"),
    }

    Ok(Globals {
        _open: open,
        _close: close,
        _messages: messages,
    })
}

/// Routes an open request to the host hook, or opens the dialog here and
/// tells the parent frame when embedded.
pub(super) fn request_open(context: &Rc<Context>, mode: Mode) {
    let window = context.window();
    let hook = host_hook(window, HOST_OPEN_HOOK);
    match open_route(hook.is_some(), is_embedded(window)) {
        OpenRoute::Delegate => {
            if let Some(hook) = hook
                && hook.call1(&JsValue::NULL, &JsValue::from_str(mode.as_str())).is_err()
            {
                warn!("host open hook failed");
            }
        }
        OpenRoute::Local { notify_parent } => {
            if notify_parent {
                post_to_parent(window, mode);
            }
            context.open_local(mode);
        }
    }
}

fn request_close(context: &Rc<Context>) {
    match host_hook(context.window(), HOST_CLOSE_HOOK) {
        Some(hook) => {
            if hook.call0(&JsValue::NULL).is_err() {
                warn!("host close hook failed");
            }
        }
        None => context.close_local(),
    }
}

fn set_global(window: &Window, name: &str, value: &JsValue) -> Result<(), AppError> {
    Reflect::set(window, &JsValue::from_str(name), value)
        .map(|_| ())
        .map_err(|_| AppError::Dom(format!("Failed to expose {name}")))
}

fn host_hook(window: &Window, name: &str) -> Option<Function> {
    Reflect::get(window, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn is_embedded(window: &Window) -> bool {
    window
        .parent()
        .ok()
        .flatten()
        .is_some_and(|parent| parent != *window)
}

fn post_to_parent(window: &Window, mode: Mode) {
    let Some(parent) = window.parent().ok().flatten() else {
        return;
    };
    let Ok(payload) = JSON::parse(&open_message(mode).to_string()) else {
        return;
    };
    if parent.post_message(&payload, "*").is_err() {
        debug!("parent frame rejected open message");
    }
}

/// Converts posted data to JSON; values that cannot be serialized are ignored.
fn message_json(data: &JsValue) -> Option<Value> {
    let text = JSON::stringify(data).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}
