//! Browser implementations of storage, timers, and navigation.

use crate::app_lib::AppError;
use crate::features::auth::session::SessionStore;
use crate::features::schedule::{Navigator, Scheduler, TimerHandle};
use gloo_timers::callback::Timeout;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{HtmlDocument, Window};

/// `localStorage` plus `document.cookie`.
pub(crate) struct BrowserStorage {
    window: Window,
}

impl BrowserStorage {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl SessionStore for BrowserStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let storage = self
            .window
            .local_storage()
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Dom("localStorage unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|_| AppError::Dom(format!("Failed to store {key}")))
    }

    fn write_cookie(&self, cookie: &str) -> Result<(), AppError> {
        let document = self
            .window
            .document()
            .and_then(|document| document.dyn_into::<HtmlDocument>().ok())
            .ok_or_else(|| AppError::Dom("Document does not accept cookies".to_string()))?;
        document
            .set_cookie(cookie)
            .map_err(|_| AppError::Dom("Cookie rejected".to_string()))
    }

    fn hostname(&self) -> Option<String> {
        self.window.location().hostname().ok()
    }
}

/// `setTimeout` through `gloo-timers`; dropping the handle clears the timeout.
#[derive(Clone, Copy, Default)]
pub(crate) struct TimeoutScheduler;

struct BrowserTimer {
    _timeout: Timeout,
}

impl TimerHandle for BrowserTimer {}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        Box::new(BrowserTimer {
            _timeout: Timeout::new(delay_ms, task),
        })
    }
}

pub(crate) struct LocationNavigator {
    window: Window,
}

impl LocationNavigator {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Navigator for LocationNavigator {
    fn navigate(&self, url: &str) {
        if self.window.location().set_href(url).is_err() {
            warn!("navigation failed");
        }
    }
}
