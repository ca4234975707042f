//! Event listeners that uninstall themselves when dropped.

use crate::app_lib::AppError;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget};

pub(crate) struct EventListenerGuard {
    target: EventTarget,
    event_type: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListenerGuard {
    pub(crate) fn listen(
        target: &EventTarget,
        event_type: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, AppError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback_and_bool(
                event_type,
                callback.as_ref().unchecked_ref(),
                capture,
            )
            .map_err(|_| AppError::Dom(format!("Failed to listen for {event_type}")))?;

        Ok(Self {
            target: target.clone(),
            event_type,
            capture,
            callback,
        })
    }
}

impl Drop for EventListenerGuard {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event_type,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}
