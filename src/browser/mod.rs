//! Browser wiring: binds the platform-independent controllers to the live
//! document, the mounted dialog, and the window.
//!
//! Installation is idempotent. Everything created here lives for the rest of
//! the page and is kept in a thread-local slot.

mod bridge;
mod dom;
mod listener;
mod platform;
mod surface;

use crate::app_lib::{AppConfig, AppError};
use crate::components::{self, CLOSE_SELECTOR, FORM_SELECTOR, GOOGLE_SELECTOR, OVERLAY_SELECTOR, TOGGLE_SELECTOR};
use crate::features::auth::client::HttpAuthApi;
use crate::features::auth::submit::{SubmissionController, SubmitSettings, oauth_callback_url};
use crate::features::auth::{DialogController, DialogSnapshot, Mode};
use crate::features::cta::debounce::{Debouncer, adds_elements};
use crate::features::cta::resolver::HANDLED_MARKER;
use crate::features::cta::{ClickEvent, CtaRegistry, CtaResolver};
use dom::{DomCtaHost, WeakNodeSet};
use js_sys::{Array, Function, Reflect};
use leptos::prelude::RwSignal;
use leptos::task::spawn_local;
use listener::EventListenerGuard;
use platform::{BrowserStorage, LocationNavigator, TimeoutScheduler};
use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};
use surface::DomSurface;
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, MouseEvent, MutationObserver,
    MutationObserverInit, MutationRecord, Window,
};

type SharedDialog = Rc<RefCell<DialogController<DomSurface>>>;
type Submission =
    SubmissionController<HttpAuthApi, BrowserStorage, TimeoutScheduler, LocationNavigator>;
type Registry = CtaRegistry<DomCtaHost, WeakNodeSet>;
type MutationCallback = Closure<dyn FnMut(Array, MutationObserver)>;

thread_local! {
    static INSTALLED: RefCell<Option<Installation>> = const { RefCell::new(None) };
}

/// Everything that must stay alive for the life of the page.
struct Installation {
    _context: Rc<Context>,
    _listeners: Vec<EventListenerGuard>,
    _observer: Option<(MutationObserver, MutationCallback)>,
    _globals: Option<bridge::Globals>,
}

/// Installs CTA interception and the bridge once the document is parsed.
pub(crate) fn install(config: AppConfig) {
    if INSTALLED.with(|installed| installed.borrow().is_some()) {
        debug!("landing auth already installed");
        return;
    }
    let Some(window) = web_sys::window() else {
        warn!("no window, landing auth disabled");
        return;
    };
    let Some(document) = window.document() else {
        warn!("no document, landing auth disabled");
        return;
    };

    if document.ready_state() != "loading" {
        boot(window, document, config);
        return;
    }

    let pending: Rc<RefCell<Option<EventListenerGuard>>> = Rc::new(RefCell::new(None));
    let mut deferred = Some((window, document.clone(), config));
    let slot = Rc::clone(&pending);
    let listener = EventListenerGuard::listen(&document, "DOMContentLoaded", false, move |_| {
        if let Some((window, document, config)) = deferred.take() {
            boot(window, document, config);
        }
        slot.borrow_mut().take();
    });
    match listener {
        Ok(listener) => *pending.borrow_mut() = Some(listener),
        Err(err) => warn!(error = %err, "cannot wait for the document"),
    }
}

fn boot(window: Window, document: Document, config: AppConfig) {
    let context = Context::new(window, document, config);
    let bound = context.scan();

    let mut listeners = Vec::new();
    match context.listen_capture_clicks() {
        Ok(listener) => listeners.push(listener),
        Err(err) => warn!(error = %err, "click interception unavailable"),
    }
    let observer = context
        .observe_mutations()
        .inspect_err(|err| warn!(error = %err, "mutation observer unavailable"))
        .ok();
    let globals = bridge::expose(&context)
        .inspect_err(|err| warn!(error = %err, "bridge unavailable"))
        .ok();

    INSTALLED.with(|installed| {
        *installed.borrow_mut() = Some(Installation {
            _context: context,
            _listeners: listeners,
            _observer: observer,
            _globals: globals,
        });
    });
    info!(bound, "landing auth installed");
}

pub(crate) struct Context {
    window: Window,
    document: Document,
    config: AppConfig,
    registry: RefCell<Registry>,
    resolver: CtaResolver,
    rescan: RefCell<Debouncer>,
    dialog: OnceCell<DialogParts>,
    _interceptor: Closure<dyn FnMut(Event)>,
}

/// The dialog and its listeners, created on the first open request.
struct DialogParts {
    controller: SharedDialog,
    _listeners: Vec<EventListenerGuard>,
}

impl Context {
    fn new(window: Window, document: Document, config: AppConfig) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Context>| {
            let weak = weak.clone();
            let interceptor = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                if let Some(context) = weak.upgrade() {
                    context.handle_node_click(&event);
                }
            });
            let host = DomCtaHost::new(
                window.clone(),
                document.clone(),
                interceptor.as_ref().unchecked_ref::<Function>().clone(),
            );

            Self {
                window,
                document,
                config,
                registry: RefCell::new(CtaRegistry::new(host, WeakNodeSet::new())),
                resolver: CtaResolver::default(),
                rescan: RefCell::new(Debouncer::default()),
                dialog: OnceCell::new(),
                _interceptor: interceptor,
            }
        })
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    fn scan(&self) -> usize {
        match self.registry.try_borrow_mut() {
            Ok(mut registry) => registry.scan(),
            Err(_) => 0,
        }
    }

    /// Per-node listener: opens the dialog unless the capture listener
    /// already handled this click.
    fn handle_node_click(self: &Rc<Self>, event: &Event) {
        let Some(node) = event
            .current_target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        let mode = match self.registry.try_borrow() {
            Ok(registry) => self.resolver.on_node(&registry, event, &node),
            Err(_) => None,
        };
        if let Some(mode) = mode {
            bridge::request_open(self, mode);
        }
    }

    /// Document-level capture listener that runs before the page builder's
    /// own handlers.
    fn listen_capture_clicks(self: &Rc<Self>) -> Result<EventListenerGuard, AppError> {
        let weak = Rc::downgrade(self);
        EventListenerGuard::listen(&self.document, "click", true, move |event| {
            if let Some(context) = weak.upgrade() {
                context.handle_capture_click(&event);
            }
        })
    }

    fn handle_capture_click(self: &Rc<Self>, event: &Event) {
        let target = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok());
        let path: Vec<Element> = event
            .composed_path()
            .iter()
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        let point = event
            .dyn_ref::<MouseEvent>()
            .map(|mouse| (f64::from(mouse.client_x()), f64::from(mouse.client_y())));

        let mode = match self.registry.try_borrow() {
            Ok(registry) => self
                .resolver
                .on_capture(&registry, event, target.as_ref(), &path, point),
            Err(_) => None,
        };
        if let Some(mode) = mode {
            bridge::request_open(self, mode);
        }
    }

    /// Re-scans (debounced) whenever elements are inserted anywhere.
    fn observe_mutations(self: &Rc<Self>) -> Result<(MutationObserver, MutationCallback), AppError> {
        let weak = Rc::downgrade(self);
        let callback: MutationCallback = Closure::new(move |records: Array, _: MutationObserver| {
            let node_types: Vec<u16> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| {
                    let nodes = record.added_nodes();
                    (0..nodes.length())
                        .filter_map(|index| nodes.item(index))
                        .map(|node| node.node_type())
                        .collect::<Vec<_>>()
                })
                .collect();
            if !adds_elements(node_types) {
                return;
            }
            if let Some(context) = weak.upgrade() {
                context.schedule_rescan();
            }
        });

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|_| AppError::Dom("Failed to create mutation observer".to_string()))?;
        let root = self
            .document
            .document_element()
            .ok_or_else(|| AppError::Dom("Document has no root element".to_string()))?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(&root, &options)
            .map_err(|_| AppError::Dom("Failed to observe document".to_string()))?;
        Ok((observer, callback))
    }

    fn schedule_rescan(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let Ok(mut rescan) = self.rescan.try_borrow_mut() else {
            return;
        };
        rescan.trigger(
            &TimeoutScheduler,
            Box::new(move || {
                if let Some(context) = weak.upgrade() {
                    context.scan();
                }
            }),
        );
    }

    /// Returns the dialog, mounting it on first use.
    fn dialog(self: &Rc<Self>) -> Option<SharedDialog> {
        if let Some(parts) = self.dialog.get() {
            return Some(Rc::clone(&parts.controller));
        }
        let parts = match self.build_dialog() {
            Ok(parts) => parts,
            Err(err) => {
                warn!(error = %err, "auth dialog unavailable");
                return None;
            }
        };
        let controller = Rc::clone(&parts.controller);
        let _ = self.dialog.set(parts);
        Some(controller)
    }

    fn build_dialog(&self) -> Result<DialogParts, AppError> {
        let state = RwSignal::new(DialogSnapshot::default());
        components::mount_dialog(state);

        let controller: SharedDialog = Rc::new(RefCell::new(DialogController::new(
            DomSurface::new(self.document.clone(), state),
        )));
        controller
            .borrow()
            .surface()
            .attach_controller(Rc::downgrade(&controller));

        let submission = Rc::new(self.submission());
        let listeners = self.wire_dialog(&controller, &submission)?;
        debug!("auth dialog mounted");
        Ok(DialogParts {
            controller,
            _listeners: listeners,
        })
    }

    fn submission(&self) -> Submission {
        let oauth_redirect_uri = self
            .window
            .location()
            .origin()
            .map_err(|_| AppError::Dom("Page origin unavailable".to_string()))
            .and_then(|origin| oauth_callback_url(&origin, &self.config.oauth_callback_path))
            .inspect_err(|err| warn!(error = %err, "oauth disabled"))
            .ok();

        SubmissionController::new(
            HttpAuthApi::new(self.config.api_base_url.clone()),
            BrowserStorage::new(self.window.clone()),
            TimeoutScheduler,
            Rc::new(LocationNavigator::new(self.window.clone())),
            SubmitSettings {
                dashboard_path: self.config.dashboard_path.clone(),
                redirect_delay_ms: self.config.redirect_delay_ms,
                oauth_redirect_uri,
            },
        )
    }

    fn wire_dialog(
        &self,
        controller: &SharedDialog,
        submission: &Rc<Submission>,
    ) -> Result<Vec<EventListenerGuard>, AppError> {
        let mut listeners = Vec::new();

        let form = self.element(FORM_SELECTOR)?;
        let (dialog, submit) = (Rc::clone(controller), Rc::clone(submission));
        listeners.push(EventListenerGuard::listen(&form, "submit", false, move |event| {
            event.prevent_default();
            let (dialog, submit) = (Rc::clone(&dialog), Rc::clone(&submit));
            spawn_local(async move {
                let outcome = submit.submit(&dialog).await;
                debug!(?outcome, "auth submit finished");
            });
        })?);

        let google = self.element(GOOGLE_SELECTOR)?;
        let (dialog, submit) = (Rc::clone(controller), Rc::clone(submission));
        listeners.push(EventListenerGuard::listen(&google, "click", false, move |event| {
            event.prevent_default();
            let (dialog, submit) = (Rc::clone(&dialog), Rc::clone(&submit));
            spawn_local(async move { submit.start_oauth(&dialog).await });
        })?);

        let close = self.element(CLOSE_SELECTOR)?;
        let dialog = Rc::clone(controller);
        listeners.push(EventListenerGuard::listen(&close, "click", false, move |_| {
            with_dialog(&dialog, DialogController::close);
        })?);

        let overlay = self.element(OVERLAY_SELECTOR)?;
        let overlay_value = JsValue::from(overlay.clone());
        let dialog = Rc::clone(controller);
        listeners.push(EventListenerGuard::listen(&overlay, "click", false, move |event| {
            if event.target().map(JsValue::from).as_ref() == Some(&overlay_value) {
                with_dialog(&dialog, DialogController::close);
            }
        })?);

        let toggle = self.element(TOGGLE_SELECTOR)?;
        let dialog = Rc::clone(controller);
        listeners.push(EventListenerGuard::listen(&toggle, "click", false, move |_| {
            with_dialog(&dialog, DialogController::toggle_mode);
        })?);

        Ok(listeners)
    }

    fn element(&self, selector: &str) -> Result<Element, AppError> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Dom(format!("Dialog element {selector} missing")))
    }

    pub(crate) fn open_local(self: &Rc<Self>, mode: Mode) {
        if let Some(dialog) = self.dialog() {
            with_dialog(&dialog, |controller| controller.open(mode));
        }
    }

    /// Closing never mounts the dialog.
    pub(crate) fn close_local(&self) {
        if let Some(parts) = self.dialog.get() {
            with_dialog(&parts.controller, DialogController::close);
        }
    }
}

fn with_dialog(dialog: &SharedDialog, action: impl FnOnce(&mut DialogController<DomSurface>)) {
    match dialog.try_borrow_mut() {
        Ok(mut controller) => action(&mut controller),
        Err(_) => debug!("auth dialog busy"),
    }
}

/// The handled flag travels on the event object itself.
impl ClickEvent for Event {
    fn is_claimed(&self) -> bool {
        Reflect::get(self, &JsValue::from_str(HANDLED_MARKER)).is_ok_and(|value| value.is_truthy())
    }

    fn claim(&self) {
        self.prevent_default();
        self.stop_propagation();
        let _ = Reflect::set(self, &JsValue::from_str(HANDLED_MARKER), &JsValue::TRUE);
    }
}
