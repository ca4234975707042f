//! In-memory fakes of every platform trait, shared by the integration suites.

#![allow(dead_code)]

use landing_auth::AppError;
use landing_auth::app_lib::RemoteReply;
use landing_auth::features::auth::client::AuthApi;
use landing_auth::features::auth::session::SessionStore;
use landing_auth::features::auth::submit::{SubmissionController, SubmitSettings};
use landing_auth::features::auth::types::{LoginRequest, OAuthInitiateRequest, RegisterRequest};
use landing_auth::features::auth::{
    DialogController, DialogSnapshot, DialogSurface, FieldKey, FormValues,
};
use landing_auth::features::cta::CtaHost;
use landing_auth::features::schedule::{Navigator, Scheduler, TimerHandle};
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Dialog surface
// ---------------------------------------------------------------------------

pub const DIALOG: &str = "dialog";

/// Raw form input as typed by the user.
#[derive(Clone, Debug, Default)]
pub struct RawForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub terms: bool,
}

/// Dialog surface whose "elements" are string ids. Only fields visible in
/// the last rendered snapshot exist.
#[derive(Default)]
pub struct FakeSurface {
    pub form: RefCell<RawForm>,
    pub snapshot: RefCell<DialogSnapshot>,
    pub renders: Cell<usize>,
    pub focused: RefCell<Option<String>>,
    pub focus_log: RefCell<Vec<String>>,
    pub page_modal: Cell<bool>,
    pub resets: Cell<usize>,
    pub installed_listeners: Cell<usize>,
    pub live_listeners: Rc<Cell<usize>>,
    pub unfocusable: RefCell<Vec<String>>,
}

pub struct FakeKeyListener(Rc<Cell<usize>>);

impl Drop for FakeKeyListener {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl FakeSurface {
    pub fn fill(&self, form: RawForm) {
        *self.form.borrow_mut() = form;
    }

    /// Simulates the user focusing something on the host page.
    pub fn focus_host(&self, id: &str) {
        *self.focused.borrow_mut() = Some(id.to_string());
    }

    /// Makes focusing `id` fail, like a disabled or detached element.
    pub fn refuse_focus(&self, id: &str) {
        self.unfocusable.borrow_mut().push(id.to_string());
    }

    pub fn focused(&self) -> Option<String> {
        self.focused.borrow().clone()
    }

    pub fn snapshot(&self) -> DialogSnapshot {
        self.snapshot.borrow().clone()
    }
}

impl DialogSurface for FakeSurface {
    type Focus = String;
    type KeyListener = FakeKeyListener;

    fn render(&self, snapshot: &DialogSnapshot) {
        *self.snapshot.borrow_mut() = snapshot.clone();
        self.renders.set(self.renders.get() + 1);
    }

    fn read_values(&self) -> FormValues {
        let form = self.form.borrow();
        FormValues::from_raw(&form.name, &form.email, &form.password, &form.confirm, form.terms)
    }

    fn reset_values(&self) {
        *self.form.borrow_mut() = RawForm::default();
        self.resets.set(self.resets.get() + 1);
    }

    fn set_page_modal(&self, active: bool) {
        self.page_modal.set(active);
    }

    fn field_element(&self, field: FieldKey) -> Option<String> {
        self.snapshot
            .borrow()
            .shows_field(field)
            .then(|| field.as_str().to_string())
    }

    fn dialog_element(&self) -> Option<String> {
        Some(DIALOG.to_string())
    }

    fn focusable_elements(&self) -> Vec<String> {
        let snapshot = self.snapshot.borrow();
        let mut elements = vec!["close".to_string(), "google".to_string()];
        elements.extend(
            FieldKey::ALL
                .iter()
                .filter(|field| snapshot.shows_field(**field))
                .map(|field| field.as_str().to_string()),
        );
        if !snapshot.submitting {
            elements.push("submit".to_string());
        }
        elements.push("toggle".to_string());
        elements
    }

    fn active_element(&self) -> Option<String> {
        self.focused()
    }

    fn focus(&self, target: &String) -> Result<(), AppError> {
        if self.unfocusable.borrow().contains(target) {
            return Err(AppError::Dom(format!("{target} cannot take focus")));
        }
        *self.focused.borrow_mut() = Some(target.clone());
        self.focus_log.borrow_mut().push(target.clone());
        Ok(())
    }

    fn install_key_listener(&self) -> FakeKeyListener {
        self.installed_listeners.set(self.installed_listeners.get() + 1);
        self.live_listeners.set(self.live_listeners.get() + 1);
        FakeKeyListener(Rc::clone(&self.live_listeners))
    }
}

pub type SharedDialog = Rc<RefCell<DialogController<FakeSurface>>>;

pub fn dialog() -> SharedDialog {
    Rc::new(RefCell::new(DialogController::new(FakeSurface::default())))
}

pub fn login_form(email: &str, password: &str) -> RawForm {
    RawForm {
        email: email.to_string(),
        password: password.to_string(),
        ..RawForm::default()
    }
}

pub fn signup_form(name: &str, email: &str, password: &str, confirm: &str, terms: bool) -> RawForm {
    RawForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm: confirm.to_string(),
        terms,
    }
}

// ---------------------------------------------------------------------------
// Remote API
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ApiState {
    replies: BTreeMap<&'static str, VecDeque<Result<RemoteReply, AppError>>>,
    calls: Vec<(&'static str, Value)>,
    before_reply: Option<Rc<dyn Fn()>>,
}

/// Scripted auth endpoints that record every request body.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Rc<RefCell<ApiState>>,
}

impl FakeApi {
    pub fn reply(&self, endpoint: &'static str, status: u16, body: Value) -> &Self {
        self.push(endpoint, Ok(RemoteReply::new(status, body)))
    }

    pub fn fail(&self, endpoint: &'static str, err: AppError) -> &Self {
        self.push(endpoint, Err(err))
    }

    fn push(&self, endpoint: &'static str, reply: Result<RemoteReply, AppError>) -> &Self {
        self.state
            .borrow_mut()
            .replies
            .entry(endpoint)
            .or_default()
            .push_back(reply);
        self
    }

    /// Runs `hook` while a request is in flight, before its reply is returned.
    pub fn before_reply(&self, hook: impl Fn() + 'static) {
        self.state.borrow_mut().before_reply = Some(Rc::new(hook));
    }

    pub fn calls(&self) -> Vec<(&'static str, Value)> {
        self.state.borrow().calls.clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(|(endpoint, _)| *endpoint).collect()
    }

    fn answer<B: Serialize>(&self, endpoint: &'static str, body: &B) -> Result<RemoteReply, AppError> {
        let body = serde_json::to_value(body).map_err(|err| AppError::Serialization(err.to_string()))?;
        let hook = self.state.borrow().before_reply.clone();
        if let Some(hook) = hook {
            hook();
        }
        let mut state = self.state.borrow_mut();
        state.calls.push((endpoint, body));
        state
            .replies
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(AppError::Network(format!("no scripted reply for {endpoint}"))))
    }
}

impl AuthApi for FakeApi {
    async fn login(&self, request: &LoginRequest<'_>) -> Result<RemoteReply, AppError> {
        self.answer("login", request)
    }

    async fn register(&self, request: &RegisterRequest<'_>) -> Result<RemoteReply, AppError> {
        self.answer("register", request)
    }

    async fn initiate_oauth(&self, request: &OAuthInitiateRequest) -> Result<RemoteReply, AppError> {
        self.answer("oauth", request)
    }
}

// ---------------------------------------------------------------------------
// Storage, timers, navigation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    items: BTreeMap<String, String>,
    cookies: Vec<String>,
    hostname: Option<String>,
    storage_blocked: bool,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Rc<RefCell<StoreState>>,
}

impl FakeStore {
    pub fn on_host(hostname: &str) -> Self {
        let store = Self::default();
        store.state.borrow_mut().hostname = Some(hostname.to_string());
        store
    }

    pub fn block_storage(&self) {
        self.state.borrow_mut().storage_blocked = true;
    }

    pub fn item(&self, key: &str) -> Option<String> {
        self.state.borrow().items.get(key).cloned()
    }

    pub fn cookies(&self) -> Vec<String> {
        self.state.borrow().cookies.clone()
    }
}

impl SessionStore for FakeStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        if state.storage_blocked {
            return Err(AppError::Dom("storage blocked".to_string()));
        }
        state.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn write_cookie(&self, cookie: &str) -> Result<(), AppError> {
        self.state.borrow_mut().cookies.push(cookie.to_string());
        Ok(())
    }

    fn hostname(&self) -> Option<String> {
        self.state.borrow().hostname.clone()
    }
}

type Task = (u32, Rc<Cell<bool>>, Box<dyn FnOnce()>);

/// Timers that only run when the test says so.
#[derive(Clone, Default)]
pub struct FakeScheduler {
    tasks: Rc<RefCell<Vec<Task>>>,
}

pub struct FakeTimer(Rc<Cell<bool>>);

impl TimerHandle for FakeTimer {}

impl Drop for FakeTimer {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

impl Scheduler for FakeScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        let cancelled = Rc::new(Cell::new(false));
        self.tasks
            .borrow_mut()
            .push((delay_ms, Rc::clone(&cancelled), task));
        Box::new(FakeTimer(cancelled))
    }
}

impl FakeScheduler {
    /// Delays of timers that are still armed.
    pub fn pending(&self) -> Vec<u32> {
        self.tasks
            .borrow()
            .iter()
            .filter(|(_, cancelled, _)| !cancelled.get())
            .map(|(delay, _, _)| *delay)
            .collect()
    }

    /// Fires every armed timer; cancelled ones are discarded.
    pub fn run_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut fired = 0;
        for (_, cancelled, task) in tasks {
            if !cancelled.get() {
                task();
                fired += 1;
            }
        }
        fired
    }
}

/// Records navigations and, optionally, whether the dialog was open at the time.
#[derive(Default)]
pub struct FakeNavigator {
    pub visits: RefCell<Vec<String>>,
    pub dialog_open_at_visit: RefCell<Vec<bool>>,
    dialog_open: RefCell<Option<Box<dyn Fn() -> bool>>>,
}

impl FakeNavigator {
    pub fn watch_dialog(&self, dialog: &SharedDialog) {
        let dialog = Rc::downgrade(dialog);
        *self.dialog_open.borrow_mut() = Some(Box::new(move || {
            dialog
                .upgrade()
                .and_then(|dialog| dialog.try_borrow().ok().map(|d| d.is_open()))
                .unwrap_or(false)
        }));
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }
}

impl Navigator for FakeNavigator {
    fn navigate(&self, url: &str) {
        if let Some(dialog_open) = self.dialog_open.borrow().as_ref() {
            self.dialog_open_at_visit.borrow_mut().push(dialog_open());
        }
        self.visits.borrow_mut().push(url.to_string());
    }
}

pub type Submission = SubmissionController<FakeApi, FakeStore, FakeScheduler, FakeNavigator>;

/// A submission controller plus handles on all of its fakes.
pub struct Harness {
    pub api: FakeApi,
    pub store: FakeStore,
    pub scheduler: FakeScheduler,
    pub navigator: Rc<FakeNavigator>,
    pub submission: Submission,
}

pub fn settings() -> SubmitSettings {
    SubmitSettings {
        dashboard_path: "/dashboard".to_string(),
        redirect_delay_ms: 400,
        oauth_redirect_uri: Some("https://www.example.de/api/auth/oauth/google/callback".to_string()),
    }
}

impl Harness {
    pub fn new(hostname: &str) -> Self {
        Self::with_settings(hostname, settings())
    }

    pub fn with_settings(hostname: &str, settings: SubmitSettings) -> Self {
        let api = FakeApi::default();
        let store = FakeStore::on_host(hostname);
        let scheduler = FakeScheduler::default();
        let navigator = Rc::new(FakeNavigator::default());
        let submission = SubmissionController::new(
            api.clone(),
            store.clone(),
            scheduler.clone(),
            Rc::clone(&navigator),
            settings,
        );
        Self {
            api,
            store,
            scheduler,
            navigator,
            submission,
        }
    }
}

// ---------------------------------------------------------------------------
// Document for CTA discovery
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct FakeNode {
    pub tag: &'static str,
    pub text: String,
    pub attrs: BTreeMap<String, String>,
    pub in_dialog: bool,
    pub styleable: bool,
    pub computed_pointer: String,
    pub inline_pointer: String,
}

impl FakeNode {
    pub fn new(tag: &'static str, text: &str) -> Self {
        Self {
            tag,
            text: text.to_string(),
            styleable: true,
            computed_pointer: "auto".to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn inside_dialog(mut self) -> Self {
        self.in_dialog = true;
        self
    }

    pub fn computed_pointer(mut self, value: &str) -> Self {
        self.computed_pointer = value.to_string();
        self
    }

    pub fn inline_pointer(mut self, value: &str) -> Self {
        self.inline_pointer = value.to_string();
        self
    }

    pub fn unstyleable(mut self) -> Self {
        self.styleable = false;
        self
    }

    fn effective_pointer(&self) -> &str {
        if self.inline_pointer.is_empty() {
            &self.computed_pointer
        } else {
            &self.inline_pointer
        }
    }
}

/// A flat document. Nodes are addressed by index; `stack` lists the nodes
/// under the click point, topmost first.
#[derive(Default)]
pub struct FakeDocument {
    pub nodes: RefCell<Vec<FakeNode>>,
    pub stack: RefCell<Vec<usize>>,
    pub interceptors: RefCell<BTreeMap<usize, usize>>,
    pub hit_tests: Cell<usize>,
}

impl FakeDocument {
    pub fn add(&self, node: FakeNode) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        nodes.len() - 1
    }

    pub fn stack_at_point(&self, stack: &[usize]) {
        *self.stack.borrow_mut() = stack.to_vec();
    }

    pub fn node(&self, index: usize) -> FakeNode {
        self.nodes.borrow()[index].clone()
    }

    pub fn interceptors_on(&self, index: usize) -> usize {
        self.interceptors.borrow().get(&index).copied().unwrap_or(0)
    }

    fn matches(node: &FakeNode, selector: &str) -> bool {
        if selector == "a, button" {
            return matches!(node.tag, "a" | "button");
        }
        let Some((tag, rest)) = selector.split_once('[') else {
            return node.tag == selector;
        };
        if !tag.is_empty() && node.tag != tag {
            return false;
        }
        let rest = rest.trim_end_matches(']');
        if let Some((name, value)) = rest.split_once("*=") {
            let value = value.trim_end_matches(" i").trim_matches('"').to_lowercase();
            return node
                .attrs
                .get(name)
                .is_some_and(|actual| actual.to_lowercase().contains(&value));
        }
        match rest.split_once('=') {
            Some((name, value)) => node.attrs.get(name).map(String::as_str) == Some(value.trim_matches('"')),
            None => node.attrs.contains_key(rest),
        }
    }
}

impl CtaHost for FakeDocument {
    type Node = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, node)| Self::matches(node, selector))
            .map(|(index, _)| index)
            .collect()
    }

    fn text_content(&self, node: &usize) -> String {
        self.nodes.borrow()[*node].text.clone()
    }

    fn attribute(&self, node: &usize, name: &str) -> Option<String> {
        self.nodes.borrow()[*node].attrs.get(name).cloned()
    }

    fn set_attribute(&self, node: &usize, name: &str, value: &str) -> Result<(), AppError> {
        self.nodes.borrow_mut()[*node]
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn in_dialog(&self, node: &usize) -> bool {
        self.nodes.borrow()[*node].in_dialog
    }

    fn is_styleable(&self, node: &usize) -> bool {
        self.nodes.borrow()[*node].styleable
    }

    fn computed_pointer_events(&self, node: &usize) -> Option<String> {
        Some(self.nodes.borrow()[*node].effective_pointer().to_string())
    }

    fn inline_pointer_events(&self, node: &usize) -> String {
        self.nodes.borrow()[*node].inline_pointer.clone()
    }

    fn set_inline_pointer_events(&self, node: &usize, value: &str) -> Result<(), AppError> {
        self.nodes.borrow_mut()[*node].inline_pointer = value.to_string();
        Ok(())
    }

    fn element_at(&self, _x: f64, _y: f64) -> Option<usize> {
        self.hit_tests.set(self.hit_tests.get() + 1);
        let nodes = self.nodes.borrow();
        self.stack
            .borrow()
            .iter()
            .copied()
            .find(|index| nodes[*index].effective_pointer() != "none")
    }

    fn attach_interceptor(&self, node: &usize) -> Result<(), AppError> {
        *self.interceptors.borrow_mut().entry(*node).or_default() += 1;
        Ok(())
    }
}
