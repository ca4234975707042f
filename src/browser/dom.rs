//! `CtaHost` and `NodeSet` on top of the live document.

use crate::app_lib::AppError;
use crate::components::WITHIN_DIALOG_SELECTOR;
use crate::features::cta::{CtaHost, NodeSet};
use js_sys::{Function, Object, WeakSet};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

const POINTER_EVENTS: &str = "pointer-events";

/// Bound CTAs, held weakly so nodes the page builder removes can be collected.
pub(crate) struct WeakNodeSet {
    nodes: WeakSet,
}

impl WeakNodeSet {
    pub(crate) fn new() -> Self {
        Self {
            nodes: WeakSet::new(),
        }
    }
}

impl NodeSet<Element> for WeakNodeSet {
    fn contains(&self, node: &Element) -> bool {
        self.nodes.has(node.unchecked_ref::<Object>())
    }

    fn insert(&mut self, node: Element) -> bool {
        let object = node.unchecked_ref::<Object>();
        if self.nodes.has(object) {
            return false;
        }
        self.nodes.add(object);
        true
    }
}

pub(crate) struct DomCtaHost {
    window: Window,
    document: Document,
    /// Shared click listener attached to every bound node.
    interceptor: Function,
}

impl DomCtaHost {
    pub(crate) fn new(window: Window, document: Document, interceptor: Function) -> Self {
        Self {
            window,
            document,
            interceptor,
        }
    }
}

impl CtaHost for DomCtaHost {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(_) => {
                debug!(selector, "selector not supported");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), AppError> {
        node.set_attribute(name, value)
            .map_err(|_| AppError::Dom(format!("Failed to set {name}")))
    }

    fn in_dialog(&self, node: &Element) -> bool {
        node.closest(WITHIN_DIALOG_SELECTOR)
            .ok()
            .flatten()
            .is_some()
    }

    fn is_styleable(&self, node: &Element) -> bool {
        node.is_instance_of::<HtmlElement>()
    }

    fn computed_pointer_events(&self, node: &Element) -> Option<String> {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(POINTER_EVENTS).ok())
    }

    fn inline_pointer_events(&self, node: &Element) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|element| element.style().get_property_value(POINTER_EVENTS).ok())
            .unwrap_or_default()
    }

    fn set_inline_pointer_events(&self, node: &Element, value: &str) -> Result<(), AppError> {
        let element = node
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| AppError::Dom("Element has no inline style".to_string()))?;
        element
            .style()
            .set_property(POINTER_EVENTS, value)
            .map_err(|_| AppError::Dom("Failed to set pointer-events".to_string()))
    }

    fn element_at(&self, x: f64, y: f64) -> Option<Element> {
        #[allow(clippy::cast_possible_truncation)]
        self.document.element_from_point(x as f32, y as f32)
    }

    fn attach_interceptor(&self, node: &Element) -> Result<(), AppError> {
        node.add_event_listener_with_callback("click", &self.interceptor)
            .map_err(|_| AppError::Dom("Failed to attach click interceptor".to_string()))
    }
}
