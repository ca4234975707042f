//! Idempotent binding of CTA nodes.

use super::matcher::{self, BOUND_ATTR, CLICKABLE_SELECTOR, CTA_SELECTORS, MODE_ATTR};
use crate::app_lib::{AppError, BestEffort};
use crate::features::auth::Mode;
use tracing::debug;

/// Document operations the CTA layer needs.
pub trait CtaHost {
    type Node: Clone + PartialEq;

    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn text_content(&self, node: &Self::Node) -> String;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), AppError>;
    /// True for nodes inside the auth dialog or its overlay.
    fn in_dialog(&self, node: &Self::Node) -> bool;
    /// True when the node has an inline style that can be changed.
    fn is_styleable(&self, node: &Self::Node) -> bool;
    fn computed_pointer_events(&self, node: &Self::Node) -> Option<String>;
    fn inline_pointer_events(&self, node: &Self::Node) -> String;
    fn set_inline_pointer_events(&self, node: &Self::Node, value: &str) -> Result<(), AppError>;
    /// Topmost element at viewport coordinates.
    fn element_at(&self, x: f64, y: f64) -> Option<Self::Node>;
    /// Attaches the per-node click interceptor.
    fn attach_interceptor(&self, node: &Self::Node) -> Result<(), AppError>;
}

/// Membership set of bound nodes. The browser uses a `WeakSet` so removed
/// nodes can be collected.
pub trait NodeSet<N> {
    fn contains(&self, node: &N) -> bool;
    /// Returns false when the node was already present.
    fn insert(&mut self, node: N) -> bool;
}

impl<N: PartialEq> NodeSet<N> for Vec<N> {
    fn contains(&self, node: &N) -> bool {
        self.iter().any(|item| item == node)
    }

    fn insert(&mut self, node: N) -> bool {
        if self.iter().any(|item| *item == node) {
            return false;
        }
        self.push(node);
        true
    }
}

pub struct CtaRegistry<H: CtaHost, M> {
    host: H,
    bound: M,
}

impl<H, M> CtaRegistry<H, M>
where
    H: CtaHost,
    M: NodeSet<H::Node>,
{
    pub fn new(host: H, bound: M) -> Self {
        Self { host, bound }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Finds every CTA in the document and binds the new ones. Returns how
    /// many nodes were bound by this scan.
    pub fn scan(&mut self) -> usize {
        let candidates = self.candidates();
        let bound = candidates.iter().filter(|node| self.bind(node)).count();
        if bound > 0 {
            debug!(bound, "bound auth calls to action");
        }
        bound
    }

    fn candidates(&self) -> Vec<H::Node> {
        let mut candidates: Vec<H::Node> = Vec::new();
        let mut add = |node: H::Node| {
            if !candidates.contains(&node) {
                candidates.push(node);
            }
        };

        for selector in CTA_SELECTORS {
            for node in self.host.query_all(selector) {
                if !self.host.in_dialog(&node) {
                    add(node);
                }
            }
        }

        for node in self.host.query_all(CLICKABLE_SELECTOR) {
            if self.bound.contains(&node) || self.host.in_dialog(&node) {
                continue;
            }
            if matcher::matches_phrase(&self.host.text_content(&node)) {
                add(node);
            }
        }
        candidates
    }

    /// Marks and registers the node before attaching its interceptor. Returns
    /// false when the node was already bound or belongs to the dialog.
    pub fn bind(&mut self, node: &H::Node) -> bool {
        if self.host.in_dialog(node) || !self.bound.insert(node.clone()) {
            return false;
        }

        self.host
            .set_attribute(node, BOUND_ATTR, "1")
            .best_effort("mark bound cta");
        self.ensure_pointer_defaults(node);
        self.host
            .attach_interceptor(node)
            .best_effort("attach cta interceptor");
        true
    }

    /// Bound nodes are recognized by membership or by the marker attribute.
    pub fn is_bound(&self, node: &H::Node) -> bool {
        self.bound.contains(node) || self.host.attribute(node, BOUND_ATTR).as_deref() == Some("1")
    }

    pub fn mode_for(&self, node: &H::Node) -> Mode {
        matcher::derive_mode(
            self.host.attribute(node, MODE_ATTR).as_deref(),
            &self.host.text_content(node),
        )
    }

    fn ensure_pointer_defaults(&self, node: &H::Node) {
        if !self.host.is_styleable(node) {
            return;
        }
        if self.host.computed_pointer_events(node).as_deref() == Some("none") {
            self.host
                .set_inline_pointer_events(node, "auto")
                .best_effort("enable cta pointer events");
        }
    }
}
