//! Click-time resolution of bound CTAs.
//!
//! The page builder layers transparent overlays over its buttons, so the
//! event target is often not the CTA the user sees. Resolution first walks the
//! event path, then hit-tests the click coordinates, peeling back occluding
//! elements by disabling their pointer events until a bound CTA surfaces.
//! Every peeled element is restored before resolution returns.

use super::registry::{CtaHost, CtaRegistry, NodeSet};
use crate::app_lib::BestEffort;
use crate::features::auth::Mode;
use tracing::debug;

/// Upper bound on elements peeled back per click.
pub const MAX_PEEL_ITERATIONS: usize = 5;

/// Property set on a click event once it opened the dialog, so the per-node
/// listener does not handle it a second time.
pub const HANDLED_MARKER: &str = "__landingAuthHandled";

/// A click as seen by both the capture listener and the per-node
/// interceptor. Whichever runs first claims it.
pub trait ClickEvent {
    fn is_claimed(&self) -> bool;
    /// Suppresses the native action and marks the click as handled.
    fn claim(&self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<N> {
    /// The interaction started inside the dialog and must not be touched.
    InsideDialog,
    Cta(N),
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtaResolver {
    max_iterations: usize,
}

impl Default for CtaResolver {
    fn default() -> Self {
        Self::new(MAX_PEEL_ITERATIONS)
    }
}

impl CtaResolver {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Decides whether a click opens the dialog and in which mode. `path` is
    /// the composed event path, innermost first; `point` the client
    /// coordinates when the event carries them.
    pub fn intercept<H, M>(
        &self,
        registry: &CtaRegistry<H, M>,
        target: Option<&H::Node>,
        path: &[H::Node],
        point: Option<(f64, f64)>,
    ) -> Option<Mode>
    where
        H: CtaHost,
        M: NodeSet<H::Node>,
    {
        if target.is_some_and(|target| registry.host().in_dialog(target)) {
            return None;
        }
        match self.resolve(registry, path, point) {
            Resolution::Cta(node) => Some(registry.mode_for(&node)),
            Resolution::InsideDialog | Resolution::NotFound => None,
        }
    }

    /// Document capture phase: claims the click when it resolves to a CTA.
    pub fn on_capture<H, M, E>(
        &self,
        registry: &CtaRegistry<H, M>,
        event: &E,
        target: Option<&H::Node>,
        path: &[H::Node],
        point: Option<(f64, f64)>,
    ) -> Option<Mode>
    where
        H: CtaHost,
        M: NodeSet<H::Node>,
        E: ClickEvent + ?Sized,
    {
        let mode = self.intercept(registry, target, path, point)?;
        event.claim();
        Some(mode)
    }

    /// Interceptor on a bound CTA: handles the click unless the capture phase
    /// already claimed it.
    pub fn on_node<H, M, E>(&self, registry: &CtaRegistry<H, M>, event: &E, node: &H::Node) -> Option<Mode>
    where
        H: CtaHost,
        M: NodeSet<H::Node>,
        E: ClickEvent + ?Sized,
    {
        if event.is_claimed() {
            return None;
        }
        let mode = registry.mode_for(node);
        event.claim();
        Some(mode)
    }

    pub fn resolve<H, M>(
        &self,
        registry: &CtaRegistry<H, M>,
        path: &[H::Node],
        point: Option<(f64, f64)>,
    ) -> Resolution<H::Node>
    where
        H: CtaHost,
        M: NodeSet<H::Node>,
    {
        for node in path {
            if registry.host().in_dialog(node) {
                return Resolution::InsideDialog;
            }
            if registry.is_bound(node) {
                return Resolution::Cta(node.clone());
            }
        }

        match point {
            Some((x, y)) => self.peel_back(registry, x, y),
            None => Resolution::NotFound,
        }
    }

    /// Hit-tests `(x, y)` repeatedly, making each non-CTA hit transparent to
    /// pointer events, for at most `max_iterations` elements. Stops early on a
    /// repeated element, a non-styleable element, or the dialog.
    pub fn peel_back<H, M>(&self, registry: &CtaRegistry<H, M>, x: f64, y: f64) -> Resolution<H::Node>
    where
        H: CtaHost,
        M: NodeSet<H::Node>,
    {
        let host = registry.host();
        let mut restore = PointerRestore::new(host);
        let mut visited: Vec<H::Node> = Vec::new();
        let mut current = host.element_at(x, y);

        for _ in 0..self.max_iterations {
            let Some(element) = current.take() else {
                break;
            };
            if visited.contains(&element) {
                break;
            }
            visited.push(element.clone());

            if host.in_dialog(&element) {
                return Resolution::InsideDialog;
            }
            if registry.is_bound(&element) {
                debug!(peeled = restore.len(), "cta found beneath overlay");
                return Resolution::Cta(element);
            }
            if !host.is_styleable(&element) {
                break;
            }

            let previous = host.inline_pointer_events(&element);
            if host.set_inline_pointer_events(&element, "none").is_err() {
                break;
            }
            restore.push(element, previous);
            current = host.element_at(x, y);
        }
        Resolution::NotFound
    }
}

/// Restores the inline `pointer-events` of every peeled element when dropped,
/// whichever way the peel-back exits.
struct PointerRestore<'a, H: CtaHost> {
    host: &'a H,
    touched: Vec<(H::Node, String)>,
}

impl<'a, H: CtaHost> PointerRestore<'a, H> {
    fn new(host: &'a H) -> Self {
        Self {
            host,
            touched: Vec::new(),
        }
    }

    fn push(&mut self, node: H::Node, previous: String) {
        self.touched.push((node, previous));
    }

    fn len(&self) -> usize {
        self.touched.len()
    }
}

impl<H: CtaHost> Drop for PointerRestore<'_, H> {
    fn drop(&mut self) {
        for (node, previous) in self.touched.drain(..).rev() {
            self.host
                .set_inline_pointer_events(&node, &previous)
                .best_effort("restore pointer events");
        }
    }
}
