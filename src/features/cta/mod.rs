//! Discovery and interception of login and signup calls to action in markup
//! the page builder owns.
//!
//! Matching finds candidates, the registry binds each node exactly once, and
//! the resolver decides at click time whether an interaction belongs to a bound
//! CTA, peeling back overlays that sit on top of it. Re-scans after document
//! mutations are coalesced by the debouncer.

pub mod debounce;
pub mod matcher;
pub mod registry;
pub mod resolver;

pub use registry::{CtaHost, CtaRegistry, NodeSet};
pub use resolver::{ClickEvent, CtaResolver, MAX_PEEL_ITERATIONS};
