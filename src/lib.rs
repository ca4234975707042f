//! Auth dialog for statically exported landing pages.
//!
//! The page builder that renders the landing page owns its markup and its click
//! handlers. This crate finds the login and signup calls to action in that
//! markup, intercepts their activation before the builder's handlers run, and
//! routes them into a single self-contained auth dialog.
//!
//! Decision logic lives in [`features`] and is platform independent; it reaches
//! the document only through the traits defined there. The `browser` and
//! `components` modules implement those traits on top of `web-sys` and Leptos
//! and are only compiled for `wasm32`.

#[path = "lib/mod.rs"]
pub mod app_lib;
#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod components;
pub mod features;

pub use app_lib::{AppConfig, AppError};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// Module entry point invoked by the generated JS glue once the wasm is loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load();
    app_lib::logging::init(&config.log_level);
    tracing::info!(
        version = app_lib::built_info::PKG_VERSION,
        commit = app_lib::GIT_COMMIT_HASH,
        "landing auth loaded"
    );

    browser::install(config);
}
