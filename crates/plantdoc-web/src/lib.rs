//! plantdoc Web Frontend
//!
//! Leptos-based WASM frontend: pick or drop a leaf photo, send it to
//! `/predict`, show the diagnosis.

mod api;
mod app;
mod components;
mod pages;
mod preview;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
