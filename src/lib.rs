pub mod canvas;
pub mod components;
pub mod net;
pub mod session;
pub mod state;

use rfscope_core::ViewOptions;
use wasm_bindgen::prelude::*;

const OPTIONS_KEY: &str = "rfscope.options";

/// Raw JSON saved under `localStorage["rfscope.options"]`.
fn stored_options() -> Option<String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(OPTIONS_KEY).ok().flatten())
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let parsed = stored_options().map(|text| ViewOptions::from_json(&text));
    let options = match &parsed {
        Some(Ok(options)) => options.clone(),
        _ => ViewOptions::default(),
    };
    let _ = console_log::init_with_level(options.log_level());
    if let Some(Err(e)) = parsed {
        log::warn!("Ignoring saved options: {e}");
    }
    log::info!("rfscope {} starting", env!("CARGO_PKG_VERSION"));

    leptos::mount::mount_to_body(move || {
        leptos::prelude::view! { <components::app::App options=options.clone() /> }
    });
}
