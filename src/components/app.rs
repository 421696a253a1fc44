use leptos::prelude::*;
use rfscope_core::input::KeyCommand;
use rfscope_core::ViewOptions;

use crate::components::marker_table::MarkerTable;
use crate::components::snapshot_panel::SnapshotPanel;
use crate::components::spectrum::{sync_fullscreen, SpectrumCanvas};
use crate::components::toolbar::Toolbar;
use crate::session;
use crate::state::AppState;

#[component]
pub fn App(options: ViewOptions) -> impl IntoView {
    let state = AppState::new(options);
    provide_context(state);

    // Keys act on the display unless the user is typing in a form field.
    let _ = window_event_listener(leptos::ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let typing = ev
            .target()
            .and_then(|t| {
                use wasm_bindgen::JsCast;
                t.dyn_into::<web_sys::HtmlElement>().ok()
            })
            .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "SELECT" | "TEXTAREA"))
            .unwrap_or(false);
        if typing {
            return;
        }
        let key = ev.key();
        let command = session::with_view(&state, |v| v.on_key(&key)).flatten();
        if command == Some(KeyCommand::ToggleFullscreen) {
            sync_fullscreen(state.fullscreen.get_untracked());
        }
        if command.is_some() {
            ev.prevent_default();
        }
    });

    view! {
        <div class="app">
            <Toolbar />
            <div class="main">
                <SpectrumCanvas />
                <div class="side-panel">
                    <MarkerTable />
                    <SnapshotPanel />
                </div>
            </div>
        </div>
    }
}
