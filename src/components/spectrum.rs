use leptos::prelude::*;
use rfscope_core::view::SpectrumView;
use web_sys::HtmlCanvasElement;

use crate::canvas::surface::CanvasSurface;
use crate::net;
use crate::session;
use crate::state::AppState;

/// Enter or leave browser fullscreen to match the view's flag.
pub fn sync_fullscreen(on: bool) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if on {
        if let Some(root) = doc.document_element() {
            if let Err(e) = root.request_fullscreen() {
                log::warn!("Fullscreen refused: {e:?}");
            }
        }
    } else if doc.fullscreen_element().is_some() {
        doc.exit_fullscreen();
    }
}

#[component]
pub fn SpectrumCanvas() -> impl IntoView {
    let state = expect_context::<AppState>();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Build the view once the canvas is in the DOM, then open the link.
    Effect::new(move || {
        let Some(canvas_el) = canvas_ref.get() else { return };
        if session::has_view() {
            return;
        }
        let canvas: &HtmlCanvasElement = canvas_el.as_ref();
        let Some(surface) = CanvasSurface::new(canvas.clone()) else {
            return;
        };
        let options = state.options.get_value();
        match SpectrumView::new(surface, options) {
            Ok(view) => {
                state.sync(&view);
                session::install_view(view);
                net::connect(state);
            }
            Err(e) => log::error!("Cannot start display: {e}"),
        }
    });

    // Nothing redraws a disconnected display, so follow window resizes here.
    let _ = window_event_listener(leptos::ev::resize, move |_| {
        session::with_view(&state, |v| {
            if !v.connected() {
                v.refresh();
            }
        });
    });

    let on_mouse_move = move |ev: web_sys::MouseEvent| {
        let (x, y) = (ev.offset_x() as f64, ev.offset_y() as f64);
        session::with_view(&state, |v| v.on_pointer_move(x, y));
    };

    let on_click = move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        let (x, y) = (ev.offset_x() as f64, ev.offset_y() as f64);
        session::with_view(&state, |v| v.on_left_click(x, y));
    };

    let on_context_menu = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        session::with_view(&state, |v| v.on_right_click());
    };

    let on_wheel = move |ev: web_sys::WheelEvent| {
        ev.prevent_default();
        let y = ev.offset_y() as f64;
        let (delta_y, buttons) = (ev.delta_y(), ev.buttons());
        session::with_view(&state, |v| v.on_wheel(y, delta_y, buttons));
    };

    view! {
        <div class="spectrum-container">
            <canvas
                node_ref=canvas_ref
                on:mousemove=on_mouse_move
                on:click=on_click
                on:contextmenu=on_context_menu
                on:wheel=on_wheel
            />
            <div class="link-status">
                {move || format!("{:?}", state.link.get())}
            </div>
        </div>
    }
}
