use leptos::prelude::*;
use rfscope_core::markers::LiveMarkerFlags;
use rfscope_core::scale::format_frequency;
use rfscope_core::view::SpectrumView;
use wasm_bindgen::JsCast;

use crate::canvas::surface::CanvasSurface;
use crate::components::spectrum::sync_fullscreen;
use crate::session;
use crate::state::AppState;

fn toggle_class(active: bool) -> &'static str {
    if active { "toolbar-btn active" } else { "toolbar-btn" }
}

/// Button handler that runs `f` on the view.
fn act(
    state: AppState,
    f: impl Fn(&mut SpectrumView<CanvasSurface>) + 'static,
) -> impl Fn(web_sys::MouseEvent) + 'static {
    move |_| {
        session::with_view(&state, |v| f(v));
    }
}

fn live_label(flags: LiveMarkerFlags) -> &'static str {
    if flags.is_empty() {
        "Live"
    } else if flags.contains(LiveMarkerFlags::TRIANGLE) {
        "Live \u{25BC}"
    } else {
        "Live +"
    }
}

#[component]
pub fn Toolbar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_center_change = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let input: web_sys::HtmlInputElement = target.unchecked_into();
        match input.value().parse::<f64>() {
            Ok(mhz) => {
                session::with_view(&state, |v| v.set_center_freq_mhz(mhz));
            }
            Err(_) => log::warn!("Not a frequency: {:?}", input.value()),
        }
    };

    let on_fullscreen = move |_: web_sys::MouseEvent| {
        if let Some(on) = session::with_view(&state, |v| v.toggle_fullscreen()) {
            sync_fullscreen(on);
        }
    };

    view! {
        <div class="toolbar">
            <span class="toolbar-brand"><b>"rf"</b>"scope"</span>

            <button
                class=move || toggle_class(state.paused.get())
                on:click=act(state, |v| v.toggle_paused())
                title="Pause (P)"
            >{move || if state.paused.get() { "Resume" } else { "Pause" }}</button>

            <button
                class=move || toggle_class(state.max_hold.get())
                on:click=act(state, |v| v.toggle_max_hold())
                title="Max hold (M)"
            >"Max hold"</button>

            <span class="toolbar-group" title="Averaging (+/-)">
                <button class="toolbar-btn" on:click=act(state, |v| v.decrement_averaging())>"\u{2212}"</button>
                <span class="toolbar-value">{move || format!("avg {}", state.averaging.get())}</span>
                <button class="toolbar-btn" on:click=act(state, |v| v.increment_averaging())>"+"</button>
            </span>

            <span class="toolbar-group" title="dB range (arrow keys)">
                <button class="toolbar-btn" on:click=act(state, |v| v.range_up())>"\u{25B2}"</button>
                <button class="toolbar-btn" on:click=act(state, |v| v.range_down())>"\u{25BC}"</button>
                <button class="toolbar-btn" on:click=act(state, |v| v.range_decrease())>"\u{2194}\u{2212}"</button>
                <button class="toolbar-btn" on:click=act(state, |v| v.range_increase())>"\u{2194}+"</button>
                <span class="toolbar-value">{move || {
                    let (min, max) = state.range.get();
                    format!("{min} .. {max} dB")
                }}</span>
            </span>

            <span class="toolbar-group" title="Spectrum height">
                <button class="toolbar-btn" on:click=act(state, |v| v.decrement_spectrum_percent())>"\u{2212}"</button>
                <span class="toolbar-value">{move || format!("{}%", state.spectrum_percent.get())}</span>
                <button class="toolbar-btn" on:click=act(state, |v| v.increment_spectrum_percent())>"+"</button>
            </span>

            <button
                class="toolbar-btn"
                on:click=act(state, |v| v.toggle_color())
                title="Colormap (C)"
            >{move || state.colormap.get()}</button>

            <button
                class=move || toggle_class(!state.live_flags.get().is_empty())
                on:click=act(state, |v| {
                    v.toggle_live_marker();
                })
                title="Live marker (L), right click on the display cycles modes"
            >{move || live_label(state.live_flags.get())}</button>

            <button
                class=move || toggle_class(state.markers_hidden.get())
                on:click=act(state, |v| {
                    v.toggle_hide_markers();
                })
                title="Hide markers"
            >"Hide"</button>

            <button class="toolbar-btn" on:click=act(state, |v| v.clear_markers()) title="Clear markers">
                "Clear"
            </button>

            <div style="flex: 1;"></div>

            <label class="toolbar-value" title="Centre frequency (MHz)">
                <input
                    class="toolbar-input"
                    type="number"
                    step="0.001"
                    prop:value=move || format!("{:.3}", state.center_hz.get() / 1e6)
                    on:change=on_center_change
                />
                " MHz"
            </label>
            <span class="toolbar-value">
                {move || format!("span {}", format_frequency(state.span_hz.get(), 3))}
            </span>

            <button
                class=move || toggle_class(state.fullscreen.get())
                on:click=on_fullscreen
                title="Fullscreen (F)"
            >"\u{26F6}"</button>
        </div>
    }
}
