use leptos::prelude::*;
use rfscope_core::SnapshotState;
use serde_json::Value;
use wasm_bindgen::JsCast;

use crate::net;
use crate::session;
use crate::state::AppState;

const FILE_FORMATS: [&str; 3] = ["bin", "wav", "cfile"];

/// Apply a local edit, send it and refresh the panel.
fn edit(state: &AppState, f: impl FnOnce(&mut SnapshotState)) {
    session::with_snapshot(f);
    net::flush_snapshot();
    state.bump_snapshot();
}

fn entry_name(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn input_value(ev: &web_sys::Event) -> Option<String> {
    let target = ev.target()?;
    let input: web_sys::HtmlInputElement = target.unchecked_into();
    Some(input.value())
}

#[component]
pub fn SnapshotPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    // Re-read the snapshot whenever it is marked dirty.
    let snap = Memo::new(move |_| {
        state.snapshot_revision.track();
        session::with_snapshot(|s| s.clone())
    });

    let on_base_name = move |ev: web_sys::Event| {
        if let Some(name) = input_value(&ev) {
            edit(&state, |s| s.set_base_filename(name));
        }
    };

    let on_trigger_type = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let select: web_sys::HtmlSelectElement = target.unchecked_into();
        edit(&state, |s| s.set_trigger_type(select.value()));
    };

    let on_pre_trigger = move |ev: web_sys::Event| {
        match input_value(&ev).map(|v| v.parse::<i64>()) {
            Some(Ok(ms)) => edit(&state, |s| s.set_pre_trigger_ms(ms)),
            _ => log::warn!("Pre-trigger must be whole milliseconds"),
        }
    };

    let on_post_trigger = move |ev: web_sys::Event| {
        match input_value(&ev).map(|v| v.parse::<i64>()) {
            Some(Ok(ms)) => edit(&state, |s| s.set_post_trigger_ms(ms)),
            _ => log::warn!("Post-trigger must be whole milliseconds"),
        }
    };

    let on_file_format = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let select: web_sys::HtmlSelectElement = target.unchecked_into();
        edit(&state, |s| s.set_file_format(select.value()));
    };

    view! {
        <div class="sidebar-panel">
            <div class="setting-group-title">"Snapshot"</div>

            <div class="setting-row">
                <span class="setting-label">"Base name"</span>
                <input
                    class="setting-input"
                    type="text"
                    prop:value=move || snap.with(|s| s.base_filename().to_string())
                    on:change=on_base_name
                />
            </div>

            <div class="setting-row">
                <span class="setting-label">"Trigger"</span>
                <select class="setting-select" on:change=on_trigger_type>
                    <option value="0" selected=move || snap.with(|s| s.trigger_type() == "0")>"Manual"</option>
                    <option value="1" selected=move || snap.with(|s| s.trigger_type() == "1")>"Level"</option>
                </select>
                <span class="setting-value">{move || snap.with(|s| format!("state {}", s.trigger_state()))}</span>
            </div>

            <div class="setting-row">
                <span class="setting-label">"Pre (ms)"</span>
                <input
                    class="setting-input"
                    type="number"
                    prop:value=move || snap.with(|s| s.pre_trigger_ms().to_string())
                    on:change=on_pre_trigger
                />
            </div>

            <div class="setting-row">
                <span class="setting-label">"Post (ms)"</span>
                <input
                    class="setting-input"
                    type="number"
                    prop:value=move || snap.with(|s| s.post_trigger_ms().to_string())
                    on:change=on_post_trigger
                />
            </div>

            <div class="setting-row">
                <span class="setting-label">"Format"</span>
                <select class="setting-select" on:change=on_file_format>
                    {FILE_FORMATS
                        .iter()
                        .map(|&f| view! {
                            <option value=f selected=move || snap.with(|s| s.file_format() == f)>{f}</option>
                        })
                        .collect_view()}
                </select>
            </div>

            <div class="setting-row">
                <button
                    class=move || if snap.with(|s| s.snap_state() == "start") { "toolbar-btn active" } else { "toolbar-btn" }
                    on:click=move |_| edit(&state, |s| s.arm_trigger())
                >"Arm"</button>
                <span class="setting-value">{move || snap.with(|s| {
                    format!("{:.1} / {:.1} MB", s.current_size_mbytes(), s.expected_size_mbytes())
                })}</span>
            </div>

            {move || snap.with(|s| (!s.triggers().is_empty()).then(|| {
                let triggers: Vec<String> = s.triggers().iter().map(Value::to_string).collect();
                view! {
                    <div class="setting-group-title">"Triggers"</div>
                    <ul class="snapshot-list">
                        {triggers.into_iter().map(|t| view! { <li>{t}</li> }).collect_view()}
                    </ul>
                }
            }))}

            <div class="setting-group-title">"Recordings"</div>
            <ul class="snapshot-list">
                {move || snap.with(|s| {
                    s.directory_list()
                        .iter()
                        .map(entry_name)
                        .collect::<Vec<_>>()
                })
                .into_iter()
                .map(|name| {
                    let target = name.clone();
                    view! {
                        <li>
                            <span>{name}</span>
                            <button
                                class="marker-btn"
                                on:click=move |_| {
                                    let target = target.clone();
                                    log::info!("Deleting recording {target}");
                                    edit(&state, |s| s.request_delete(target));
                                }
                                title="Delete"
                            >"\u{2715}"</button>
                        </li>
                    }
                })
                .collect_view()}
            </ul>
        </div>
    }
}
