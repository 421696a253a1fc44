//! WebSocket link to the server: binary spectrum packets in, snapshot JSON
//! both ways.

use std::cell::RefCell;

use leptos::prelude::{Set, WithValue};
use rfscope_core::wire::decode_spectrum_packet;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BinaryType, CloseEvent, MessageEvent, WebSocket};

use crate::session;
use crate::state::{AppState, LinkState};

const DEFAULT_PORT: u16 = 5555;
const RECONNECT_MS: i32 = 2000;

struct Handlers {
    _open: Closure<dyn FnMut()>,
    _message: Closure<dyn FnMut(MessageEvent)>,
    _close: Closure<dyn FnMut(CloseEvent)>,
}

thread_local! {
    static SOCKET: RefCell<Option<WebSocket>> = RefCell::new(None);
    static HANDLERS: RefCell<Option<Handlers>> = RefCell::new(None);
}

fn server_url(state: &AppState) -> Option<String> {
    if let Some(url) = state.options.with_value(|o| o.websocket_url.clone()) {
        return Some(url);
    }
    let host = match web_sys::window()?.location().hostname() {
        Ok(h) if !h.is_empty() => h,
        Ok(_) => "localhost".to_string(),
        Err(e) => {
            log::error!("No page hostname: {e:?}");
            return None;
        }
    };
    Some(format!("ws://{host}:{DEFAULT_PORT}"))
}

pub fn connect(state: AppState) {
    let Some(url) = server_url(&state) else {
        return;
    };
    let ws = match WebSocket::new(&url) {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("Failed to open {url}: {e:?}");
            state.link.set(LinkState::Closed);
            return;
        }
    };
    ws.set_binary_type(BinaryType::Arraybuffer);
    state.link.set(LinkState::Connecting);
    log::info!("Connecting to {url}");

    let open = Closure::<dyn FnMut()>::new(move || {
        log::info!("Server link open");
        state.link.set(LinkState::Open);
        session::with_view(&state, |v| v.set_connected(true));
        // Push any edits made while offline.
        flush_snapshot();
    });

    let message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
        let data = ev.data();
        if let Some(buf) = data.dyn_ref::<js_sys::ArrayBuffer>() {
            on_packet(&state, &js_sys::Uint8Array::new(buf).to_vec());
        } else if let Some(text) = data.as_string() {
            on_text(&state, &text);
        } else {
            log::warn!("Ignoring message of unknown type");
        }
    });

    let close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
        log::warn!("Server link closed (code {}), retrying in {RECONNECT_MS} ms", ev.code());
        state.link.set(LinkState::Closed);
        session::with_view(&state, |v| v.set_connected(false));
        SOCKET.with(|s| *s.borrow_mut() = None);
        schedule_reconnect(state);
    });

    ws.set_onopen(Some(open.as_ref().unchecked_ref()));
    ws.set_onmessage(Some(message.as_ref().unchecked_ref()));
    ws.set_onclose(Some(close.as_ref().unchecked_ref()));

    SOCKET.with(|s| *s.borrow_mut() = Some(ws));
    HANDLERS.with(|h| {
        *h.borrow_mut() = Some(Handlers {
            _open: open,
            _message: message,
            _close: close,
        })
    });
}

fn schedule_reconnect(state: AppState) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let retry = Closure::once_into_js(move || connect(state));
    if let Err(e) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), RECONNECT_MS)
    {
        log::error!("Failed to schedule reconnect: {e:?}");
    }
}

fn on_packet(state: &AppState, bytes: &[u8]) {
    let packet = match decode_spectrum_packet(bytes) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Bad spectrum packet: {e}");
            return;
        }
    };
    session::with_view(state, |v| {
        v.set_sps(packet.sps as f64);
        v.set_center_hz(packet.centre_hz as f64);
        v.set_span_hz(packet.sps as f64);
        v.add_data(packet.peaks, packet.start_sec as i64, 0, packet.end_sec as i64, 0);
    });
}

fn on_text(state: &AppState, text: &str) {
    match session::with_snapshot(|s| s.apply_json(text)) {
        Ok(true) => state.bump_snapshot(),
        Ok(false) => {}
        Err(e) => log::error!("{e}"),
    }
}

/// Send the snapshot state if the page changed it since the last send.
pub fn flush_snapshot() {
    let message = session::with_snapshot(|s| {
        if !s.take_local_change() {
            return None;
        }
        match s.to_message() {
            Ok(m) => Some(m),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    });
    let Some(message) = message else {
        return;
    };
    SOCKET.with(|s| match s.borrow().as_ref() {
        Some(ws) if ws.ready_state() == WebSocket::OPEN => {
            if let Err(e) = ws.send_with_str(&message) {
                log::error!("Snapshot send failed: {e:?}");
            }
        }
        // Re-arm so the edit goes out once the link is back.
        _ => session::with_snapshot(|s| s.mark_local_change()),
    });
}
