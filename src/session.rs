//! Browser-side owners of the display and snapshot state.
//!
//! Both are created once the page is up and only touched from the UI
//! thread, from event handlers and WebSocket callbacks.

use std::cell::RefCell;

use rfscope_core::view::SpectrumView;
use rfscope_core::SnapshotState;

use crate::canvas::surface::CanvasSurface;
use crate::state::AppState;

thread_local! {
    static VIEW: RefCell<Option<SpectrumView<CanvasSurface>>> = RefCell::new(None);
    static SNAPSHOT: RefCell<SnapshotState> = RefCell::new(SnapshotState::new());
}

pub fn install_view(view: SpectrumView<CanvasSurface>) {
    VIEW.with(|v| *v.borrow_mut() = Some(view));
}

pub fn has_view() -> bool {
    VIEW.with(|v| v.borrow().is_some())
}

/// Run `f` on the view, then push its state into the signals. `None` until
/// the canvas has mounted.
pub fn with_view<R>(state: &AppState, f: impl FnOnce(&mut SpectrumView<CanvasSurface>) -> R) -> Option<R> {
    VIEW.with(|v| {
        let mut slot = v.borrow_mut();
        let view = slot.as_mut()?;
        let out = f(view);
        state.sync(view);
        Some(out)
    })
}

pub fn with_snapshot<R>(f: impl FnOnce(&mut SnapshotState) -> R) -> R {
    SNAPSHOT.with(|s| f(&mut s.borrow_mut()))
}
