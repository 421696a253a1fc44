use leptos::prelude::*;
use rfscope_core::markers::{LiveMarkerFlags, MarkerRow};
use rfscope_core::view::SpectrumView;
use rfscope_core::ViewOptions;

use crate::canvas::surface::CanvasSurface;

/// Connection to the frame/snapshot server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
}

/// Reactive mirror of the view for the toolbar, marker table and snapshot
/// panel. The view itself lives in [`crate::session`]; these signals are
/// refreshed from it after every action with [`AppState::sync`].
#[derive(Clone, Copy)]
pub struct AppState {
    pub options: StoredValue<ViewOptions>,
    pub link: RwSignal<LinkState>,
    pub paused: RwSignal<bool>,
    pub max_hold: RwSignal<bool>,
    pub averaging: RwSignal<u32>,
    pub live_flags: RwSignal<LiveMarkerFlags>,
    pub markers_hidden: RwSignal<bool>,
    pub colormap: RwSignal<&'static str>,
    pub range: RwSignal<(f64, f64)>,
    pub spectrum_percent: RwSignal<f64>,
    pub center_hz: RwSignal<f64>,
    pub span_hz: RwSignal<f64>,
    pub fullscreen: RwSignal<bool>,
    pub marker_rows: RwSignal<Vec<MarkerRow>>,
    /// Bumped whenever the snapshot table needs rebuilding.
    pub snapshot_revision: RwSignal<u64>,
}

impl AppState {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            link: RwSignal::new(LinkState::Connecting),
            paused: RwSignal::new(false),
            max_hold: RwSignal::new(options.max_hold),
            averaging: RwSignal::new(options.averaging),
            live_flags: RwSignal::new(LiveMarkerFlags::NONE),
            markers_hidden: RwSignal::new(false),
            colormap: RwSignal::new(""),
            range: RwSignal::new((options.min_db, options.max_db)),
            spectrum_percent: RwSignal::new(options.spectrum_percent),
            center_hz: RwSignal::new(options.center_hz),
            span_hz: RwSignal::new(options.span_hz),
            fullscreen: RwSignal::new(false),
            marker_rows: RwSignal::new(Vec::new()),
            snapshot_revision: RwSignal::new(0),
            options: StoredValue::new(options),
        }
    }

    /// Copy view state into the signals. Only changed values notify.
    pub fn sync(&self, view: &SpectrumView<CanvasSurface>) {
        set_if_changed(self.paused, view.paused());
        set_if_changed(self.max_hold, view.max_hold());
        set_if_changed(self.averaging, view.averaging());
        set_if_changed(self.live_flags, view.live_flags());
        set_if_changed(self.markers_hidden, view.markers_hidden());
        set_if_changed(self.colormap, view.colormap_name());
        set_if_changed(self.range, view.range());
        set_if_changed(self.spectrum_percent, view.spectrum_percent());
        set_if_changed(self.center_hz, view.center_hz());
        set_if_changed(self.span_hz, view.span_hz());
        set_if_changed(self.fullscreen, view.fullscreen());
        set_if_changed(self.marker_rows, view.marker_rows());
    }

    pub fn bump_snapshot(&self) {
        self.snapshot_revision.update(|r| *r += 1);
    }
}

fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
    if signal.with_untracked(|v| *v != value) {
        signal.set(value);
    }
}
