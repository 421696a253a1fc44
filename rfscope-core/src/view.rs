//! The spectrum + waterfall display controller.
//!
//! `SpectrumView` owns the history ring, the waterfall image, the marker set
//! and all view state, and renders onto a [`Surface`]. It is driven entirely
//! by its callers: frames via [`SpectrumView::add_data`], input via the
//! `on_*` handlers. Every call runs to completion and draws synchronously.
//!
//! Layout, top to bottom: the spectrum pane (`spectrum_percent` of the
//! height) holding the line plot and axes, then the waterfall filling the
//! rest. Markers are drawn over both, last.

use std::sync::Arc;

use crate::axes::{AxisKey, AxisOverlay};
use crate::colormap::{self, Colormap};
use crate::config::{ConfigError, ViewOptions};
use crate::history::History;
use crate::input::{KeyCommand, MIDDLE_BUTTON};
use crate::markers::{LiveMarkerFlags, MarkerRow, MarkerSet, PlaceOutcome, Readout};
use crate::scale::{format_frequency, round_to, squeeze};
use crate::surface::{Surface, TextAlign, TextBaseline, TextStyle};
use crate::trace::TraceProcessor;
use crate::types::{Frame, Pane, Rect, Timestamp};
use crate::waterfall::Waterfall;

const MARKER_FONT: &str = "12px sans-serif";
const FRAME_COLOR: &str = "black";
const LIVE_DASH: [f64; 2] = [10.0, 10.0];
const RANGE_STEP_DB: f64 = 5.0;
const MIN_RANGE_DB: f64 = 10.0;

pub struct SpectrumView<S: Surface> {
    surface: S,
    options: ViewOptions,

    history: History,
    waterfall: Waterfall,
    trace: TraceProcessor,
    /// Frame shown in the spectrum pane: the newest one, or while paused an
    /// inspected waterfall row.
    peaks: Option<Arc<[f32]>>,
    fft_size: usize,

    colormaps: Vec<Colormap>,
    colormap_index: usize,
    gradient: Vec<(f64, [u8; 3])>,
    axes: Option<AxisOverlay>,

    markers: MarkerSet,
    live: Option<Readout>,
    live_flags: LiveMarkerFlags,
    hide_markers: bool,

    center_hz: f64,
    span_hz: f64,
    sps: f64,
    min_db: f64,
    max_db: f64,
    spectrum_percent: f64,
    /// Rounded pixel height of the spectrum pane, used for drawing.
    spectrum_height: f64,

    paused: bool,
    fullscreen: bool,
    connected: bool,

    first_time: Option<f64>,
    current_time: f64,
}

impl<S: Surface> SpectrumView<S> {
    pub fn new(mut surface: S, options: ViewOptions) -> Result<Self, ConfigError> {
        options.validate()?;

        let (cw, ch) = surface.client_size();
        surface.set_size(cw, ch);
        surface.fill_rect(
            Rect::new(0.0, 0.0, cw as f64, ch as f64),
            &options.palette.background,
        );

        let mut view = Self {
            history: History::new(options.wf_rows as usize),
            waterfall: Waterfall::new(options.wf_size, options.wf_rows),
            trace: TraceProcessor::new(options.averaging, options.max_hold),
            peaks: None,
            fft_size: options.wf_size as usize,
            colormaps: colormap::builtin(),
            colormap_index: 0,
            gradient: Vec::new(),
            axes: None,
            markers: MarkerSet::new(options.max_markers),
            live: None,
            live_flags: LiveMarkerFlags::NONE,
            hide_markers: false,
            center_hz: options.center_hz,
            span_hz: options.span_hz,
            sps: 0.0,
            min_db: options.min_db,
            max_db: options.max_db,
            spectrum_percent: options.spectrum_percent,
            spectrum_height: 0.0,
            paused: false,
            fullscreen: false,
            connected: false,
            first_time: None,
            current_time: 0.0,
            surface,
            options,
        };
        view.update_spectrum_ratio();
        view.resize();
        Ok(view)
    }

    // ── Frame ingestion ─────────────────────────────────────────────────────

    /// Take one frame from the frame source and redraw.
    ///
    /// While paused the frame is discarded and the frozen display is redrawn
    /// so markers keep working.
    pub fn add_data(
        &mut self,
        bins: impl Into<Arc<[f32]>>,
        start_sec: i64,
        start_nsec: u32,
        end_sec: i64,
        end_nsec: u32,
    ) {
        if self.paused {
            self.refresh();
            return;
        }

        let start = Timestamp::new(start_sec, start_nsec);
        let frame = Frame::new(bins, start, Timestamp::new(end_sec, end_nsec));
        let bins = frame.bins.clone();
        self.peaks = Some(bins.clone());
        self.history.push(frame);

        if bins.len() != self.fft_size {
            self.set_resolution(bins.len());
        }
        // Max-hold sees raw bins, before averaging.
        self.trace.update(&bins);

        self.draw_spectrum();
        self.add_waterfall_row(&bins);
        self.draw_markers();
        self.resize();

        self.current_time = start.as_secs_f64();
        if self.first_time.is_none() {
            self.first_time = Some(self.current_time);
        }
    }

    fn set_resolution(&mut self, bins: usize) {
        log::debug!("resolution change: {} -> {} bins", self.fft_size, bins);
        self.fft_size = bins;
        self.waterfall.resize_width(bins as u32);
    }

    /// Redraw everything from the frozen state without taking new data.
    pub fn refresh(&mut self) {
        self.draw_spectrum();
        self.waterfall.draw(&mut self.surface, self.spectrum_height);
        self.draw_markers();
        self.resize();
    }

    fn refresh_if_idle(&mut self) {
        if !self.connected {
            self.refresh();
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────────

    fn draw_spectrum(&mut self) {
        let (width, height) = self.surface.size();
        let (w, h) = (width as f64, height as f64);

        self.surface
            .fill_rect(Rect::new(0.0, 0.0, w, h), &self.options.palette.background);
        self.surface.stroke_polyline(
            &[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h), (0.0, 0.0)],
            FRAME_COLOR,
            &[],
        );

        if self.spectrum_height < 1.0 {
            return;
        }

        if let Some(bins) = self.peaks.clone() {
            let sh = self.spectrum_height;
            let x_scale = if bins.is_empty() { 0.0 } else { w / bins.len() as f64 };
            let (min_db, max_db) = (self.min_db, self.max_db);

            if self.trace.max_hold() {
                if let Some(max) = self.trace.max_trace() {
                    let path = trace_path(max, sh, x_scale, min_db, max_db);
                    self.surface
                        .stroke_polyline(&path, &self.options.palette.max_hold, &[]);
                }
            }

            let drawn = if self.paused { &bins[..] } else { self.trace.display(&bins) };
            let path = trace_path(drawn, sh, x_scale, min_db, max_db);
            self.surface
                .stroke_polyline(&path, &self.options.palette.magnitudes, &[]);

            if self.options.spectrum_gradient {
                self.surface.fill_gradient(&path, 0.0, sh, &self.gradient);
            }
        }

        if let Some(axes) = &self.axes {
            axes.draw(&mut self.surface, &self.options.palette.text);
        }
    }

    fn add_waterfall_row(&mut self, bins: &[f32]) {
        let map = &self.colormaps[self.colormap_index];
        self.waterfall.push_row(bins, map, self.min_db, self.max_db);
        self.waterfall.draw(&mut self.surface, self.spectrum_height);
    }

    fn draw_markers(&mut self) {
        if self.hide_markers {
            return;
        }
        let (width, height) = self.surface.size();
        let (w, h) = (width as f64, height as f64);
        let half_client = self.surface.client_size().0 as f64 / 2.0;
        let live_color = self.options.palette.live_marker.clone();
        let marker_color = self.options.palette.markers.clone();
        let flags = self.live_flags;

        // Live marker guides
        if let (false, Some(live)) = (flags.is_empty(), self.live.clone()) {
            if flags.contains(LiveMarkerFlags::FREQUENCY_LINE) {
                self.surface
                    .stroke_line(live.x, 0.0, live.x, h, &live_color, &LIVE_DASH);
            }
            if flags.contains(LiveMarkerFlags::LEVEL_OR_TIME_LINE) {
                let y = match live.pane {
                    Pane::Spectrum => self.db_to_y(live.power_db),
                    Pane::Spectrogram => live.y,
                };
                self.surface.stroke_line(0.0, y, w, y, &live_color, &LIVE_DASH);
            }
            if flags.contains(LiveMarkerFlags::TRIANGLE) && live.pane == Pane::Spectrum {
                let y = self.db_to_y(live.power_db);
                let x = live.x;
                self.surface.stroke_polyline(
                    &[(x - 5.0, y - 5.0), (x + 5.0, y - 5.0), (x, y), (x - 5.0, y - 5.0)],
                    &live_color,
                    &[],
                );
            }
        }

        // Indexed marker lines, plus a level line to the newest marker while
        // the live marker is on.
        let last_index = self.markers.len().checked_sub(1);
        let mut labels: Vec<(String, f64, f64, TextAlign)> = Vec::new();
        for (i, m) in self.markers.iter().enumerate() {
            if !m.visible {
                continue;
            }
            let x = m.x as f64;
            self.surface.stroke_line(x, 0.0, x, h, &marker_color, &[]);

            if m.pane == Pane::Spectrogram {
                let row = self.marker_row_to_y(m.y, m.input_count);
                self.surface.stroke_line(0.0, row, w, row, &marker_color, &[]);
                labels.push((i.to_string(), w, row, TextAlign::Right));
            }

            if !flags.is_empty() && last_index == Some(i) {
                let y = self.db_to_y(m.power_db);
                self.surface.stroke_line(0.0, y, w, y, &marker_color, &[]);
                labels.push((i.to_string(), w, y, TextAlign::Right));
            }
        }
        for (text, x, y, align) in labels {
            self.draw_text(&text, x, y, &marker_color, align);
        }

        // Live readout, and its difference to the newest indexed marker.
        if let (false, Some(live)) = (flags.is_empty(), self.live.clone()) {
            if let Some(value) = self.values_at(live.x, live.y, live.width) {
                let align = if live.x > half_client { TextAlign::Right } else { TextAlign::Left };
                let text = format!(
                    " {} {:.1}dB  {:.3}s ",
                    format_frequency(value.freq_hz, 3),
                    value.power_db,
                    value.time
                );
                self.draw_text(&text, live.x, 30.0, &live_color, align);

                if let Some(last) = self.markers.last() {
                    let diff = format!(
                        " {} {:.1}dB  {:.3}s ",
                        format_frequency(value.freq_hz - last.freq_mhz * 1e6, 3),
                        value.power_db - last.power_db,
                        value.time - last.time
                    );
                    self.draw_text(&diff, live.x, 42.0, &live_color, align);
                }
            }
        }

        // Index labels along the top
        let top: Vec<(String, f64)> = self
            .markers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.visible)
            .map(|(i, m)| (i.to_string(), m.x as f64))
            .collect();
        for (text, x) in top {
            let align = if x > half_client { TextAlign::Right } else { TextAlign::Left };
            self.draw_text(&text, x, 15.0, &marker_color, align);
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: &str, align: TextAlign) {
        let style = TextStyle {
            font: MARKER_FONT,
            color,
            align,
            baseline: TextBaseline::Alphabetic,
        };
        self.surface.fill_text(text, x, y, &style);
    }

    fn update_spectrum_ratio(&mut self) {
        let (_, height) = self.surface.size();
        self.spectrum_height = (height as f64 * self.spectrum_percent / 100.0).round();
        self.gradient = self.colormaps[self.colormap_index].gradient_stops();
    }

    /// Match the backing store to the surface's layout size and rebuild the
    /// axis overlay if its geometry changed.
    pub fn resize(&mut self) {
        let (cw, ch) = self.surface.client_size();
        if self.surface.size() != (cw, ch) {
            self.surface.set_size(cw, ch);
            self.update_spectrum_ratio();
        }

        let key = AxisKey {
            width: cw,
            height: self.spectrum_height as u32,
            min_db: self.min_db,
            max_db: self.max_db,
            center_hz: self.center_hz,
            span_hz: self.span_hz,
        };
        if self.axes.as_ref().map(|a| a.key) != Some(key) {
            self.axes = Some(AxisOverlay::build(key));
        }
    }

    // ── Coordinate mapping ──────────────────────────────────────────────────

    /// Unrounded spectrum pane height, used for hit testing.
    pub fn spectrum_pane_height(&self) -> f64 {
        self.surface.size().1 as f64 * self.spectrum_percent / 100.0
    }

    pub fn spectrogram_pane_height(&self) -> f64 {
        self.surface.size().1 as f64 * (1.0 - self.spectrum_percent / 100.0)
    }

    pub fn x_to_freq(&self, x: f64, width: f64) -> f64 {
        (self.center_hz - self.span_hz / 2.0) + x * self.span_hz / width
    }

    pub fn freq_to_x(&self, hz: f64, width: f64) -> f64 {
        (hz - (self.center_hz - self.span_hz / 2.0)) * width / self.span_hz
    }

    /// Pixel row for a dB value in the spectrum pane; never above the top.
    pub fn db_to_y(&self, db: f64) -> f64 {
        let db_per_px = (self.max_db - self.min_db) / self.spectrum_pane_height();
        let y = (self.max_db - db) / db_per_px;
        if y < 0.0 || !y.is_finite() {
            0.0
        } else {
            y.trunc()
        }
    }

    /// Current pixel row of a spectrogram marker placed at `row` when the
    /// history count was `placed_at`; it moves down one row per new frame.
    pub fn marker_row_to_y(&self, row: i32, placed_at: u64) -> f64 {
        row as f64 + self.history.input_count().saturating_sub(placed_at) as f64
    }

    /// Logical waterfall row under canvas `y` (which must be below the
    /// spectrum pane).
    fn spectrogram_row(&self, y: f64) -> u64 {
        let rows_per_px = self.history.capacity() as f64 / self.spectrogram_pane_height();
        let offset = (y - self.spectrum_pane_height()).max(0.0);
        if rows_per_px < 1.0 {
            (offset * rows_per_px) as u64
        } else {
            offset as u64
        }
    }

    /// Frequency, level and time under a canvas position, or `None` when
    /// there is nothing there.
    pub fn values_at(&self, x: f64, y: f64, width: f64) -> Option<Readout> {
        let peaks = self.peaks.as_ref()?;
        if width <= 0.0 || x < 0.0 {
            return None;
        }
        let freq_hz = self.x_to_freq(x, width);
        let first = self.first_time.unwrap_or(0.0);

        if y <= self.spectrum_pane_height() {
            let index = (x * peaks.len() as f64 / width) as usize;
            let power = match self.trace.max_trace() {
                Some(max) => max.get(index)?,
                None => peaks.get(index)?,
            };
            return Some(Readout {
                freq_hz,
                power_db: *power as f64,
                time: self.current_time - first,
                x,
                y,
                width,
                pane: Pane::Spectrum,
                row: None,
            });
        }

        let frame = self.history.frame_at_row(self.spectrogram_row(y))?;
        let index = (x * frame.len() as f64 / width) as usize;
        let power = *frame.bins.get(index)?;
        Some(Readout {
            freq_hz,
            power_db: power as f64,
            time: frame.start.as_secs_f64() - first,
            x,
            y,
            width,
            pane: Pane::Spectrogram,
            row: Some(frame.bins.clone()),
        })
    }

    // ── Markers ─────────────────────────────────────────────────────────────

    /// Add an indexed marker. Placing a marker un-hides hidden markers.
    #[allow(clippy::too_many_arguments)]
    pub fn place_marker(
        &mut self,
        freq_mhz: f64,
        power_db: f64,
        time: f64,
        x: f64,
        y: f64,
        input_count: u64,
        pane: Pane,
    ) -> PlaceOutcome {
        self.hide_markers = false;
        let outcome = self
            .markers
            .place(freq_mhz, power_db, time, x, y, input_count, pane);
        match outcome {
            PlaceOutcome::Added(i) => log::debug!("marker {i} at {freq_mhz:.3} MHz, {power_db:.1} dB"),
            other => log::debug!("marker at x={x} not placed: {other:?}"),
        }
        outcome
    }

    pub fn delete_marker(&mut self, index: usize) {
        if self.markers.delete(index).is_some() {
            self.refresh_if_idle();
        }
    }

    pub fn toggle_marker_visibility(&mut self, index: usize) {
        if self.markers.toggle_visibility(index).is_some() {
            self.refresh_if_idle();
        }
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.live = None;
        self.refresh_if_idle();
    }

    pub fn toggle_hide_markers(&mut self) -> bool {
        self.hide_markers = !self.hide_markers;
        self.refresh_if_idle();
        self.hide_markers
    }

    pub fn toggle_live_marker(&mut self) -> LiveMarkerFlags {
        self.live_flags = self.live_flags.toggled();
        if self.live_flags.is_empty() {
            self.live = None;
            self.refresh_if_idle();
        }
        self.live_flags
    }

    pub fn marker_rows(&self) -> Vec<MarkerRow> {
        self.markers.rows()
    }

    // ── Input ───────────────────────────────────────────────────────────────

    /// Track the pointer with the live marker. While paused or disconnected,
    /// hovering a waterfall row also shows that row as the spectrum.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if self.live_flags.is_empty() {
            return;
        }
        let width = self.surface.client_size().0 as f64;
        let Some(value) = self.values_at(x, y, width) else {
            return;
        };
        let frozen = !self.connected || self.paused;
        if frozen {
            if let Some(row) = &value.row {
                self.peaks = Some(row.clone());
            }
        }
        self.live = Some(value);
        if frozen {
            self.refresh();
        }
    }

    pub fn on_left_click(&mut self, x: f64, y: f64) -> Option<PlaceOutcome> {
        let width = self.surface.client_size().0 as f64;
        let value = self.values_at(x, y, width)?;
        if self.markers.is_full() {
            log::info!("marker limit of {} reached", self.markers.capacity());
            return Some(PlaceOutcome::Full);
        }
        let outcome = self.place_marker(
            round_to(value.freq_hz / 1e6, 3),
            round_to(value.power_db, 1),
            value.time,
            value.x,
            value.y,
            self.history.input_count(),
            value.pane,
        );
        self.refresh_if_idle();
        Some(outcome)
    }

    pub fn on_right_click(&mut self) -> LiveMarkerFlags {
        self.live_flags = self.live_flags.next_on_right_click();
        self.live_flags
    }

    /// Wheel over the spectrum pane moves the dB window; with the middle
    /// button held it widens or narrows it instead.
    pub fn on_wheel(&mut self, y: f64, delta_y: f64, buttons: u16) {
        if y > self.spectrum_pane_height() {
            return;
        }
        match buttons {
            0 if delta_y > 0.0 => self.range_up(),
            0 => self.range_down(),
            MIDDLE_BUTTON if delta_y > 0.0 => self.range_increase(),
            MIDDLE_BUTTON => self.range_decrease(),
            _ => {}
        }
    }

    pub fn on_key(&mut self, key: &str) -> Option<KeyCommand> {
        let command = KeyCommand::from_key(key)?;
        match command {
            KeyCommand::ToggleFullscreen => {
                self.toggle_fullscreen();
            }
            KeyCommand::NextColormap => self.toggle_color(),
            KeyCommand::IncreaseAveraging => self.increment_averaging(),
            KeyCommand::DecreaseAveraging => self.decrement_averaging(),
            KeyCommand::ToggleMaxHold => self.toggle_max_hold(),
            KeyCommand::ToggleLiveMarker => {
                self.toggle_live_marker();
            }
            KeyCommand::TogglePause => self.toggle_paused(),
            KeyCommand::RangeUp => self.range_up(),
            KeyCommand::RangeDown => self.range_down(),
            KeyCommand::RangeDecrease => self.range_decrease(),
            KeyCommand::RangeIncrease => self.range_increase(),
        }
        Some(command)
    }

    // ── View controls ───────────────────────────────────────────────────────

    pub fn set_range(&mut self, min_db: f64, max_db: f64) {
        self.min_db = min_db;
        self.max_db = max_db;
        self.resize();
    }

    pub fn range_up(&mut self) {
        self.set_range(self.min_db - RANGE_STEP_DB, self.max_db - RANGE_STEP_DB);
    }

    pub fn range_down(&mut self) {
        self.set_range(self.min_db + RANGE_STEP_DB, self.max_db + RANGE_STEP_DB);
    }

    pub fn range_increase(&mut self) {
        self.set_range(self.min_db - RANGE_STEP_DB, self.max_db + RANGE_STEP_DB);
    }

    pub fn range_decrease(&mut self) {
        if self.max_db - self.min_db > MIN_RANGE_DB {
            self.set_range(self.min_db + RANGE_STEP_DB, self.max_db - RANGE_STEP_DB);
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min_db, self.max_db)
    }

    /// Centre frequency, truncated to whole Hz.
    pub fn set_center_freq_mhz(&mut self, mhz: f64) {
        self.center_hz = (mhz * 1e6).trunc();
    }

    pub fn center_freq_mhz(&self) -> f64 {
        self.center_hz / 1e6
    }

    pub fn set_center_hz(&mut self, hz: f64) {
        self.center_hz = hz;
    }

    pub fn center_hz(&self) -> f64 {
        self.center_hz
    }

    pub fn set_span_hz(&mut self, hz: f64) {
        self.span_hz = hz;
    }

    pub fn span_hz(&self) -> f64 {
        self.span_hz
    }

    pub fn set_sps(&mut self, sps: f64) {
        self.sps = sps;
    }

    pub fn sps(&self) -> f64 {
        self.sps
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn set_averaging(&mut self, n: u32) {
        self.trace.set_averaging(n);
    }

    pub fn increment_averaging(&mut self) {
        self.set_averaging(self.trace.averaging() + 1);
    }

    pub fn decrement_averaging(&mut self) {
        if self.trace.averaging() > 0 {
            self.set_averaging(self.trace.averaging() - 1);
        }
    }

    pub fn averaging(&self) -> u32 {
        self.trace.averaging()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_max_hold(&mut self, on: bool) {
        self.trace.set_max_hold(on);
    }

    pub fn toggle_max_hold(&mut self) {
        self.set_max_hold(!self.trace.max_hold());
    }

    pub fn max_hold(&self) -> bool {
        self.trace.max_hold()
    }

    /// Accepts 0..=100; anything else is ignored.
    pub fn set_spectrum_percent(&mut self, percent: f64) {
        if (0.0..=100.0).contains(&percent) {
            self.spectrum_percent = percent;
            self.update_spectrum_ratio();
        }
    }

    pub fn increment_spectrum_percent(&mut self) {
        let next = self.spectrum_percent + self.options.spectrum_percent_step;
        if next <= 100.0 {
            self.set_spectrum_percent(next);
        }
    }

    pub fn decrement_spectrum_percent(&mut self) {
        let next = self.spectrum_percent - self.options.spectrum_percent_step;
        if next >= 0.0 {
            self.set_spectrum_percent(next);
        }
    }

    pub fn spectrum_percent(&self) -> f64 {
        self.spectrum_percent
    }

    pub fn spectrum_height(&self) -> f64 {
        self.spectrum_height
    }

    pub fn toggle_color(&mut self) {
        self.colormap_index = (self.colormap_index + 1) % self.colormaps.len();
        self.update_spectrum_ratio();
    }

    pub fn colormap_name(&self) -> &'static str {
        self.colormaps[self.colormap_index].name
    }

    /// Flip the fullscreen flag. Entering or leaving fullscreen is up to the
    /// host page.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Whether frames are currently arriving. While disconnected, marker and
    /// view changes redraw immediately.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    // ── State access ────────────────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn waterfall(&self) -> &Waterfall {
        &self.waterfall
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn live_marker(&self) -> Option<&Readout> {
        self.live.as_ref()
    }

    pub fn live_flags(&self) -> LiveMarkerFlags {
        self.live_flags
    }

    pub fn markers_hidden(&self) -> bool {
        self.hide_markers
    }

    pub fn max_trace(&self) -> Option<&[f32]> {
        self.trace.max_trace()
    }

    pub fn current_frame(&self) -> Option<&[f32]> {
        self.peaks.as_deref()
    }

    pub fn first_time(&self) -> Option<f64> {
        self.first_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn oldest_time(&self) -> f64 {
        self.history.oldest_time()
    }
}

/// Connected path for one trace. Underflow is pushed just below the pane so
/// it is not visible; overflow is pinned to the top row.
fn trace_path(bins: &[f32], sh: f64, x_scale: f64, min_db: f64, max_db: f64) -> Vec<(f64, f64)> {
    let n = bins.len();
    let mut points = Vec::with_capacity(n + 4);
    points.push((-1.0, sh + 1.0));
    for (i, &b) in bins.iter().enumerate() {
        let mut y = sh - squeeze(b, min_db, max_db, 0.0, sh);
        if y > sh - 1.0 {
            y = sh + 1.0;
        }
        if y < 0.0 {
            y = 0.0;
        }
        if i == 0 {
            points.push((-1.0, y));
        }
        points.push((i as f64 * x_scale, y));
        if i == n - 1 {
            points.push(((n as f64 + 1.0) * x_scale, y));
        }
    }
    points.push(((n as f64 + 1.0) * x_scale, sh + 1.0));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::color_index;
    use crate::surface::recording::{Op, RecordingSurface};

    const W: u32 = 1000;
    const H: u32 = 400;

    fn options(rows: u32) -> ViewOptions {
        ViewOptions {
            center_hz: 100e6,
            span_hz: 2e6,
            wf_rows: rows,
            ..ViewOptions::default()
        }
    }

    fn view(rows: u32) -> SpectrumView<RecordingSurface> {
        SpectrumView::new(RecordingSurface::new(W, H), options(rows)).unwrap()
    }

    fn feed(v: &mut SpectrumView<RecordingSurface>, count: usize, bins: usize) {
        for k in 0..count {
            let frame: Vec<f32> = (0..bins).map(|b| -80.0 + (b + k) as f32).collect();
            v.add_data(frame, 1000 + k as i64, 0, 1000 + k as i64, 5000);
        }
    }

    #[test]
    fn test_spectrum_height_from_percent() {
        let v = view(8);
        assert_eq!(v.spectrum_height(), 100.0);
        assert_eq!(v.spectrum_pane_height(), 100.0);
    }

    #[test]
    fn test_add_data_fills_history_and_counts() {
        let mut v = view(8);
        feed(&mut v, 20, 16);
        assert_eq!(v.history().input_count(), 20);
        assert_eq!(v.history().capacity(), 8);
        assert_eq!(v.fft_size(), 16);
        assert_eq!(v.first_time(), Some(1000.0));
        assert_eq!(v.current_time(), 1019.0);
        assert_eq!(v.oldest_time(), 1012.0);
    }

    #[test]
    fn test_waterfall_top_row_matches_latest_frame() {
        let mut v = view(8);
        feed(&mut v, 3, 4);
        let latest = v.current_frame().unwrap().to_vec();
        let map = &colormap::builtin()[0];
        let expected: Vec<u8> = latest
            .iter()
            .flat_map(|&b| {
                let [r, g, b] = map.apply(color_index(b, -80.0, 20.0));
                [r, g, b, 255]
            })
            .collect();
        assert_eq!(v.waterfall().row(0), expected.as_slice());
    }

    #[test]
    fn test_resolution_change_reallocates_waterfall() {
        let mut v = view(8);
        feed(&mut v, 2, 16);
        assert_eq!(v.waterfall().width, 16);
        v.add_data(vec![-50.0f32; 32], 5, 0, 5, 0);
        assert_eq!(v.fft_size(), 32);
        assert_eq!(v.waterfall().width, 32);
        assert_eq!(v.waterfall().byte_len(), 32 * 8 * 4);
        // Row 1 belongs to the fresh image, not the old 16-bin rows.
        assert!(v.waterfall().row(1).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_paused_drops_frames_but_redraws() {
        let mut v = view(8);
        feed(&mut v, 2, 8);
        v.set_paused(true);
        v.surface_mut().ops.clear();
        v.add_data(vec![0.0f32; 8], 99, 0, 99, 0);
        assert_eq!(v.history().input_count(), 2);
        assert_ne!(v.current_frame().unwrap()[0], 0.0);
        assert!(
            v.surface().ops.iter().any(|op| matches!(op, Op::Rgba { .. })),
            "frozen waterfall must be redrawn"
        );
    }

    #[test]
    fn test_markers_draw_after_waterfall() {
        let mut v = view(8);
        feed(&mut v, 1, 8);
        v.place_marker(100.0, -40.0, 0.0, 300.0, 50.0, 1, Pane::Spectrum);
        v.surface_mut().ops.clear();
        feed(&mut v, 1, 8);
        let ops = &v.surface().ops;
        let blit = ops.iter().position(|op| matches!(op, Op::Rgba { .. })).unwrap();
        let marker_line = ops
            .iter()
            .position(|op| matches!(op, Op::Stroke(p, c, _) if c == "red" && p[0] == (300.0, 0.0)))
            .unwrap();
        assert!(marker_line > blit, "markers must be drawn over the waterfall");
    }

    #[test]
    fn test_freq_pixel_round_trip() {
        let v = view(8);
        let width = W as f64;
        for x in [0.0, 1.0, 137.0, 499.0, 500.0, 999.0] {
            let hz = v.x_to_freq(x, width);
            let back = v.freq_to_x(hz, width);
            assert!((back - x).abs() <= 1.0, "x={x} -> {hz} Hz -> {back}");
        }
        assert_eq!(v.x_to_freq(0.0, width), 99e6);
        assert_eq!(v.x_to_freq(500.0, width), 100e6);
    }

    #[test]
    fn test_db_to_y() {
        let v = view(8);
        // 100 dB over 100 px
        assert_eq!(v.db_to_y(20.0), 0.0);
        assert_eq!(v.db_to_y(-30.0), 50.0);
        assert_eq!(v.db_to_y(60.0), 0.0, "clamped at the top");
    }

    #[test]
    fn test_values_in_spectrum_pane() {
        let mut v = view(8);
        assert!(v.values_at(10.0, 10.0, W as f64).is_none(), "no frame yet");
        feed(&mut v, 1, 100);
        let r = v.values_at(505.0, 20.0, W as f64).unwrap();
        assert_eq!(r.pane, Pane::Spectrum);
        // bin 50 of the first frame
        assert_eq!(r.power_db, -30.0);
        assert_eq!(r.time, 0.0);
        assert!(r.row.is_none());
    }

    #[test]
    fn test_values_in_spectrum_pane_prefer_max_hold() {
        let mut v = view(8);
        v.set_max_hold(true);
        v.add_data(vec![-10.0f32; 4], 0, 0, 0, 0);
        v.add_data(vec![-60.0f32; 4], 1, 0, 1, 0);
        let r = v.values_at(0.0, 10.0, W as f64).unwrap();
        assert_eq!(r.power_db, -10.0);
    }

    #[test]
    fn test_values_in_spectrogram_use_ring_slot() {
        let mut v = view(8);
        feed(&mut v, 10, 4);
        // 300 px of waterfall for 8 rows: y=250 -> row floor(150 * 8 / 300) = 4
        // slot (10 - 4) % 8 = 6 holds frame k=6
        let r = v.values_at(0.0, 250.0, W as f64).unwrap();
        assert_eq!(r.pane, Pane::Spectrogram);
        assert_eq!(r.time, 6.0);
        assert_eq!(r.power_db, -80.0 + 6.0);
        assert_eq!(r.row.as_deref().map(|b| b.len()), Some(4));
    }

    #[test]
    fn test_values_in_unwritten_slot_is_none() {
        let mut v = view(64);
        feed(&mut v, 2, 4);
        // Rows near the bottom map to slots never written.
        assert!(v.values_at(10.0, 399.0, W as f64).is_none());
    }

    #[test]
    fn test_spectrogram_marker_scrolls_with_input() {
        let mut v = view(8);
        feed(&mut v, 3, 4);
        v.place_marker(100.0, -40.0, 0.0, 10.0, 200.0, v.history().input_count(), Pane::Spectrogram);
        let m = v.markers().get(0).unwrap().clone();
        assert_eq!(v.marker_row_to_y(m.y, m.input_count), 200.0);
        feed(&mut v, 5, 4);
        assert_eq!(v.marker_row_to_y(m.y, m.input_count), 205.0);
    }

    #[test]
    fn test_left_click_places_rounded_marker() {
        let mut v = view(8);
        assert!(v.on_left_click(10.0, 10.0).is_none(), "no data, no marker");
        feed(&mut v, 1, 1000);
        assert_eq!(v.on_left_click(250.0, 10.0), Some(PlaceOutcome::Added(0)));
        let m = v.markers().get(0).unwrap();
        assert_eq!(m.freq_mhz, 99.5);
        assert_eq!(m.x, 250);
        assert_eq!(m.pane, Pane::Spectrum);
        assert_eq!(m.input_count, 1);
        assert_eq!(v.on_left_click(250.0, 60.0), Some(PlaceOutcome::DuplicatePosition));
        assert_eq!(v.markers().len(), 1);
    }

    #[test]
    fn test_left_click_rejected_when_full() {
        let mut v = view(8);
        feed(&mut v, 1, 1000);
        for i in 0..16 {
            v.on_left_click(i as f64 * 20.0, 10.0);
        }
        assert_eq!(v.markers().len(), 16);
        assert_eq!(v.on_left_click(900.0, 10.0), Some(PlaceOutcome::Full));
        assert_eq!(v.markers().len(), 16);
    }

    #[test]
    fn test_placing_marker_unhides() {
        let mut v = view(8);
        assert!(v.toggle_hide_markers());
        v.place_marker(1.0, 0.0, 0.0, 1.0, 1.0, 0, Pane::Spectrum);
        assert!(!v.markers_hidden());
    }

    #[test]
    fn test_live_marker_only_tracks_when_enabled() {
        let mut v = view(8);
        feed(&mut v, 1, 100);
        v.on_pointer_move(100.0, 10.0);
        assert!(v.live_marker().is_none());
        v.on_right_click();
        v.on_pointer_move(100.0, 10.0);
        assert_eq!(v.live_marker().map(|l| l.x), Some(100.0));
    }

    #[test]
    fn test_paused_hover_shows_waterfall_row() {
        let mut v = view(8);
        v.set_connected(true);
        feed(&mut v, 10, 4);
        v.toggle_live_marker();
        v.set_paused(true);
        v.on_pointer_move(0.0, 250.0);
        assert_eq!(v.current_frame().unwrap()[0], -80.0 + 6.0);
    }

    #[test]
    fn test_live_readout_text() {
        let mut v = view(8);
        feed(&mut v, 1, 1000);
        v.toggle_live_marker();
        v.on_pointer_move(500.0, 10.0);
        v.surface_mut().ops.clear();
        v.refresh();
        let texts = v.surface().texts();
        assert!(
            texts.iter().any(|t| t.contains("100.000MHz") && t.contains("dB")),
            "missing live readout in {texts:?}"
        );
    }

    #[test]
    fn test_wheel_only_in_spectrum_pane() {
        let mut v = view(8);
        v.on_wheel(50.0, 1.0, 0);
        assert_eq!(v.range(), (-85.0, 15.0));
        v.on_wheel(50.0, -1.0, 0);
        assert_eq!(v.range(), (-80.0, 20.0));
        v.on_wheel(50.0, 1.0, MIDDLE_BUTTON);
        assert_eq!(v.range(), (-85.0, 25.0));
        v.on_wheel(300.0, 1.0, 0);
        assert_eq!(v.range(), (-85.0, 25.0), "wheel over the waterfall is ignored");
    }

    #[test]
    fn test_range_decrease_keeps_ten_db() {
        let mut v = view(8);
        v.set_range(-10.0, 0.0);
        v.range_decrease();
        assert_eq!(v.range(), (-10.0, 0.0));
        v.set_range(-20.0, 0.0);
        v.range_decrease();
        assert_eq!(v.range(), (-15.0, -5.0));
    }

    #[test]
    fn test_keys() {
        let mut v = view(8);
        assert_eq!(v.on_key("p"), Some(KeyCommand::TogglePause));
        assert!(v.paused());
        assert_eq!(v.on_key("+"), Some(KeyCommand::IncreaseAveraging));
        assert_eq!(v.averaging(), 1);
        v.on_key("-");
        v.on_key("-");
        assert_eq!(v.averaging(), 0);
        v.on_key("c");
        assert_eq!(v.colormap_name(), "viridis");
        v.on_key("m");
        assert!(v.max_hold());
        v.on_key("f");
        assert!(v.fullscreen());
        assert_eq!(v.on_key("x"), None);
    }

    #[test]
    fn test_resize_follows_client_size() {
        let mut v = view(8);
        v.surface_mut().client = (800, 200);
        v.refresh();
        assert_eq!(v.surface().size(), (800, 200));
        assert_eq!(v.spectrum_height(), 50.0);
    }

    #[test]
    fn test_spectrum_percent_bounds() {
        let mut v = view(8);
        v.set_spectrum_percent(140.0);
        assert_eq!(v.spectrum_percent(), 25.0);
        v.increment_spectrum_percent();
        assert_eq!(v.spectrum_percent(), 30.0);
        v.set_spectrum_percent(100.0);
        v.increment_spectrum_percent();
        assert_eq!(v.spectrum_percent(), 100.0);
    }

    #[test]
    fn test_center_freq_truncation() {
        let mut v = view(8);
        v.set_center_freq_mhz(433.9200005);
        assert_eq!(v.center_hz(), 433_920_000.0);
        assert_eq!(v.center_freq_mhz(), 433.92);
    }

    #[test]
    fn test_delete_marker_shifts_indices() {
        let mut v = view(8);
        for i in 0..3 {
            v.place_marker(100.0 + i as f64, -40.0, 0.0, i as f64 * 10.0, 0.0, 0, Pane::Spectrum);
        }
        v.delete_marker(0);
        let rows = v.marker_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].frequency, "101.000");
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].delta, "1.000");
    }

    #[test]
    fn test_averaging_draws_smoothed_trace_but_keeps_raw_history() {
        let mut v = view(8);
        v.set_averaging(3);
        v.add_data(vec![-80.0f32; 4], 1, 0, 1, 0);
        v.add_data(vec![-40.0f32; 4], 2, 0, 2, 0);
        v.surface_mut().ops.clear();
        v.add_data(vec![-40.0f32; 4], 3, 0, 3, 0);

        // alpha = 0.5: -80 -> -60 -> -50
        let raw = v.history().frame_at_row(1).unwrap();
        assert_eq!(&raw.bins[..], &[-40.0f32; 4]);
        assert_eq!(&v.history().frame_at_row(3).unwrap().bins[..], &[-80.0f32; 4]);

        let strokes = v.surface().strokes_in("blue");
        assert_eq!(strokes.len(), 1);
        let expected = trace_path(&[-50.0; 4], 100.0, W as f64 / 4.0, -80.0, 20.0);
        assert_eq!(strokes[0], expected);
        assert_eq!(strokes[0][2].1, 70.0);
    }

    #[test]
    fn test_gradient_between_trace_and_axes() {
        let mut v = SpectrumView::new(
            RecordingSurface::new(W, H),
            ViewOptions { spectrum_gradient: true, ..options(8) },
        )
        .unwrap();
        feed(&mut v, 1, 8);
        v.surface_mut().ops.clear();
        feed(&mut v, 1, 8);

        let ops = &v.surface().ops;
        let trace = ops
            .iter()
            .position(|op| matches!(op, Op::Stroke(_, c, _) if c == "blue"))
            .unwrap();
        let gradient = ops.iter().position(|op| matches!(op, Op::Gradient(_))).unwrap();
        let axes = ops.iter().position(|op| matches!(op, Op::Text(..))).unwrap();
        assert!(trace < gradient && gradient < axes);
        // Same polygon as the stroked trace: 8 bins plus 4 closing points.
        assert_eq!(ops[gradient], Op::Gradient(12));
    }

    #[test]
    fn test_no_gradient_by_default() {
        let mut v = view(8);
        feed(&mut v, 2, 8);
        assert!(!v.surface().ops.iter().any(|op| matches!(op, Op::Gradient(_))));
    }

    #[test]
    fn test_spectrogram_marker_label_right_aligned() {
        let mut v = view(8);
        feed(&mut v, 4, 8);
        v.place_marker(100.0, -40.0, 1.0, 300.0, 250.0, 4, Pane::Spectrogram);
        v.surface_mut().ops.clear();
        v.refresh();
        let row = v.marker_row_to_y(250, 4);
        assert!(v
            .surface()
            .ops
            .iter()
            .any(|op| *op == Op::Text("0".into(), W as f64, row)));
    }

    #[test]
    fn test_trace_path_clamps() {
        let path = trace_path(&[-200.0, 50.0, -30.0], 100.0, 10.0, -80.0, 20.0);
        assert_eq!(path[1], (-1.0, 101.0), "underflow hidden below the pane");
        assert_eq!(path[3], (10.0, 0.0), "overflow pinned to the top");
        assert_eq!(path[4], (20.0, 50.0));
        assert_eq!(path.last(), Some(&(40.0, 101.0)));
    }
}
