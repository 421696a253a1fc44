use std::sync::Arc;

/// Seconds + nanoseconds, as delivered by the frame source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub sec: i64,
    pub nsec: u32,
}

impl Timestamp {
    pub fn new(sec: i64, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 / 1e9
    }
}

/// One spectrum snapshot: dB power per bin plus the accumulation window.
/// Start and end may be equal.
#[derive(Clone, Debug)]
pub struct Frame {
    pub bins: Arc<[f32]>,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Frame {
    pub fn new(bins: impl Into<Arc<[f32]>>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            bins: bins.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Which half of the display a pixel or marker belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    /// Line plot of the newest frame (top).
    Spectrum,
    /// Scrolling waterfall of historical frames (bottom).
    Spectrogram,
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}
