//! dB and frequency grid drawn over the spectrum pane.
//!
//! The layout is pure data, rebuilt only when the pane size, dB range or
//! tuning changes, and replayed onto the surface every frame.

use crate::scale::{format_axis_frequency, squeeze};
use crate::surface::{Surface, TextAlign, TextBaseline, TextStyle};

const GRID_COLOR: &str = "rgba(200, 200, 200, 0.40)";
const FONT: &str = "12px sans-serif";
const DB_STEP: f64 = 10.0;
const X_DIVISIONS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisKey {
    pub width: u32,
    pub height: u32,
    pub min_db: f64,
    pub max_db: f64,
    pub center_hz: f64,
    pub span_hz: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisOverlay {
    pub key: AxisKey,
    /// Horizontal dB gridlines as (y, x_start).
    pub db_lines: Vec<(f64, f64)>,
    /// Vertical frequency gridlines (x).
    pub freq_lines: Vec<f64>,
    pub labels: Vec<AxisLabel>,
}

impl AxisOverlay {
    pub fn build(key: AxisKey) -> Self {
        let width = key.width as f64;
        let height = key.height as f64;
        let mut db_lines = Vec::new();
        let mut labels = Vec::new();

        // Skip the outermost step at each end of the range.
        let mut db = key.min_db + DB_STEP;
        while db <= key.max_db - DB_STEP {
            let y = height - squeeze(db as f32, key.min_db, key.max_db, 0.0, height);
            db_lines.push((y, 20.0));
            labels.push(AxisLabel {
                text: format!("{}", db),
                x: 5.0,
                y,
                align: TextAlign::Left,
                baseline: TextBaseline::Middle,
            });
            db += DB_STEP;
        }

        let step = (width / X_DIVISIONS as f64).round();
        let mut freq_lines = Vec::with_capacity(X_DIVISIONS as usize + 1);
        for i in 0..=X_DIVISIONS {
            let x = step * i as f64;
            freq_lines.push(x);
            // First, middle and last only; narrow screens can't fit more.
            if i % 5 != 0 || key.span_hz <= 0.0 {
                continue;
            }
            let (align, adjust) = match i {
                0 => (TextAlign::Left, 3.0),
                X_DIVISIONS => (TextAlign::Right, -3.0),
                _ => (TextAlign::Center, 0.0),
            };
            let hz = key.center_hz + key.span_hz / X_DIVISIONS as f64 * (i as f64 - 5.0);
            labels.push(AxisLabel {
                text: format_axis_frequency(hz, key.center_hz + key.span_hz),
                x: x + adjust,
                y: height - 3.0,
                align,
                baseline: TextBaseline::Bottom,
            });
        }

        Self {
            key,
            db_lines,
            freq_lines,
            labels,
        }
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, text_color: &str) {
        let width = self.key.width as f64;
        let height = self.key.height as f64;
        for &(y, x0) in &self.db_lines {
            surface.stroke_line(x0, y, width, y, GRID_COLOR, &[]);
        }
        for &x in &self.freq_lines {
            surface.stroke_line(x, 0.0, x, height, GRID_COLOR, &[]);
        }
        for label in &self.labels {
            let style = TextStyle {
                font: FONT,
                color: text_color,
                align: label.align,
                baseline: label.baseline,
            };
            surface.fill_text(&label.text, label.x, label.y, &style);
        }
    }
}
