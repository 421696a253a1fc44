//! The 2D drawing surface the view renders onto.
//!
//! In the browser this is a canvas 2D context; tests use a recorder. The
//! surface distinguishes its layout (client) size, decided by the page, from
//! its backing-store size, which the view keeps in sync by polling.

use crate::types::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Middle,
    Bottom,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle<'a> {
    pub font: &'a str,
    pub color: &'a str,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

pub trait Surface {
    /// Size the page lays the surface out at.
    fn client_size(&self) -> (u32, u32);
    /// Backing-store size in pixels.
    fn size(&self) -> (u32, u32);
    fn set_size(&mut self, width: u32, height: u32);

    fn fill_rect(&mut self, rect: Rect, color: &str);
    /// Stroke a connected path through `points`. Empty `dash` is a solid line.
    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: &str, dash: &[f64]);
    /// Fill the closed polygon `points` with a vertical linear gradient
    /// running from `y0` to `y1`.
    fn fill_gradient(&mut self, points: &[(f64, f64)], y0: f64, y1: f64, stops: &[(f64, [u8; 3])]);
    /// Copy `src` of a `width` × `height` RGBA image onto `dst`, unsmoothed.
    fn draw_rgba(&mut self, pixels: &[u8], width: u32, height: u32, src: Rect, dst: Rect);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: &str, dash: &[f64]) {
        self.stroke_polyline(&[(x0, y0), (x1, y1)], color, dash);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        FillRect(Rect, String),
        Stroke(Vec<(f64, f64)>, String, bool),
        Gradient(usize),
        Rgba { src: Rect, dst: Rect, width: u32, height: u32 },
        Text(String, f64, f64),
        Resize(u32, u32),
    }

    /// Captures draw calls for assertions.
    pub struct RecordingSurface {
        pub client: (u32, u32),
        pub backing: (u32, u32),
        pub ops: Vec<Op>,
    }

    impl RecordingSurface {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                client: (width, height),
                backing: (width, height),
                ops: Vec::new(),
            }
        }

        pub fn texts(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(t, _, _) => Some(t.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn strokes_in(&self, color: &str) -> Vec<Vec<(f64, f64)>> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Stroke(p, c, _) if c == color => Some(p.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn client_size(&self) -> (u32, u32) {
            self.client
        }

        fn size(&self) -> (u32, u32) {
            self.backing
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.backing = (width, height);
            self.ops.push(Op::Resize(width, height));
        }

        fn fill_rect(&mut self, rect: Rect, color: &str) {
            self.ops.push(Op::FillRect(rect, color.to_string()));
        }

        fn stroke_polyline(&mut self, points: &[(f64, f64)], color: &str, dash: &[f64]) {
            self.ops
                .push(Op::Stroke(points.to_vec(), color.to_string(), !dash.is_empty()));
        }

        fn fill_gradient(&mut self, points: &[(f64, f64)], _y0: f64, _y1: f64, _stops: &[(f64, [u8; 3])]) {
            self.ops.push(Op::Gradient(points.len()));
        }

        fn draw_rgba(&mut self, _pixels: &[u8], width: u32, height: u32, src: Rect, dst: Rect) {
            self.ops.push(Op::Rgba { src, dst, width, height });
        }

        fn fill_text(&mut self, text: &str, x: f64, y: f64, _style: &TextStyle) {
            self.ops.push(Op::Text(text.to_string(), x, y));
        }
    }
}
