use crate::colormap::Colormap;
use crate::scale::color_index;
use crate::surface::Surface;
use crate::types::Rect;

/// Offscreen RGBA image of the waterfall: one pixel column per bin, one row
/// per history slot, newest row at the top.
pub struct Waterfall {
    pub width: u32,
    pub rows: u32,
    pub pixels: Vec<u8>,
}

impl Waterfall {
    pub fn new(width: u32, rows: u32) -> Self {
        Self {
            width,
            rows,
            pixels: vec![0u8; (width as usize) * (rows as usize) * 4],
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Reallocate at a new bin count. The old image is discarded.
    pub fn resize_width(&mut self, width: u32) {
        *self = Self::new(width, self.rows);
    }

    pub fn row(&self, row: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = row as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Shift every row down by one and write `bins` as the new top row.
    pub fn push_row(&mut self, bins: &[f32], colormap: &Colormap, min_db: f64, max_db: f64) {
        let stride = self.width as usize * 4;
        if stride == 0 || self.rows == 0 {
            return;
        }
        if self.rows > 1 {
            let moved = (self.rows as usize - 1) * stride;
            self.pixels.copy_within(0..moved, stride);
        }
        for (x, px) in self.pixels[..stride].chunks_exact_mut(4).enumerate() {
            // Missing bins (short frame) render as the coldest colour.
            let value = bins.get(x).copied().unwrap_or(f32::MIN);
            let [r, g, b] = colormap.apply(color_index(value, min_db, max_db));
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = 255;
        }
    }

    /// Blit the waterfall below the spectrum pane. Only as many rows as fit
    /// in the remaining height are copied, so rows are never stretched.
    pub fn draw<S: Surface>(&self, surface: &mut S, spectrum_height: f64) {
        let (width, height) = surface.size();
        let available = (height as f64 - spectrum_height).max(0.0);
        let rows = (self.rows as f64).min(available);
        if rows <= 0.0 || self.width == 0 {
            return;
        }
        surface.draw_rgba(
            &self.pixels,
            self.width,
            self.rows,
            Rect::new(0.0, 0.0, self.width as f64, rows),
            Rect::new(0.0, spectrum_height, width as f64, available),
        );
    }
}
