use rfscope_core::surface::{Surface, TextAlign, TextBaseline, TextStyle};
use rfscope_core::types::Rect;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// [`Surface`] over an on-page canvas 2D context.
///
/// RGBA blits go through a scratch canvas that is kept between frames and
/// only resized when the source image changes size.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scratch: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    match canvas.get_context("2d") {
        Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
        Ok(None) => None,
        Err(e) => {
            log::error!("getContext(2d) failed: {e:?}");
            None
        }
    }
}

fn dash_array(dash: &[f64]) -> js_sys::Array {
    dash.iter().map(|&d| JsValue::from_f64(d)).collect()
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[(f64, f64)]) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        ctx.move_to(x, y);
    }
    for &(x, y) in iter {
        ctx.line_to(x, y);
    }
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let Some(ctx) = context_2d(&canvas) else {
            log::error!("Canvas has no 2D context");
            return None;
        };
        Some(Self {
            canvas,
            ctx,
            scratch: None,
        })
    }

    fn scratch(&mut self, width: u32, height: u32) -> Option<&(HtmlCanvasElement, CanvasRenderingContext2d)> {
        if self.scratch.is_none() {
            let doc = web_sys::window()?.document()?;
            let tmp = match doc.create_element("canvas") {
                Ok(el) => el.dyn_into::<HtmlCanvasElement>().ok()?,
                Err(e) => {
                    log::error!("Failed to create scratch canvas: {e:?}");
                    return None;
                }
            };
            let tmp_ctx = context_2d(&tmp)?;
            self.scratch = Some((tmp, tmp_ctx));
        }
        let scratch = self.scratch.as_ref()?;
        if scratch.0.width() != width || scratch.0.height() != height {
            scratch.0.set_width(width);
            scratch.0.set_height(height);
        }
        Some(scratch)
    }
}

impl Surface for CanvasSurface {
    fn client_size(&self) -> (u32, u32) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.width() as u32, rect.height() as u32)
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: &str, dash: &[f64]) {
        if points.len() < 2 {
            return;
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(1.0);
        if !dash.is_empty() {
            let _ = self.ctx.set_line_dash(&dash_array(dash));
        }
        trace_path(&self.ctx, points);
        self.ctx.stroke();
        if !dash.is_empty() {
            let _ = self.ctx.set_line_dash(&js_sys::Array::new());
        }
    }

    fn fill_gradient(&mut self, points: &[(f64, f64)], y0: f64, y1: f64, stops: &[(f64, [u8; 3])]) {
        let gradient = self.ctx.create_linear_gradient(0.0, y0, 0.0, y1);
        for &(offset, [r, g, b]) in stops {
            if let Err(e) = gradient.add_color_stop(offset as f32, &format!("rgb({r}, {g}, {b})")) {
                log::error!("Bad gradient stop at {offset}: {e:?}");
                return;
            }
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        trace_path(&self.ctx, points);
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn draw_rgba(&mut self, pixels: &[u8], width: u32, height: u32, src: Rect, dst: Rect) {
        let img = match ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), width, height) {
            Ok(img) => img,
            Err(e) => {
                log::error!("Failed to create ImageData: {e:?}");
                return;
            }
        };
        let Some((tmp, tmp_ctx)) = self.scratch(width, height) else {
            return;
        };
        if let Err(e) = tmp_ctx.put_image_data(&img, 0.0, 0.0) {
            log::error!("putImageData failed: {e:?}");
            return;
        }
        let tmp = tmp.clone();
        self.ctx.set_image_smoothing_enabled(false);
        let _ = self
            .ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &tmp, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
            );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ctx.set_font(style.font);
        self.ctx.set_fill_style_str(style.color);
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline(match style.baseline {
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        });
        let _ = self.ctx.fill_text(text, x, y);
    }
}
