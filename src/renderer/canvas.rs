//! [`Surface`] over a browser 2D canvas context

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Surface, Viewport};
use crate::sim::Colour;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    /// Resize the backing store and CSS box to `width` x `height` pixels.
    /// Resizing resets the context transform, so callers reapply it.
    pub fn resize(&self, width: u32, height: u32) {
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

impl Surface for CanvasSurface {
    fn set_transform(&mut self, viewport: &Viewport) {
        let scale = f64::from(viewport.scale);
        let _ = self.ctx.set_transform(
            scale,
            0.0,
            0.0,
            scale,
            f64::from(viewport.offset_x),
            f64::from(viewport.offset_y),
        );
        self.ctx.set_image_smoothing_enabled(viewport.smoothing);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        self.ctx.set_fill_style_str(&colour.to_string());
        self.ctx
            .fill_rect(f64::from(x), f64::from(y), f64::from(w), f64::from(h));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, colour: Colour) {
        self.ctx.set_stroke_style_str(&colour.to_string());
        self.ctx.set_line_width(f64::from(line_width));
        self.ctx
            .stroke_rect(f64::from(x), f64::from(y), f64::from(w), f64::from(h));
    }

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour) {
        self.ctx.set_fill_style_str(&colour.to_string());
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            f64::from(centre.x),
            f64::from(centre.y),
            f64::from(radius),
            0.0,
            TAU,
        );
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour) {
        self.ctx.set_line_width(f64::from(width));
        self.ctx.set_stroke_style_str(&colour.to_string());
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(from.x), f64::from(from.y));
        self.ctx.line_to(f64::from(to.x), f64::from(to.y));
        self.ctx.stroke();
    }

    fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        self.ctx.set_font(font);
        self.ctx
            .measure_text(text)
            .map(|m| m.width() as f32)
            .unwrap_or(0.0)
    }

    fn fill_text(&mut self, text: &str, font: &str, pos: Vec2, colour: Colour) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(&colour.to_string());
        let _ = self
            .ctx
            .fill_text(text, f64::from(pos.x), f64::from(pos.y));
    }

    fn stroke_text(&mut self, text: &str, font: &str, pos: Vec2, line_width: f32, colour: Colour) {
        self.ctx.set_font(font);
        self.ctx.set_line_width(f64::from(line_width));
        self.ctx.set_stroke_style_str(&colour.to_string());
        let _ = self
            .ctx
            .stroke_text(text, f64::from(pos.x), f64::from(pos.y));
    }
}
