use std::f64::consts::PI;

use tracing::{debug, warn};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement, ImageBitmap, ImageData,
};

use crate::error::BrowserError;
use crate::model::GridModel;
use crate::pixels::PixelBuffer;
use crate::render::{Rect, Surface};
use crate::state::capture::PixelRect;
use crate::state::landmark::{FrameSize, PixelPoint};

const GLOW_BLUR: f64 = 20.0;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, BrowserError> {
    canvas
        .get_context("2d")?
        .ok_or(BrowserError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| BrowserError::NoContext)
}

fn offscreen(document: &Document, width: u32, height: u32) -> Result<HtmlCanvasElement, BrowserError> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| BrowserError::NoContext)?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

/// Draws a pose-provider image (canvas, video or bitmap) scaled to `w` x `h`.
fn draw_source(ctx: &CanvasRenderingContext2d, image: &JsValue, x: f64, y: f64, w: f64, h: f64) -> Result<(), JsValue> {
    if let Some(c) = image.dyn_ref::<HtmlCanvasElement>() {
        ctx.draw_image_with_html_canvas_element_and_dw_and_dh(c, x, y, w, h)
    } else if let Some(v) = image.dyn_ref::<HtmlVideoElement>() {
        ctx.draw_image_with_html_video_element_and_dw_and_dh(v, x, y, w, h)
    } else if let Some(b) = image.dyn_ref::<ImageBitmap>() {
        ctx.draw_image_with_image_bitmap_and_dw_and_dh(b, x, y, w, h)
    } else {
        Err(JsValue::from_str("unsupported camera image"))
    }
}

fn draw_mirrored(ctx: &CanvasRenderingContext2d, image: &JsValue, frame: FrameSize) -> Result<(), JsValue> {
    ctx.save();
    let result = ctx
        .scale(-1.0, 1.0)
        .and_then(|_| draw_source(ctx, image, -frame.width, 0.0, frame.width, frame.height));
    ctx.restore();
    result
}

/// The on-screen 2D canvas plus the current puzzle's tile images.
pub struct CanvasSurface {
    document: Document,
    ctx: CanvasRenderingContext2d,
    frame: FrameSize,
    /// Offscreen canvas per tile, indexed like `GridModel::tiles`.
    tiles: Vec<HtmlCanvasElement>,
    /// Scratch canvas for reading camera pixels back.
    grab: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement, frame: FrameSize) -> Result<Self, BrowserError> {
        canvas.set_width(frame.width as u32);
        canvas.set_height(frame.height as u32);
        let document = super::window()?.document().ok_or(BrowserError::NoWindow)?;
        let grab = offscreen(&document, frame.width as u32, frame.height as u32)?;
        Ok(Self {
            ctx: context_2d(canvas)?,
            document,
            frame,
            tiles: Vec::new(),
            grab,
        })
    }

    /// Uploads every tile image of `grid` into its own offscreen canvas.
    pub fn load_tiles(&mut self, grid: &GridModel) -> Result<(), BrowserError> {
        self.tiles.clear();
        for tile in grid.tiles() {
            let image = &tile.image;
            let canvas = offscreen(&self.document, image.width(), image.height())?;
            let data = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(image.as_rgba()),
                image.width(),
                image.height(),
            )?;
            context_2d(&canvas)?.put_image_data(&data, 0.0, 0.0)?;
            self.tiles.push(canvas);
        }
        debug!(tiles = self.tiles.len(), "tile canvases ready");
        Ok(())
    }

    pub fn unload_tiles(&mut self) {
        self.tiles.clear();
    }

    /// Reads `rect` of the mirrored camera image, i.e. exactly what the player
    /// saw inside the capture rectangle.
    pub fn grab_region(&self, image: &JsValue, rect: PixelRect) -> Result<PixelBuffer, BrowserError> {
        let ctx = context_2d(&self.grab)?;
        draw_mirrored(&ctx, image, self.frame)?;
        let (w, h) = (self.frame.width as u32, self.frame.height as u32);
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?;
        let full = PixelBuffer::new(w, h, data.data().0)?;
        Ok(full.crop(rect.x, rect.y, rect.width, rect.height)?)
    }
}

impl Surface for CanvasSurface {
    type Frame = JsValue;

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.frame.width, self.frame.height);
    }

    fn draw_frame(&mut self, frame: &JsValue, mirrored: bool) {
        let result = if mirrored {
            draw_mirrored(&self.ctx, frame, self.frame)
        } else {
            draw_source(&self.ctx, frame, 0.0, 0.0, self.frame.width, self.frame.height)
        };
        if let Err(err) = result {
            warn!(error = ?err, "camera frame draw failed");
        }
    }

    fn draw_tile(&mut self, index: usize, rect: Rect, glow: bool) {
        let Some(tile) = self.tiles.get(index) else {
            return;
        };
        self.ctx.save();
        if glow {
            self.ctx.set_shadow_blur(GLOW_BLUR);
            self.ctx.set_shadow_color(crate::render::ACCENT);
        }
        let drawn = self
            .ctx
            .draw_image_with_html_canvas_element_and_dw_and_dh(tile, rect.x, rect.y, rect.width, rect.height);
        self.ctx.restore();
        if let Err(err) = drawn {
            warn!(index, error = ?err, "tile draw failed");
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_text(&mut self, text: &str, at: PixelPoint, color: &str, font: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
        if let Err(err) = self.ctx.fill_text(text, at.x, at.y) {
            warn!(text, error = ?err, "text draw failed");
        }
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], color: &str, line_width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
    }

    fn draw_dot(&mut self, at: PixelPoint, radius: f64, fill: &str, outline: &str) {
        self.ctx.begin_path();
        if let Err(err) = self.ctx.arc(at.x, at.y, radius, 0.0, 2.0 * PI) {
            warn!(radius, error = ?err, "landmark dot draw failed");
            return;
        }
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill();
        self.ctx.set_stroke_style_str(outline);
        self.ctx.set_line_width(1.0);
        self.ctx.stroke();
    }
}
