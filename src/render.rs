//! Canvas rendering of the tile grid.
//!
//! Outlines are 1px strokes layered over the checkerboard base; they never
//! erase it, so a tile is cleared by refilling its base colour.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::model::{Grid, Position};

pub const BASE_EVEN: &str = "#141414";
pub const BASE_ODD: &str = "#101010";
pub const HOVER_STROKE: &str = "#ffffff";
pub const SELECT_STROKE: &str = "#8b5cf6";

pub fn base_color(pos: Position) -> &'static str {
    if (pos.x + pos.y) % 2 == 0 { BASE_EVEN } else { BASE_ODD }
}

pub trait TileCanvas {
    /// Resizes to `grid.size * pixel` and repaints the whole checkerboard.
    fn reset(&mut self, grid: Grid, pixel: u32);
    fn redraw_base_tile(&mut self, pos: Position);
    fn draw_hover_outline(&mut self, pos: Position);
    fn draw_selection_outline(&mut self, pos: Position);
}

/// 2D-context renderer. Draw calls before `attach` are no-ops.
#[derive(Default)]
pub struct Canvas2dRenderer {
    canvas: Option<HtmlCanvasElement>,
    ctx: Option<CanvasRenderingContext2d>,
    pixel: u32,
}

impl Canvas2dRenderer {
    pub fn attach(&mut self, canvas: HtmlCanvasElement) {
        self.ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
        if self.ctx.is_none() {
            tracing::error!("canvas has no 2d context");
        }
        self.canvas = Some(canvas);
    }

    fn fill(&self, pos: Position) {
        let Some(ctx) = &self.ctx else { return };
        let p = self.pixel as f64;
        ctx.set_fill_style_str(base_color(pos));
        ctx.fill_rect(pos.x as f64 * p, pos.y as f64 * p, p, p);
    }

    fn stroke(&self, pos: Position, color: &str) {
        let Some(ctx) = &self.ctx else { return };
        let p = self.pixel as f64;
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(1.0);
        ctx.stroke_rect(pos.x as f64 * p + 0.5, pos.y as f64 * p + 0.5, p - 1.0, p - 1.0);
    }
}

impl TileCanvas for Canvas2dRenderer {
    fn reset(&mut self, grid: Grid, pixel: u32) {
        self.pixel = pixel;
        let Some(canvas) = &self.canvas else { return };
        let side = grid.size * pixel;
        canvas.set_width(side);
        canvas.set_height(side);
        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", side));
        let _ = style.set_property("height", &format!("{}px", side));
        // setting the size drops the context state, so re-fetch it
        self.ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
        for y in 0..grid.size {
            for x in 0..grid.size {
                self.fill(Position::new(x, y));
            }
        }
    }

    fn redraw_base_tile(&mut self, pos: Position) {
        self.fill(pos);
    }

    fn draw_hover_outline(&mut self, pos: Position) {
        self.stroke(pos, HOVER_STROKE);
    }

    fn draw_selection_outline(&mut self, pos: Position) {
        self.stroke(pos, SELECT_STROKE);
    }
}

#[cfg(test)]
pub use recording::{DrawOp, RecordingCanvas};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_parity() {
        assert_eq!(base_color(Position::new(0, 0)), BASE_EVEN);
        assert_eq!(base_color(Position::new(1, 0)), BASE_ODD);
        assert_eq!(base_color(Position::new(4, 3)), BASE_ODD);
        assert_eq!(base_color(Position::new(5, 3)), BASE_EVEN);
    }
}
