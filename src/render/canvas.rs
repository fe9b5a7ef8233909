//! Drawing primitives used by the annotator.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};

use crate::geometry::Rect;

const MAX_STROKE: u32 = 64;

/// Text anchored further left of or above the frame than this cannot reach it.
const MAX_TEXT_EXTENT: i64 = 4096;

/// 2D drawing surface.
pub trait Canvas {
    /// Outline `rect` with a stroke `thickness` pixels wide, drawn inward.
    fn draw_rect(&mut self, rect: &Rect, color: Rgb<u8>, thickness: u32);

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgb<u8>, scale: f32);
}

/// [`Canvas`] over an in-memory RGB frame.
///
/// Text needs a font; without one, `draw_text` draws nothing.
pub struct ImageCanvas<'a> {
    image: &'a mut RgbImage,
    font: Option<&'a FontArc>,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self { image, font: None }
    }

    pub fn with_font(mut self, font: Option<&'a FontArc>) -> Self {
        self.font = font;
        self
    }
}

impl Canvas for ImageCanvas<'_> {
    fn draw_rect(&mut self, rect: &Rect, color: Rgb<u8>, thickness: u32) {
        let stroke = thickness.clamp(1, MAX_STROKE) as i32;
        // Corners clamp to one stroke outside the frame; clamped edges stay off-screen.
        let max_x = self.image.width().min(i32::MAX as u32 / 2) as i32 + stroke;
        let max_y = self.image.height().min(i32::MAX as u32 / 2) as i32 + stroke;
        let (x1, y1, x2, y2) = rect.to_pixel_corners();
        let (x1, x2) = (x1.clamp(-stroke, max_x), x2.clamp(-stroke, max_x));
        let (y1, y2) = (y1.clamp(-stroke, max_y), y2.clamp(-stroke, max_y));

        // Corners are inclusive.
        let width = x2 - x1 + 1;
        let height = y2 - y1 + 1;
        for inset in 0..stroke {
            let w = width - 2 * inset;
            let h = height - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let outline = imageproc::rect::Rect::at(x1 + inset, y1 + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(self.image, outline, color);
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgb<u8>, scale: f32) {
        let Some(font) = self.font else {
            return;
        };
        if text.is_empty() {
            return;
        }
        // imageproc positions text by its top-left corner.
        let top = y.saturating_sub(scale.round() as i32);
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);
        if i64::from(x) >= width
            || i64::from(top) >= height
            || i64::from(x) < -MAX_TEXT_EXTENT
            || i64::from(top) < -MAX_TEXT_EXTENT
        {
            return;
        }
        draw_text_mut(self.image, color, x, top, PxScale::from(scale), font, text);
    }
}
