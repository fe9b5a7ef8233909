use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::geometry::{Resolution, Roi};
use crate::integration::Track;
use crate::render::{Canvas, ImageCanvas};

/// Colors, stroke and text sizes used for annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub track_color: [u8; 3],
    pub roi_color: [u8; 3],
    pub diagnostic_color: [u8; 3],
    pub thickness: u32,
    pub label_scale: f32,
    pub diagnostic_scale: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            track_color: [0, 255, 0],
            roi_color: [0, 0, 255],
            diagnostic_color: [0, 255, 255],
            thickness: 2,
            label_scale: 16.0,
            diagnostic_scale: 22.0,
        }
    }
}

/// Everything drawn onto one display frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub tracks: &'a [Track],
    pub roi: Option<&'a Roi>,
    /// Processing resolution, set only when it differs from the original.
    pub resized_to: Option<Resolution>,
}

/// Offset of labels above the box or region they caption.
const LABEL_OFFSET: i32 = 10;
const DIAGNOSTIC_ORIGIN: (i32, i32) = (10, 30);
/// Caption for a region configured without a label.
const DEFAULT_ROI_LABEL: &str = "ROI";

/// Draws tracks, the ROI and diagnostics onto original-resolution frames.
#[derive(Clone, Default)]
pub struct Annotator {
    style: AnnotationStyle,
    font: Option<FontArc>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("style", &self.style)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Draw `overlay` and return the number of tracks drawn.
    ///
    /// Tentative (unconfirmed) tracks are skipped. The ROI, when present, is
    /// drawn on every call.
    pub fn annotate<C: Canvas>(&self, canvas: &mut C, overlay: &Overlay<'_>) -> usize {
        let style = &self.style;
        let track_color = Rgb(style.track_color);

        let mut drawn = 0;
        for track in overlay.tracks.iter().filter(|t| t.confirmed) {
            let (x1, y1, _, _) = track.bbox.to_pixel_corners();
            canvas.draw_rect(&track.bbox, track_color, style.thickness);
            canvas.draw_text(
                &format!("ID: {}", track.id),
                x1,
                y1.saturating_sub(LABEL_OFFSET),
                track_color,
                style.label_scale,
            );
            drawn += 1;
        }

        if let Some(roi) = overlay.roi {
            let rect = roi.rect();
            let roi_color = Rgb(style.roi_color);
            canvas.draw_rect(&rect, roi_color, style.thickness);
            let (x1, y1, _, _) = rect.to_pixel_corners();
            canvas.draw_text(
                roi.label().unwrap_or(DEFAULT_ROI_LABEL),
                x1,
                y1.saturating_sub(LABEL_OFFSET),
                roi_color,
                style.label_scale,
            );
        }

        if let Some(resolution) = overlay.resized_to {
            let (x, y) = DIAGNOSTIC_ORIGIN;
            canvas.draw_text(
                &format!("Resize: {resolution}"),
                x,
                y,
                Rgb(style.diagnostic_color),
                style.diagnostic_scale,
            );
        }

        drawn
    }

    /// Draw `overlay` directly onto `frame`.
    pub fn annotate_frame(&self, frame: &mut RgbImage, overlay: &Overlay<'_>) -> usize {
        let mut canvas = ImageCanvas::new(frame).with_font(self.font.as_ref());
        self.annotate(&mut canvas, overlay)
    }
}
