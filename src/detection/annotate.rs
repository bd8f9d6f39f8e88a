use ab_glyph::{FontArc, FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::models::BoundingBox;

/// Vertical gap between a label's baseline and the top of its box
const LABEL_OFFSET: i32 = 10;

/// Draws boxes and labels onto result images.
///
/// Labels use the bundled sans-serif font unless another one is supplied.
#[derive(Clone)]
pub struct Annotator {
    font: Option<FontArc>,
}

impl Annotator {
    pub fn new() -> Self {
        Self { font: bundled_font() }
    }

    /// Boxes only
    pub fn without_font() -> Self {
        Self { font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Load a TrueType/OpenType font from disk
    pub fn load_font(path: &Path) -> anyhow::Result<FontArc> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read font {}: {}", path.display(), e))?;
        FontArc::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("Invalid font {}: {}", path.display(), e))
    }

    /// Draw a 2px box covering `bbox` with its edges on the box's outer pixels
    pub fn draw_box(&self, canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
        if bbox.width == 0 || bbox.height == 0 {
            return;
        }

        let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width + 1, bbox.height + 1);
        draw_hollow_rect_mut(canvas, outer, color);

        if bbox.width > 1 && bbox.height > 1 {
            let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                .of_size(bbox.width - 1, bbox.height - 1);
            draw_hollow_rect_mut(canvas, inner, color);
        }
    }

    /// Draw `text` just above the top-left corner of `bbox`
    pub fn draw_label(
        &self,
        canvas: &mut RgbImage,
        bbox: &BoundingBox,
        text: &str,
        color: Rgb<u8>,
        size: f32,
    ) {
        let Some(font) = &self.font else {
            return;
        };

        let scale = PxScale::from(size);
        // draw_text_mut positions the glyph box by its top edge
        let y = bbox.y as i32 - LABEL_OFFSET - size.round() as i32;
        draw_text_mut(canvas, color, bbox.x as i32, y, scale, font, text);
    }

    pub fn draw_labeled_box(
        &self,
        canvas: &mut RgbImage,
        bbox: &BoundingBox,
        text: &str,
        color: Rgb<u8>,
        size: f32,
    ) {
        self.draw_box(canvas, bbox, color);
        self.draw_label(canvas, bbox, text, color, size);
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("font", &self.font.as_ref().map(|_| "<font>"))
            .finish()
    }
}

/// Ubuntu Light, shipped with `epaint_default_fonts`
fn bundled_font() -> Option<FontArc> {
    match FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
        Ok(font) => Some(FontArc::new(font)),
        Err(e) => {
            log::warn!("Bundled label font is unreadable, labels disabled: {}", e);
            None
        }
    }
}
