//! Caption overlay: layout and rasterization of user text onto a still.
//!
//! The caption is drawn centered horizontally near the bottom of the
//! image (85% of the free vertical space), four times in a dark shadow
//! color offset by ±2px and once centered in white, which keeps it
//! readable on any background.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};
use image::RgbaImage;

/// Shadow fill, `#404040`.
pub const SHADOW_COLOR: [u8; 3] = [0x40, 0x40, 0x40];

/// Caption fill.
pub const TEXT_COLOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Shadow pass offsets in pixels, relative to the caption position.
pub const SHADOW_OFFSETS: [(f32, f32); 4] = [(-2.0, -2.0), (2.0, -2.0), (-2.0, 2.0), (2.0, 2.0)];

/// Fraction of the free vertical space above the caption.
const VERTICAL_ANCHOR: f32 = 0.85;

/// Faces tried when no configured font loads. The caption must never
/// fail the job, so these cover the common Linux/macOS installs.
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Caption font size in pixels for an image of the given width.
pub fn font_px_for_width(image_width: u32) -> f32 {
    image_width as f32 / 12.0
}

/// Top-left position of a caption of the given measured size.
///
/// Horizontally centered; vertically at [`VERTICAL_ANCHOR`] of the space
/// left over once the text height is subtracted.
pub fn caption_position(
    image_width: u32,
    image_height: u32,
    text_width: f32,
    text_height: f32,
) -> (f32, f32) {
    let x = (image_width as f32 - text_width) / 2.0;
    let y = (image_height as f32 - text_height) * VERTICAL_ANCHOR;
    (x, y)
}

/// Load the caption font: the configured path first, then the fallback
/// faces. Returns `None` when no face loads; callers skip the overlay
/// in that case rather than failing the job.
pub fn load_caption_font(configured: Option<&Path>) -> Option<FontVec> {
    let candidates = configured
        .into_iter()
        .map(Path::to_path_buf)
        .chain(FALLBACK_FONT_PATHS.iter().copied().map(PathBuf::from));

    for path in candidates {
        match std::fs::read(&path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    tracing::debug!(path = %path.display(), "Loaded caption font");
                    return Some(font);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unusable caption font")
                }
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Caption font not readable")
            }
        }
    }
    tracing::warn!("No caption font available; overlays will be skipped");
    None
}

/// Draw the caption onto `img` with the shadow passes described above.
pub fn draw_caption(img: &mut RgbaImage, font: &FontVec, text: &str) {
    let scale = PxScale::from(font_px_for_width(img.width()));
    let (glyphs, text_width, text_height) = layout_glyphs(font, scale, text);
    if glyphs.is_empty() {
        return;
    }

    let (x, y) = caption_position(img.width(), img.height(), text_width, text_height);

    for (dx, dy) in SHADOW_OFFSETS {
        draw_pass(img, font, &glyphs, x + dx, y + dy, SHADOW_COLOR);
    }
    draw_pass(img, font, &glyphs, x, y, TEXT_COLOR);
}

/// Lay the text out left-to-right at the origin with the baseline at the
/// font's ascent, so a run translated by `(x, y)` has its top at `y`.
/// Returns the positioned glyphs and the run's measured width and height.
fn layout_glyphs(font: &FontVec, scale: PxScale, text: &str) -> (Vec<Glyph>, f32, f32) {
    let scaled = font.as_scaled(scale);
    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;
    let mut previous: Option<GlyphId> = None;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret_x += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, ab_glyph::point(caret_x, scaled.ascent())));
        caret_x += scaled.h_advance(id);
        previous = Some(id);
    }

    (glyphs, caret_x, scaled.height())
}

/// Rasterize one pass of the glyph run at offset `(x, y)` in `color`.
fn draw_pass(img: &mut RgbaImage, font: &FontVec, glyphs: &[Glyph], x: f32, y: f32, color: [u8; 3]) {
    for glyph in glyphs {
        let mut positioned = glyph.clone();
        positioned.position = ab_glyph::point(positioned.position.x + x, positioned.position.y + y);

        if let Some(outlined) = font.outline_glyph(positioned) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend_pixel(img, px, py, color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` into one pixel, ignoring
/// out-of-bounds coordinates (long captions may extend past the edges).
fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: [u8; 3], coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let blended = color[c] as f32 * coverage + pixel.0[c] as f32 * (1.0 - coverage);
        pixel.0[c] = blended.round() as u8;
    }
    pixel.0[3] = pixel.0[3].max((coverage * 255.0).round() as u8);
}
