//! Still-image synthesis stage: provider call, decode, caption overlay,
//! and conversion to an opaque JPEG for the animation provider.

use std::sync::Arc;

use ab_glyph::FontVec;
use gifforge_core::overlay;
use gifforge_providers::ImageProvider;

use crate::error::{GenerationError, Stage};

/// Synthesizes the captioned base image as JPEG bytes.
pub struct ImageSynthesizer {
    provider: Arc<dyn ImageProvider>,
    font: Option<Arc<FontVec>>,
}

impl ImageSynthesizer {
    /// `font` is the caption face; `None` means overlays are skipped
    /// (the job itself still succeeds; font trouble never fails a job).
    pub fn new(provider: Arc<dyn ImageProvider>, font: Option<FontVec>) -> Self {
        Self {
            provider,
            font: font.map(Arc::new),
        }
    }

    /// Generate the still for `prompt` and composite `overlay_text` onto
    /// it. Returns opaque JPEG bytes; the animation provider rejects
    /// images with an alpha channel.
    pub async fn synthesize(
        &self,
        prompt: &str,
        overlay_text: Option<&str>,
    ) -> Result<Vec<u8>, GenerationError> {
        let bytes = self
            .provider
            .generate(prompt)
            .await
            .map_err(|e| GenerationError::from_provider(Stage::Synthesize, e))?;

        let decoded = image::load_from_memory(&bytes).map_err(GenerationError::Decode)?;
        let mut rgba = decoded.to_rgba8();

        if let Some(text) = overlay_text {
            match &self.font {
                Some(font) => overlay::draw_caption(&mut rgba, font, text),
                None => tracing::warn!("No caption font loaded; skipping overlay"),
            }
        }

        let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
        let mut jpeg = Vec::new();
        rgb.write_to(
            &mut std::io::Cursor::new(&mut jpeg),
            image::ImageFormat::Jpeg,
        )
        .map_err(GenerationError::Decode)?;

        Ok(jpeg)
    }
}
