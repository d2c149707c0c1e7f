use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};

use crate::canvas::ScreenshotImage;

/// Keeps the GPU copy of the current screenshot, re-uploading only when a
/// new screenshot replaces it.
#[derive(Default)]
pub struct TextureManager {
    current: Option<(u64, TextureHandle)>,
    uploads: usize,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture of `image`, uploading it if this generation is not cached.
    pub fn texture_for(&mut self, ctx: &Context, image: &ScreenshotImage) -> TextureId {
        if let Some((generation, handle)) = &self.current {
            if *generation == image.generation() {
                return handle.id();
            }
        }

        let pixels = image.pixels();
        let color_image = ColorImage::from_rgba_unmultiplied(
            [pixels.width() as usize, pixels.height() as usize],
            pixels.as_raw(),
        );
        let name = format!("screenshot_v{}", image.generation());
        let handle = ctx.load_texture(&name, color_image, TextureOptions::LINEAR);
        log::debug!("Uploaded {} ({}x{})", name, pixels.width(), pixels.height());

        let id = handle.id();
        self.current = Some((image.generation(), handle));
        self.uploads += 1;
        id
    }

    pub fn cached_generation(&self) -> Option<u64> {
        self.current.as_ref().map(|(generation, _)| *generation)
    }

    /// Number of uploads so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn clear_cache(&mut self) {
        self.current = None;
    }
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached_generation", &self.cached_generation())
            .field("uploads", &self.uploads)
            .finish()
    }
}
