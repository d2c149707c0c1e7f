use std::io::Cursor;
use std::path::Path;

use eframe::egui;

use crate::bridge::ScreenshotState;
use crate::data_url;
use crate::error::ScreenshotError;

/// Turns image files dropped on the window into screenshot announcements.
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
    processed_files: Vec<String>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            dropped_files: Vec::new(),
            processed_files: Vec::new(),
        }
    }

    /// Pick up files dropped this frame. Returns true if there are any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;

        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });

        new_dropped_files
    }

    /// Announce every new dropped image as the current screenshot.
    /// Returns how many were announced.
    pub fn process_dropped_files(&mut self, screenshots: &ScreenshotState) -> usize {
        let mut announced = 0;

        for file in std::mem::take(&mut self.dropped_files) {
            // Web drops have no path, only a name
            let file_name = if let Some(path) = &file.path {
                path.display().to_string()
            } else if !file.name.is_empty() {
                file.name.clone()
            } else {
                "unknown".to_owned()
            };

            // Some platforms report the same drop on several frames
            if self.processed_files.contains(&file_name) {
                continue;
            }

            if !is_image_file(&file) {
                log::warn!("Dropped file is not a supported type: {}", file_name);
                continue;
            }

            // Prefer in-memory bytes over re-reading from disk
            let result = if let Some(bytes) = &file.bytes {
                log::info!("Processing image from memory: {} ({} bytes)", file_name, bytes.len());
                png_data_url(bytes)
            } else if let Some(path) = &file.path {
                load_image_file(path)
            } else {
                log::warn!("Dropped file has no accessible data: {}", file_name);
                continue;
            };

            match result {
                Ok(url) => {
                    screenshots.store_and_emit(url);
                    self.processed_files.push(file_name);
                    announced += 1;
                }
                Err(err) => log::error!("Failed to load {}: {}", file_name, err),
            }
        }

        announced
    }

    /// Darken the window and list the files while they hover over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Drop an image to annotate it:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        // Draw above everything else
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));

        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }

    /// Forget which files were already announced.
    pub fn clear_processed_files(&mut self) {
        self.dropped_files.clear();
        self.processed_files.clear();
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(path) = &file.path {
        has_image_extension(path)
    } else {
        false
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

/// Read an image from disk and wrap it as a PNG data URL.
pub fn load_image_file(path: &Path) -> Result<String, ScreenshotError> {
    log::info!("Processing image from path: {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| ScreenshotError::Io {
        path: path.to_owned(),
        source,
    })?;
    png_data_url(&bytes)
}

/// Decode any supported image and re-encode it as a PNG data URL, the form
/// screenshots are announced in.
pub fn png_data_url(bytes: &[u8]) -> Result<String, ScreenshotError> {
    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ScreenshotError::Empty {
            width: img.width(),
            height: img.height(),
        });
    }
    log::debug!("Successfully decoded image: {}x{}", img.width(), img.height());

    // Re-encode so every screenshot travels as PNG
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(data_url::encode_png(&png))
}
