#![warn(clippy::all, rust_2018_idioms)]

use std::sync::Arc;

use eframe::egui;
use snapmark::bridge::ScreenshotState;
use snapmark::config::{EditorConfig, PresentationMode, StartupOptions};
use snapmark::file_handler::load_image_file;
use snapmark::ScreenshotApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = StartupOptions::from_args(std::env::args().skip(1));
    let screenshots = Arc::new(ScreenshotState::new());

    // Stand-in for the capture source: announce the image given on the
    // command line as the current screenshot.
    if let Some(path) = &options.image {
        match load_image_file(path) {
            Ok(url) => screenshots.store_and_emit(url),
            Err(err) => log::error!("Could not load {}: {}", path.display(), err),
        }
    }

    let defaults = EditorConfig::default();
    let viewport = match options.mode {
        PresentationMode::Preview => egui::ViewportBuilder::default()
            .with_title("Snapmark preview")
            .with_inner_size(defaults.preview_size)
            .with_decorations(false)
            .with_always_on_top()
            .with_resizable(false),
        PresentationMode::Editor => egui::ViewportBuilder::default()
            .with_title("Snapmark")
            .with_inner_size(defaults.container_size + egui::vec2(160.0, 40.0))
            .with_min_inner_size([480.0, 320.0]),
    };
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let mode = options.mode;
    eframe::run_native(
        "snapmark",
        native_options,
        Box::new(move |cc| Ok(Box::new(ScreenshotApp::new(cc, mode, screenshots)))),
    )
}
