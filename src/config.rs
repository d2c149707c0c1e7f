use std::time::Duration;

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::ToolKind;

/// Tunables of the editor. Persisted through eframe storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorConfig {
    /// Tool active when the editor opens
    pub tool: ToolKind,
    pub color: Color32,
    pub stroke_width: f32,
    /// Opacity applied to the highlighter color, 0.0..=1.0
    pub highlighter_alpha: f32,
    /// Highlighter width relative to the configured stroke width
    pub highlighter_width_factor: f32,
    /// Font size relative to the configured stroke width
    pub text_size_factor: f32,
    /// Quiet period before an automatic clipboard export
    pub auto_export_debounce_ms: u64,
    pub auto_export: bool,
    /// Pixel density of the exported bitmap relative to the displayed canvas
    pub export_pixel_ratio: f32,
    /// Space the editor canvas may occupy; screenshots are scaled down to fit
    pub container_size: Vec2,
    pub preview_size: Vec2,
    /// Gap between the preview window and the right edge of the monitor
    pub preview_margin_right: f32,
    /// Gap between the preview window and the bottom edge of the monitor
    pub preview_margin_bottom: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: Color32::from_rgb(239, 68, 68),
            stroke_width: 3.0,
            highlighter_alpha: 0.5,
            highlighter_width_factor: 4.0,
            text_size_factor: 6.0,
            auto_export_debounce_ms: 300,
            auto_export: true,
            export_pixel_ratio: 2.0,
            container_size: Vec2::new(1200.0, 760.0),
            preview_size: Vec2::new(300.0, 180.0),
            preview_margin_right: 20.0,
            preview_margin_bottom: 60.0,
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.auto_export_debounce_ms)
    }

    /// Clamp values that would break drawing or export.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.stroke_width > 0.0) {
            self.stroke_width = defaults.stroke_width;
        }
        self.highlighter_alpha = self.highlighter_alpha.clamp(0.0, 1.0);
        if !(self.highlighter_width_factor > 0.0) {
            self.highlighter_width_factor = defaults.highlighter_width_factor;
        }
        if !(self.text_size_factor > 0.0) {
            self.text_size_factor = defaults.text_size_factor;
        }
        if !(self.export_pixel_ratio > 0.0) {
            self.export_pixel_ratio = defaults.export_pixel_ratio;
        }
        if self.container_size.x <= 0.0 || self.container_size.y <= 0.0 {
            self.container_size = defaults.container_size;
        }
        if self.preview_size.x <= 0.0 || self.preview_size.y <= 0.0 {
            self.preview_size = defaults.preview_size;
        }
        self
    }
}

/// Which surface this process presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    /// Small floating view of the latest screenshot
    Preview,
    /// Full annotation workspace
    #[default]
    Editor,
}

/// Startup options parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupOptions {
    pub mode: PresentationMode,
    /// Image to announce as the current screenshot at startup
    pub image: Option<std::path::PathBuf>,
}

impl StartupOptions {
    /// Accepts `mode=preview`, `?mode=preview`, `--mode preview` and
    /// `--mode=preview`. The first other argument is taken as an image path.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = args.next() {
            let value = if arg == "--mode" {
                args.next()
            } else if let Some(rest) = arg.strip_prefix("--mode=") {
                Some(rest.to_owned())
            } else {
                query_value(&arg, "mode")
            };

            match value {
                Some(mode) => options.mode = parse_mode(&mode),
                None if options.image.is_none() && !arg.starts_with('-') => {
                    options.image = Some(arg.into());
                }
                None => log::warn!("Ignoring unknown argument {:?}", arg),
            }
        }
        options
    }
}

fn query_value(arg: &str, key: &str) -> Option<String> {
    let query = arg.rsplit_once('?').map_or(arg, |(_, q)| q);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_owned())
    })
}

fn parse_mode(value: &str) -> PresentationMode {
    match value.to_ascii_lowercase().as_str() {
        "preview" => PresentationMode::Preview,
        "editor" => PresentationMode::Editor,
        other => {
            log::warn!("Unknown presentation mode {:?}, using editor", other);
            PresentationMode::Editor
        }
    }
}
