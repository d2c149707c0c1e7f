use egui::Color32;

use crate::config::EditorConfig;
use crate::element::ShapeId;

mod controller;

pub use crate::element::ToolKind;
pub use controller::ToolController;

/// Active tool, color and stroke width. Lives as long as the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: Color32,
    pub stroke_width: f32,
    pub highlighter_alpha: f32,
    pub highlighter_width_factor: f32,
    pub text_size_factor: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            tool: config.tool,
            color: config.color,
            stroke_width: config.stroke_width,
            highlighter_alpha: config.highlighter_alpha,
            highlighter_width_factor: config.highlighter_width_factor,
            text_size_factor: config.text_size_factor,
        }
    }

    /// Write the user-facing parts back into `config` for persistence.
    pub fn store_into(&self, config: &mut EditorConfig) {
        config.tool = self.tool;
        config.color = self.color;
        config.stroke_width = self.stroke_width;
    }

    /// The current color made translucent for highlighter strokes.
    pub fn highlighter_color(&self) -> Color32 {
        let alpha = (self.highlighter_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let [r, g, b, _] = self.color.to_srgba_unmultiplied();
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }

    pub fn highlighter_width(&self) -> f32 {
        self.stroke_width * self.highlighter_width_factor
    }

    pub fn font_size(&self) -> f32 {
        self.stroke_width * self.text_size_factor
    }
}

/// What lies under the pointer when it goes down.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// Canvas outside the screenshot
    Empty,
    /// The screenshot itself
    Image,
    Shape(ShapeId),
}
