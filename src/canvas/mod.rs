//! Owner of the screenshot, its display scaling and the annotation model.

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;
use log::{info, warn};

use crate::config::EditorConfig;
use crate::data_url;
use crate::element::{Shape, ToolKind};
use crate::error::ScreenshotError;
use crate::event::EditorEvent;
use crate::geometry::hit_testing::{handle_at, topmost_shape_at};
use crate::gizmo::GizmoHandle;
use crate::state::EditorContext;
use crate::tools::{PointerTarget, ToolController, ToolSettings};

/// The decoded screenshot. Never mutated; a new capture replaces it.
#[derive(Debug)]
pub struct ScreenshotImage {
    pixels: RgbaImage,
    /// Bumped on every replacement so textures can be re-uploaded.
    generation: u64,
}

impl ScreenshotImage {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Display scale that fits `image` into `container` without upscaling.
pub fn fit_scale(image: Vec2, container: Vec2) -> f32 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return 1.0;
    }
    (container.x / image.x).min(container.y / image.y).min(1.0)
}

/// Screenshot, render-surface size, shapes and tools of one editor surface.
///
/// Shape coordinates are in render-surface space: (0,0) is the top-left of
/// the displayed (scaled) screenshot.
#[derive(Debug)]
pub struct CanvasHost {
    image: Option<ScreenshotImage>,
    scale: f32,
    render_size: Vec2,
    container_size: Vec2,
    generation: u64,
    pub editor: EditorContext,
    pub tools: ToolController,
}

impl CanvasHost {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            image: None,
            scale: 1.0,
            render_size: Vec2::ZERO,
            container_size: config.container_size,
            generation: 0,
            editor: EditorContext::new(),
            tools: ToolController::new(ToolSettings::from_config(config)),
        }
    }

    pub fn image(&self) -> Option<&ScreenshotImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Size of the displayed screenshot, image size × scale.
    pub fn render_size(&self) -> Vec2 {
        self.render_size
    }

    pub fn set_container_size(&mut self, container: Vec2) {
        self.container_size = container;
    }

    /// Decode an announced screenshot and replace the current one.
    ///
    /// On failure the previous state is kept and the error returned.
    pub fn load_screenshot(&mut self, url: &str) -> Result<(), ScreenshotError> {
        let bytes = data_url::decode(url)?;
        let pixels = image::load_from_memory(&bytes)?.to_rgba8();
        self.replace_image(pixels)
    }

    /// Install `pixels` as the screenshot, resetting shapes and selection.
    pub fn replace_image(&mut self, pixels: RgbaImage) -> Result<(), ScreenshotError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ScreenshotError::Empty { width, height });
        }

        let size = Vec2::new(width as f32, height as f32);
        self.scale = fit_scale(size, self.container_size);
        self.render_size = size * self.scale;
        self.generation += 1;
        self.image = Some(ScreenshotImage {
            pixels,
            generation: self.generation,
        });

        self.editor.reset();
        info!(
            "Loaded {}x{} screenshot at scale {:.3}",
            width, height, self.scale
        );
        self.editor.event_bus.emit(EditorEvent::ScreenshotLoaded {
            width,
            height,
            scale: self.scale,
        });
        Ok(())
    }

    /// Like [`CanvasHost::load_screenshot`], logging instead of returning the error.
    pub fn handle_notification(&mut self, url: &str) -> bool {
        match self.load_screenshot(url) {
            Ok(()) => true,
            Err(err) => {
                warn!("Ignoring screenshot notification: {}", err);
                false
            }
        }
    }

    /// The render surface in canvas space.
    pub fn surface_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.render_size)
    }

    /// Committed shapes followed by the one being drawn, back to front.
    pub fn visible_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.editor
            .document()
            .shapes()
            .iter()
            .chain(self.editor.state().in_progress_shape())
    }

    /// What lies at canvas position `pos`.
    pub fn target_at(&self, pos: Pos2) -> PointerTarget {
        if let Some(shape) = topmost_shape_at(self.editor.document().shapes(), pos) {
            PointerTarget::Shape(shape.id().clone())
        } else if self.has_image() && self.surface_rect().contains(pos) {
            PointerTarget::Image
        } else {
            PointerTarget::Empty
        }
    }

    /// Pointer went down. A handle of the selected shape's overlay takes
    /// the gesture first; otherwise it goes to the tool controller.
    pub fn pointer_down(&mut self, pos: Pos2) {
        if let Some((handle, shape)) = self.grabbed_handle(pos) {
            if let Some(gizmo) = self.editor.selection_mut().gizmo_mut() {
                gizmo.begin_drag(handle, pos, &shape);
                return;
            }
        }

        let target = self.target_at(pos);
        if let PointerTarget::Shape(id) = &target {
            self.tools.click_shape(id, &mut self.editor);
        }
        self.tools.begin(pos, target, &mut self.editor);
    }

    /// Pointer moved. `keep_aspect` locks the ratio while scaling.
    pub fn pointer_move(&mut self, pos: Pos2, keep_aspect: bool) {
        let transformed = self
            .editor
            .selection()
            .gizmo()
            .and_then(|gizmo| gizmo.drag_to(pos, keep_aspect));
        match transformed {
            Some(shape) => {
                self.editor.apply_transform(shape);
            }
            None => self.tools.extend(pos, &mut self.editor),
        }
    }

    pub fn pointer_up(&mut self) {
        let dragged = self
            .editor
            .selection_mut()
            .gizmo_mut()
            .is_some_and(|gizmo| gizmo.end_drag());
        if !dragged {
            self.tools.end(&mut self.editor);
        }
    }

    /// Overlay handle under `pos`, for cursor feedback.
    pub fn hovered_handle(&self, pos: Pos2) -> Option<GizmoHandle> {
        self.grabbed_handle(pos).map(|(handle, _)| handle)
    }

    fn grabbed_handle(&self, pos: Pos2) -> Option<(GizmoHandle, Shape)> {
        if self.tools.tool() != ToolKind::Select {
            return None;
        }
        self.editor.selection().gizmo()?;
        let id = self.editor.selection().selected()?;
        let shape = self.editor.document().get(id)?;
        handle_at(shape, pos).map(|handle| (handle, shape.clone()))
    }

    /// True while a shape is drawn or a selected shape is dragged.
    pub fn is_busy(&self) -> bool {
        self.editor.state().is_drawing()
            || self
                .editor
                .selection()
                .gizmo()
                .is_some_and(|gizmo| gizmo.is_dragging())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_url(width: u32, height: u32) -> String {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        data_url::encode_png(&png)
    }

    #[test]
    fn scale_never_upscales() {
        assert_eq!(fit_scale(Vec2::new(100.0, 50.0), Vec2::new(1200.0, 760.0)), 1.0);
        assert_eq!(fit_scale(Vec2::new(2400.0, 760.0), Vec2::new(1200.0, 760.0)), 0.5);
        assert_eq!(fit_scale(Vec2::new(1200.0, 1520.0), Vec2::new(1200.0, 760.0)), 0.5);
    }

    #[test]
    fn render_size_follows_scale() {
        let mut host = CanvasHost::new(&EditorConfig {
            container_size: Vec2::new(200.0, 200.0),
            ..Default::default()
        });
        host.load_screenshot(&png_url(400, 100)).unwrap();
        assert_eq!(host.scale(), 0.5);
        assert_eq!(host.render_size(), Vec2::new(200.0, 50.0));
    }

    #[test]
    fn bad_payload_keeps_previous_state() {
        let mut host = CanvasHost::new(&EditorConfig::default());
        assert!(!host.handle_notification("data:image/png;base64,AAAA"));
        assert!(!host.has_image());

        host.load_screenshot(&png_url(10, 10)).unwrap();
        let generation = host.image().unwrap().generation();
        assert!(host.load_screenshot("not a data url").is_err());
        assert_eq!(host.image().unwrap().generation(), generation);
    }

    #[test]
    fn in_progress_shape_is_drawn_last() {
        let mut host = CanvasHost::new(&EditorConfig::default());
        host.load_screenshot(&png_url(100, 100)).unwrap();
        host.tools.set_tool(ToolKind::Circle, &mut host.editor);
        host.pointer_down(Pos2::new(10.0, 10.0));
        host.pointer_up();
        host.pointer_down(Pos2::new(50.0, 50.0));
        host.pointer_move(Pos2::new(60.0, 50.0), false);

        let shapes: Vec<_> = host.visible_shapes().collect();
        assert_eq!(shapes.len(), 2);
        assert_eq!(host.editor.document().len(), 1);
        assert!(host.is_busy());
        assert_eq!(shapes[1].rect().width(), 20.0);
    }

    #[test]
    fn targets() {
        let mut host = CanvasHost::new(&EditorConfig::default());
        assert_eq!(host.target_at(Pos2::new(5.0, 5.0)), PointerTarget::Empty);
        host.load_screenshot(&png_url(100, 100)).unwrap();
        assert_eq!(host.target_at(Pos2::new(5.0, 5.0)), PointerTarget::Image);
        assert_eq!(host.target_at(Pos2::new(500.0, 5.0)), PointerTarget::Empty);
    }

    #[test]
    fn selected_shape_moves_with_its_overlay() {
        let mut host = CanvasHost::new(&EditorConfig::default());
        host.load_screenshot(&png_url(200, 200)).unwrap();
        host.tools.set_tool(ToolKind::Rectangle, &mut host.editor);
        host.pointer_down(Pos2::new(20.0, 20.0));
        host.pointer_move(Pos2::new(60.0, 60.0), false);
        host.pointer_up();

        host.tools.set_tool(ToolKind::Select, &mut host.editor);
        host.pointer_down(Pos2::new(40.0, 40.0));
        host.pointer_up();
        assert!(host.editor.selection().selected().is_some());

        host.pointer_down(Pos2::new(40.0, 40.0));
        assert_eq!(host.hovered_handle(Pos2::new(40.0, 40.0)), Some(GizmoHandle::Move));
        host.pointer_move(Pos2::new(50.0, 45.0), false);
        assert!(host.is_busy());
        host.pointer_up();
        assert!(!host.is_busy());

        let shape = host.editor.document().last().unwrap();
        assert_eq!(shape.rect().min, Pos2::new(30.0, 25.0));
        assert_eq!(host.editor.document().len(), 1);
    }
}
