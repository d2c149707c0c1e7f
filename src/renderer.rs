use egui::epaint::TextShape;
use egui::{Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use crate::canvas::CanvasHost;
use crate::element::{rotate_point, Geometry, Shape, ToolKind};
use crate::geometry::{arrow_head, normalized_rect, smooth_points, SPLINE_SEGMENTS, STROKE_TENSION};
use crate::gizmo::GizmoHandle;
use crate::texture_manager::TextureManager;

const EMPTY_CANVAS_COLOR: Color32 = Color32::from_gray(40);

/// Paints the canvas: screenshot, then shapes in order, then the overlay of
/// the selected shape.
#[derive(Debug, Default)]
pub struct Renderer {
    textures: TextureManager,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// `canvas_rect` is where canvas position (0,0) and the render size map
    /// to on screen.
    pub fn render(
        &mut self,
        ctx: &egui::Context,
        painter: &Painter,
        canvas_rect: Rect,
        host: &CanvasHost,
        hovered: Option<GizmoHandle>,
    ) {
        let offset = canvas_rect.min.to_vec2();

        match host.image() {
            Some(image) => {
                let texture = self.textures.texture_for(ctx, image);
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture, canvas_rect, uv, Color32::WHITE);
            }
            None => {
                painter.rect_filled(canvas_rect, 4.0, EMPTY_CANVAS_COLOR);
                painter.text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Waiting for a screenshot…",
                    FontId::proportional(18.0),
                    Color32::GRAY,
                );
            }
        }

        for shape in host.visible_shapes() {
            paint_shape(painter, shape, offset);
        }

        let selection = host.editor.selection();
        if let (Some(gizmo), Some(id)) = (selection.gizmo(), selection.selected()) {
            if let Some(shape) = host.editor.document().get(id) {
                gizmo.paint(painter, shape, offset, hovered);
            }
        }
    }
}

/// Draw one shape translated by `offset`.
pub fn paint_shape(painter: &Painter, shape: &Shape, offset: Vec2) {
    let center = shape.rect().center();
    let rotation = shape.rotation();
    let place = |p: Pos2| rotate_point(p, center, rotation) + offset;
    let width = shape.stroke_width();
    let stroke = screen_stroke(shape);

    match shape.geometry() {
        Geometry::Points(points) if shape.tool() == ToolKind::Arrow => {
            let (Some(tail), Some(tip)) = (points.first(), points.last()) else {
                return;
            };
            painter.line_segment([place(*tail), place(*tip)], stroke);
            if let Some([left, right]) = arrow_head(*tail, *tip, width) {
                painter.line_segment([place(*tip), place(left)], stroke);
                painter.line_segment([place(*tip), place(right)], stroke);
            }
        }
        Geometry::Points(points) => {
            let path: Vec<Pos2> = smooth_points(points, STROKE_TENSION, SPLINE_SEGMENTS)
                .into_iter()
                .map(place)
                .collect();
            paint_round_path(painter, &path, stroke);
        }
        Geometry::Rect { origin, size } => {
            let rect = normalized_rect(*origin, *size);
            let corners = vec![
                place(rect.left_top()),
                place(rect.right_top()),
                place(rect.right_bottom()),
                place(rect.left_bottom()),
            ];
            painter.add(egui::Shape::closed_line(corners, stroke));
        }
        Geometry::Circle { center, radius } => {
            painter.circle_stroke(*center + offset, *radius, stroke);
        }
        Geometry::Text {
            origin,
            text,
            font_size,
        } => {
            let galley = painter.layout_no_wrap(
                text.clone(),
                FontId::proportional(*font_size),
                shape.color(),
            );
            painter.add(TextShape::new(place(*origin), galley, shape.color()).with_angle(rotation));
        }
    }
}

/// Stroke used on screen.
///
/// egui has no multiply blend, so the highlighter is shown with its
/// translucent color over the image. The exported bitmap multiplies it in
/// `export::rasterize`.
pub fn screen_stroke(shape: &Shape) -> Stroke {
    Stroke::new(shape.stroke_width(), shape.color())
}

/// Polyline with round caps and joins.
fn paint_round_path(painter: &Painter, path: &[Pos2], stroke: Stroke) {
    let radius = stroke.width / 2.0;
    match path {
        [] => {}
        [only] => {
            painter.circle_filled(*only, radius, stroke.color);
        }
        _ => {
            painter.add(egui::Shape::line(path.to_vec(), stroke));
            // Translucent strokes would darken where caps overlap the line.
            if stroke.color.is_opaque() {
                for point in path {
                    painter.circle_filled(*point, radius, stroke.color);
                }
            } else {
                for point in [path[0], path[path.len() - 1]] {
                    painter.circle_filled(point, radius, stroke.color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::tools::PointerTarget;
    use image::RgbaImage;

    fn populated_host() -> CanvasHost {
        let mut host = CanvasHost::new(&EditorConfig::default());
        host.replace_image(RgbaImage::new(50, 50)).unwrap();
        for (tool, end) in [
            (ToolKind::Pen, Pos2::new(30.0, 30.0)),
            (ToolKind::Highlighter, Pos2::new(40.0, 10.0)),
            (ToolKind::Arrow, Pos2::new(45.0, 45.0)),
            (ToolKind::Rectangle, Pos2::new(0.0, 0.0)),
            (ToolKind::Circle, Pos2::new(20.0, 20.0)),
        ] {
            host.tools.set_tool(tool, &mut host.editor);
            host.tools
                .begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut host.editor);
            host.tools.extend(end, &mut host.editor);
            host.tools.end(&mut host.editor);
        }
        host.tools.set_tool(ToolKind::Text, &mut host.editor);
        host.tools
            .begin(Pos2::new(5.0, 5.0), PointerTarget::Image, &mut host.editor);
        host.tools.confirm_text("note", &mut host.editor);
        host
    }

    #[test]
    fn renders_every_shape_kind() {
        let ctx = egui::Context::default();
        let host = populated_host();
        let mut renderer = Renderer::new();
        let _ = ctx.run(Default::default(), |ctx| {
            let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::splat(50.0));
            let painter = Painter::new(ctx.clone(), egui::LayerId::background(), rect);
            renderer.render(ctx, &painter, rect, &host, None);
        });
        assert_eq!(renderer.textures().uploads(), 1);
        assert_eq!(host.editor.document().len(), 6);
    }

    #[test]
    fn highlighter_shows_translucent_on_screen() {
        let host = populated_host();
        let highlighter = host
            .editor
            .document()
            .shapes()
            .iter()
            .find(|shape| shape.tool() == ToolKind::Highlighter)
            .unwrap();
        let stroke = screen_stroke(highlighter);
        assert!(!stroke.color.is_opaque());
        assert_eq!(stroke.width, highlighter.stroke_width());

        let pen = &host.editor.document().shapes()[0];
        assert!(screen_stroke(pen).color.is_opaque());
    }

    #[test]
    fn renders_without_screenshot() {
        let ctx = egui::Context::default();
        let host = CanvasHost::new(&EditorConfig::default());
        let mut renderer = Renderer::new();
        let _ = ctx.run(Default::default(), |ctx| {
            let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(100.0));
            let painter = Painter::new(ctx.clone(), egui::LayerId::background(), rect);
            renderer.render(ctx, &painter, rect, &host, None);
        });
        assert_eq!(renderer.textures().uploads(), 0);
    }
}
