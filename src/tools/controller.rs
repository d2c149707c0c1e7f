use egui::{Color32, Pos2};
use log::{debug, info, warn};

use super::{PointerTarget, ToolKind, ToolSettings};
use crate::element::{factory, Geometry, Shape, ShapeId};
use crate::event::EditorEvent;
use crate::state::{EditorContext, EditorState};

/// Turns pointer gestures into shapes according to the active tool.
///
/// The controller owns only the tool settings. Everything it creates or
/// removes goes through [`EditorContext`], which emits the matching events.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    settings: ToolSettings,
}

impl ToolController {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn tool(&self) -> ToolKind {
        self.settings.tool
    }

    pub fn color(&self) -> Color32 {
        self.settings.color
    }

    pub fn stroke_width(&self) -> f32 {
        self.settings.stroke_width
    }

    /// Switch tools. Leaving the selection tool drops the selection, and a
    /// pending text entry is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind, ctx: &mut EditorContext) {
        let old = self.settings.tool;
        if old == tool {
            return;
        }
        if ctx.state().is_drawing() {
            self.end(ctx);
        }
        if ctx.state().is_entering_text() {
            ctx.return_to_idle();
        }
        if old == ToolKind::Select {
            ctx.clear_selection();
        }
        self.settings.tool = tool;
        info!("Tool changed from {} to {}", old.label(), tool.label());
        ctx.event_bus.emit(EditorEvent::ToolChanged { old, new: tool });
    }

    /// Affects shapes created from now on only.
    pub fn set_color(&mut self, color: Color32, ctx: &mut EditorContext) {
        if self.settings.color != color {
            self.settings.color = color;
            ctx.event_bus.emit(EditorEvent::StyleChanged);
        }
    }

    /// Affects shapes created from now on only. Non-positive widths are ignored.
    pub fn set_stroke_width(&mut self, width: f32, ctx: &mut EditorContext) {
        if !(width > 0.0) {
            warn!("Ignoring stroke width {}", width);
            return;
        }
        if self.settings.stroke_width != width {
            self.settings.stroke_width = width;
            ctx.event_bus.emit(EditorEvent::StyleChanged);
        }
    }

    /// Pointer went down at `pos` over `target`.
    pub fn begin(&mut self, pos: Pos2, target: PointerTarget, ctx: &mut EditorContext) {
        // A missed pointer-up still commits what was drawn.
        if ctx.state().is_drawing() {
            self.end(ctx);
        }

        // Clicking elsewhere with the text tool keeps what was already typed.
        if self.settings.tool == ToolKind::Text
            && ctx.state().pending_text().is_some_and(|(_, text)| !text.is_empty())
        {
            self.confirm_pending_text(ctx);
        }

        let settings = &self.settings;
        let seeded = match settings.tool {
            ToolKind::Select => {
                if matches!(target, PointerTarget::Empty | PointerTarget::Image) {
                    ctx.clear_selection();
                }
                return;
            }
            ToolKind::Text => {
                let state = EditorState::EnteringText {
                    position: pos,
                    buffer: String::new(),
                };
                if let Err(err) = ctx.transition_to(state) {
                    warn!("Cannot start text entry: {}", err);
                }
                return;
            }
            ToolKind::Pen => factory::stroke(ToolKind::Pen, pos, settings.color, settings.stroke_width),
            ToolKind::Highlighter => factory::stroke(
                ToolKind::Highlighter,
                pos,
                settings.highlighter_color(),
                settings.highlighter_width(),
            ),
            ToolKind::Arrow => factory::arrow(pos, settings.color, settings.stroke_width),
            ToolKind::Rectangle => factory::rectangle(pos, settings.color, settings.stroke_width),
            ToolKind::Circle => factory::circle(pos, settings.color, settings.stroke_width),
        };

        if ctx.state().is_entering_text() {
            ctx.return_to_idle();
        }
        debug!("Begin {} at {:?}", seeded.tool().tag(), pos);
        if let Err(err) = ctx.transition_to(EditorState::Drawing { shape: seeded }) {
            warn!("Cannot start drawing: {}", err);
        }
    }

    /// Pointer moved to `pos`. Does nothing unless a shape is being drawn.
    pub fn extend(&mut self, pos: Pos2, ctx: &mut EditorContext) {
        let Some(shape) = ctx.state.in_progress_shape_mut() else {
            return;
        };
        let tool = shape.tool();
        match (tool, shape.geometry_mut()) {
            (tool, Geometry::Points(points)) if tool.is_stroke() => points.push(pos),
            (ToolKind::Arrow, Geometry::Points(points)) => {
                points.truncate(1);
                points.push(pos);
            }
            (_, Geometry::Rect { origin, size }) => *size = pos - *origin,
            (_, Geometry::Circle { center, radius }) => *radius = center.distance(pos),
            (tool, geometry) => {
                warn!("Cannot extend {} with {} geometry", tool.tag(), geometry.name());
                return;
            }
        }
        ctx.event_bus.emit(EditorEvent::PreviewChanged);
    }

    /// Pointer released. Commits the in-progress shape as is; zero-extent
    /// shapes are kept.
    pub fn end(&mut self, ctx: &mut EditorContext) -> Option<ShapeId> {
        if !ctx.state().is_drawing() {
            return None;
        }
        let EditorState::Drawing { mut shape } = std::mem::take(&mut ctx.state) else {
            return None;
        };
        // A click without movement leaves a dot: two coincident points.
        if let Geometry::Points(points) = shape.geometry_mut() {
            if let [only] = points.as_slice() {
                let only = *only;
                points.push(only);
            }
        }
        let id = shape.id().clone();
        ctx.commit(shape);
        ctx.event_bus.emit(EditorEvent::DrawingFinished);
        Some(id)
    }

    /// Commit `text` at the pending position. Empty text creates nothing.
    /// The pending entry is cleared either way.
    pub fn confirm_text(&mut self, text: &str, ctx: &mut EditorContext) -> Option<ShapeId> {
        let (position, _) = ctx.state().pending_text()?;
        ctx.return_to_idle();
        if text.is_empty() {
            debug!("Discarding empty text entry");
            return None;
        }
        let shape = factory::text(
            position,
            text.to_owned(),
            self.settings.font_size(),
            self.settings.color,
            self.settings.stroke_width,
        );
        let id = shape.id().clone();
        ctx.commit(shape);
        Some(id)
    }

    /// Commit whatever has been typed into the pending entry.
    pub fn confirm_pending_text(&mut self, ctx: &mut EditorContext) -> Option<ShapeId> {
        let text = ctx.state().pending_text()?.1.to_owned();
        self.confirm_text(&text, ctx)
    }

    pub fn cancel_text(&mut self, ctx: &mut EditorContext) {
        if ctx.state().is_entering_text() {
            ctx.return_to_idle();
        }
    }

    /// A committed shape was clicked. Selects it when the selection tool is active.
    pub fn click_shape(&mut self, id: &ShapeId, ctx: &mut EditorContext) -> bool {
        self.settings.tool == ToolKind::Select && ctx.select(id)
    }

    pub fn undo(&mut self, ctx: &mut EditorContext) -> Option<Shape> {
        ctx.undo()
    }

    pub fn clear(&mut self, ctx: &mut EditorContext) -> usize {
        ctx.clear()
    }

    pub fn delete_selected(&mut self, ctx: &mut EditorContext) -> Option<Shape> {
        ctx.delete_selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn setup(tool: ToolKind) -> (ToolController, EditorContext) {
        let settings = ToolSettings {
            tool,
            color: Color32::from_rgb(255, 0, 0),
            stroke_width: 3.0,
            ..Default::default()
        };
        (ToolController::new(settings), EditorContext::new())
    }

    #[test]
    fn pen_gesture_keeps_every_point() {
        let (mut tools, mut ctx) = setup(ToolKind::Pen);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(20.0, 20.0), &mut ctx);
        tools.extend(Pos2::new(30.0, 10.0), &mut ctx);
        assert_eq!(ctx.document().len(), 0);
        tools.end(&mut ctx).unwrap();

        let shape = ctx.document().last().unwrap();
        assert_eq!(shape.tool(), ToolKind::Pen);
        assert_eq!(
            shape.points().unwrap(),
            &[Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0), Pos2::new(30.0, 10.0)]
        );
        assert_eq!(shape.color(), Color32::from_rgb(255, 0, 0));
        assert_eq!(shape.stroke_width(), 3.0);
        assert!(ctx.state().is_idle());
    }

    #[test]
    fn rectangle_dragged_up_left() {
        let (mut tools, mut ctx) = setup(ToolKind::Rectangle);
        tools.begin(Pos2::new(50.0, 50.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(30.0, 20.0), &mut ctx);
        tools.end(&mut ctx);

        let shape = ctx.document().last().unwrap();
        match shape.geometry() {
            Geometry::Rect { origin, size } => {
                assert_eq!(*origin, Pos2::new(50.0, 50.0));
                assert_eq!(*size, Vec2::new(-20.0, -30.0));
            }
            other => panic!("unexpected geometry {:?}", other),
        }
        let rect = shape.rect();
        assert_eq!(rect.min, Pos2::new(30.0, 20.0));
        assert_eq!(rect.size(), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn arrow_tracks_last_pointer() {
        let (mut tools, mut ctx) = setup(ToolKind::Arrow);
        tools.begin(Pos2::new(0.0, 0.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(5.0, 5.0), &mut ctx);
        tools.extend(Pos2::new(40.0, 10.0), &mut ctx);
        tools.end(&mut ctx);
        assert_eq!(
            ctx.document().last().unwrap().points().unwrap(),
            &[Pos2::new(0.0, 0.0), Pos2::new(40.0, 10.0)]
        );
    }

    #[test]
    fn circle_radius_is_distance() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(13.0, 14.0), &mut ctx);
        tools.end(&mut ctx);
        assert_eq!(
            ctx.document().last().unwrap().geometry(),
            &Geometry::Circle {
                center: Pos2::new(10.0, 10.0),
                radius: 5.0
            }
        );
    }

    #[test]
    fn zero_extent_shapes_are_committed() {
        let (mut tools, mut ctx) = setup(ToolKind::Rectangle);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        tools.end(&mut ctx);
        assert_eq!(ctx.document().len(), 1);
    }

    #[test]
    fn highlighter_uses_translucent_wide_stroke() {
        let (mut tools, mut ctx) = setup(ToolKind::Highlighter);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(20.0, 0.0), &mut ctx);
        tools.end(&mut ctx);
        let shape = ctx.document().last().unwrap();
        assert_eq!(shape.tool(), ToolKind::Highlighter);
        assert_eq!(shape.stroke_width(), 12.0);
        assert_eq!(shape.color().a(), 128);
    }

    #[test]
    fn click_without_move_leaves_two_point_stroke() {
        let (mut tools, mut ctx) = setup(ToolKind::Pen);
        tools.begin(Pos2::new(7.0, 7.0), PointerTarget::Image, &mut ctx);
        tools.end(&mut ctx);
        assert_eq!(
            ctx.document().last().unwrap().points().unwrap(),
            &[Pos2::new(7.0, 7.0), Pos2::new(7.0, 7.0)]
        );
    }

    #[test]
    fn extend_without_begin_is_ignored() {
        let (mut tools, mut ctx) = setup(ToolKind::Pen);
        tools.extend(Pos2::new(1.0, 1.0), &mut ctx);
        assert!(tools.end(&mut ctx).is_none());
        assert!(ctx.document().is_empty());
    }

    #[test]
    fn text_entry_commits_non_empty_text() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(100.0, 100.0), PointerTarget::Image, &mut ctx);
        assert!(ctx.state().is_entering_text());
        assert!(ctx.document().is_empty());

        tools.confirm_text("Hello", &mut ctx).unwrap();
        assert!(ctx.state().is_idle());
        let shape = ctx.document().last().unwrap();
        assert_eq!(
            shape.geometry(),
            &Geometry::Text {
                origin: Pos2::new(100.0, 100.0),
                text: "Hello".into(),
                font_size: 18.0,
            }
        );
    }

    #[test]
    fn empty_text_creates_nothing() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(100.0, 100.0), PointerTarget::Image, &mut ctx);
        assert!(tools.confirm_text("", &mut ctx).is_none());
        assert!(ctx.document().is_empty());
        assert!(ctx.state().is_idle());
    }

    #[test]
    fn typed_buffer_is_confirmed() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(5.0, 5.0), PointerTarget::Image, &mut ctx);
        ctx.state.pending_text_mut().unwrap().push_str("Hi");
        tools.confirm_pending_text(&mut ctx).unwrap();
        assert_eq!(ctx.document().len(), 1);
    }

    #[test]
    fn second_text_click_commits_typed_entry() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        ctx.state.pending_text_mut().unwrap().push_str("typed");
        tools.begin(Pos2::new(50.0, 50.0), PointerTarget::Image, &mut ctx);

        assert_eq!(ctx.document().len(), 1);
        assert_eq!(ctx.document().last().unwrap().rect().min, Pos2::new(10.0, 10.0));
        assert_eq!(ctx.state().pending_text(), Some((Pos2::new(50.0, 50.0), "")));
    }

    #[test]
    fn second_text_click_moves_empty_entry() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        tools.begin(Pos2::new(50.0, 50.0), PointerTarget::Image, &mut ctx);
        assert!(ctx.document().is_empty());
        assert_eq!(ctx.state().pending_text(), Some((Pos2::new(50.0, 50.0), "")));
    }

    #[test]
    fn undo_mid_drag_keeps_committed_shapes() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::new(10.0, 10.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(20.0, 10.0), &mut ctx);
        let first = tools.end(&mut ctx).unwrap();

        tools.begin(Pos2::new(100.0, 100.0), PointerTarget::Image, &mut ctx);
        tools.extend(Pos2::new(120.0, 100.0), &mut ctx);
        tools.undo(&mut ctx).unwrap();
        assert!(tools.end(&mut ctx).is_none());

        assert_eq!(ctx.document().len(), 1);
        assert_eq!(ctx.document().shapes()[0].id(), &first);
    }

    #[test]
    fn changing_tool_cancels_pending_text() {
        let (mut tools, mut ctx) = setup(ToolKind::Text);
        tools.begin(Pos2::new(5.0, 5.0), PointerTarget::Image, &mut ctx);
        tools.set_tool(ToolKind::Pen, &mut ctx);
        assert!(ctx.state().is_idle());
        assert!(ctx.document().is_empty());
    }

    #[test]
    fn undo_removes_from_tail_until_empty() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        for i in 0..3 {
            tools.begin(Pos2::new(i as f32 * 10.0, 0.0), PointerTarget::Image, &mut ctx);
            tools.end(&mut ctx);
        }
        let first = ctx.document().shapes()[0].id().clone();
        for _ in 0..2 {
            tools.undo(&mut ctx);
        }
        assert_eq!(ctx.document().len(), 1);
        assert_eq!(ctx.document().shapes()[0].id(), &first);
        for _ in 0..5 {
            tools.undo(&mut ctx);
        }
        assert!(ctx.document().is_empty());
    }

    #[test]
    fn delete_without_selection_leaves_shapes() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        tools.end(&mut ctx);
        assert!(tools.delete_selected(&mut ctx).is_none());
        assert_eq!(ctx.document().len(), 1);
    }

    #[test]
    fn selection_tool_selects_and_clears() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        let id = tools.end(&mut ctx).unwrap();

        assert!(!tools.click_shape(&id, &mut ctx));
        tools.set_tool(ToolKind::Select, &mut ctx);
        assert!(tools.click_shape(&id, &mut ctx));
        assert_eq!(ctx.selection().selected(), Some(&id));

        tools.begin(Pos2::new(500.0, 500.0), PointerTarget::Shape(id.clone()), &mut ctx);
        assert_eq!(ctx.selection().selected(), Some(&id));
        tools.begin(Pos2::new(500.0, 500.0), PointerTarget::Empty, &mut ctx);
        assert!(ctx.selection().selected().is_none());
        assert_eq!(ctx.document().len(), 1);
    }

    #[test]
    fn leaving_select_clears_selection() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        let id = tools.end(&mut ctx).unwrap();
        tools.set_tool(ToolKind::Select, &mut ctx);
        tools.click_shape(&id, &mut ctx);
        tools.set_tool(ToolKind::Pen, &mut ctx);
        assert!(ctx.selection().selected().is_none());
    }

    #[test]
    fn style_changes_apply_to_new_shapes_only() {
        let (mut tools, mut ctx) = setup(ToolKind::Circle);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        tools.end(&mut ctx);
        tools.set_color(Color32::BLUE, &mut ctx);
        tools.set_stroke_width(0.0, &mut ctx);
        tools.begin(Pos2::ZERO, PointerTarget::Image, &mut ctx);
        tools.end(&mut ctx);
        let shapes = ctx.document().shapes();
        assert_eq!(shapes[0].color(), Color32::from_rgb(255, 0, 0));
        assert_eq!(shapes[1].color(), Color32::BLUE);
        assert_eq!(shapes[1].stroke_width(), 3.0);
    }
}
