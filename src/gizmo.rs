use egui::{Painter, Pos2, Rect, Stroke, Vec2};

use crate::element::{rotate_point, Shape, ShapeId};
use crate::geometry::hit_testing::{handle_positions, overlay_frame};
use crate::widgets::resize_handle::{self, ResizeHandle, HANDLE_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoHandle {
    Move,
    ScaleTopLeft,
    ScaleTopRight,
    ScaleBottomLeft,
    ScaleBottomRight,
    Rotate,
}

impl GizmoHandle {
    /// Corner that stays put while this handle scales the shape.
    fn fixed_corner(self, frame: Rect) -> Option<Pos2> {
        match self {
            GizmoHandle::ScaleTopLeft => Some(frame.right_bottom()),
            GizmoHandle::ScaleTopRight => Some(frame.left_bottom()),
            GizmoHandle::ScaleBottomLeft => Some(frame.right_top()),
            GizmoHandle::ScaleBottomRight => Some(frame.left_top()),
            GizmoHandle::Move | GizmoHandle::Rotate => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    handle: GizmoHandle,
    start: Pos2,
    initial: Shape,
}

/// Resize/rotate/move overlay attached to the selected shape.
///
/// Dragging a handle rewrites the shape's geometry directly; it never goes
/// through the tool controller.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    shape_id: ShapeId,
    active: Option<ActiveDrag>,
}

impl TransformGizmo {
    pub fn new(shape_id: ShapeId) -> Self {
        Self {
            shape_id,
            active: None,
        }
    }

    pub fn shape_id(&self) -> &ShapeId {
        &self.shape_id
    }

    pub fn active_handle(&self) -> Option<GizmoHandle> {
        self.active.as_ref().map(|drag| drag.handle)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Remember the shape as it was when `handle` was grabbed at `pointer`.
    pub fn begin_drag(&mut self, handle: GizmoHandle, pointer: Pos2, shape: &Shape) {
        self.active = Some(ActiveDrag {
            handle,
            start: pointer,
            initial: shape.clone(),
        });
    }

    /// The shape transformed for the pointer now being at `pointer`.
    ///
    /// Always derived from the shape captured at drag start, so repeated calls
    /// do not accumulate rounding errors.
    pub fn drag_to(&self, pointer: Pos2, keep_aspect: bool) -> Option<Shape> {
        let drag = self.active.as_ref()?;
        Some(apply_drag(
            &drag.initial,
            drag.handle,
            drag.start,
            pointer,
            keep_aspect,
        ))
    }

    /// Finish the current drag. Returns true if one was active.
    pub fn end_drag(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Draw the frame and handles. `offset` maps canvas space to screen space.
    pub fn paint(&self, painter: &Painter, shape: &Shape, offset: Vec2, hovered: Option<GizmoHandle>) {
        let frame = overlay_frame(shape);
        let center = frame.center();
        let corners: Vec<Pos2> = [
            frame.left_top(),
            frame.right_top(),
            frame.right_bottom(),
            frame.left_bottom(),
        ]
        .into_iter()
        .map(|p| rotate_point(p, center, shape.rotation()) + offset)
        .collect();

        painter.add(egui::Shape::closed_line(
            corners,
            Stroke::new(1.0, HANDLE_COLOR),
        ));

        let handles = handle_positions(shape);
        let top_mid = rotate_point(Pos2::new(center.x, frame.min.y), center, shape.rotation());
        if let Some((_, rotate_pos)) = handles.iter().find(|(h, _)| *h == GizmoHandle::Rotate) {
            painter.line_segment(
                [top_mid + offset, *rotate_pos + offset],
                Stroke::new(1.0, HANDLE_COLOR),
            );
        }

        for (handle, pos) in handles {
            let highlighted = hovered == Some(handle) || self.active_handle() == Some(handle);
            ResizeHandle::new(handle, pos + offset, highlighted).paint(painter);
        }
    }

    pub fn cursor_for(handle: GizmoHandle) -> egui::CursorIcon {
        resize_handle::cursor_for(handle)
    }
}

/// Pure transform math behind a handle drag.
pub fn apply_drag(
    initial: &Shape,
    handle: GizmoHandle,
    start: Pos2,
    current: Pos2,
    keep_aspect: bool,
) -> Shape {
    let mut shape = initial.clone();
    let frame = overlay_frame(initial);
    let center = frame.center();

    match handle {
        GizmoHandle::Move => {
            shape.translate(current - start);
        }
        GizmoHandle::Rotate => {
            let initial_vec = start - center;
            let current_vec = current - center;
            let initial_angle = initial_vec.y.atan2(initial_vec.x);
            let current_angle = current_vec.y.atan2(current_vec.x);

            let mut angle_delta = current_angle - initial_angle;
            if angle_delta > std::f32::consts::PI {
                angle_delta -= 2.0 * std::f32::consts::PI;
            } else if angle_delta < -std::f32::consts::PI {
                angle_delta += 2.0 * std::f32::consts::PI;
            }
            shape.set_rotation(initial.rotation() + angle_delta);
        }
        _ => {
            let Some(fixed) = handle.fixed_corner(frame) else {
                return shape;
            };
            // Work in the shape's unrotated frame.
            let local_start = rotate_point(start, center, -initial.rotation());
            let local_current = rotate_point(current, center, -initial.rotation());
            let dragged_corner = match handle {
                GizmoHandle::ScaleTopLeft => frame.left_top(),
                GizmoHandle::ScaleTopRight => frame.right_top(),
                GizmoHandle::ScaleBottomLeft => frame.left_bottom(),
                _ => frame.right_bottom(),
            };
            let mut new_corner = dragged_corner + (local_current - local_start);

            if keep_aspect {
                let initial_vec = dragged_corner - fixed;
                let current_vec = new_corner - fixed;
                let scale = (current_vec.x / initial_vec.x)
                    .abs()
                    .max((current_vec.y / initial_vec.y).abs());
                if scale.is_finite() {
                    new_corner = fixed + initial_vec * scale;
                }
            }

            let new_frame = Rect::from_two_pos(fixed, new_corner);
            let pad = frame.width() - initial.rect().width();
            let new_bounds = new_frame.shrink(pad / 2.0);
            if shape.resize(new_bounds).is_err() {
                log::debug!("Ignoring resize of {} below minimum size", initial.id());
                return initial.clone();
            }
        }
    }
    shape
}
