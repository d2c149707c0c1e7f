use egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke, Vec2};

use crate::gizmo::GizmoHandle;

pub const HANDLE_SIZE: f32 = 8.0;
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
const HANDLE_HOVER_COLOR: Color32 = Color32::from_rgb(135, 206, 250);
const HANDLE_STROKE_WIDTH: f32 = 2.0;

/// One grabbable knob of the transform overlay, in screen space.
#[derive(Debug, Clone, Copy)]
pub struct ResizeHandle {
    handle: GizmoHandle,
    position: Pos2,
    highlighted: bool,
}

impl ResizeHandle {
    pub fn new(handle: GizmoHandle, position: Pos2, highlighted: bool) -> Self {
        Self {
            handle,
            position,
            highlighted,
        }
    }

    pub fn handle(&self) -> GizmoHandle {
        self.handle
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn color(&self) -> Color32 {
        if self.highlighted {
            HANDLE_HOVER_COLOR
        } else {
            HANDLE_COLOR
        }
    }

    /// Corners are square knobs, the rotate handle is a ring. The move
    /// handle covers the whole frame and draws nothing.
    pub fn paint(&self, painter: &Painter) {
        match self.handle {
            GizmoHandle::Move => {}
            GizmoHandle::Rotate => {
                painter.circle_stroke(
                    self.position,
                    HANDLE_SIZE / 2.0,
                    Stroke::new(HANDLE_STROKE_WIDTH, self.color()),
                );
            }
            _ => {
                let rect = Rect::from_center_size(self.position, Vec2::splat(HANDLE_SIZE));
                painter.rect_filled(rect, 1.0, self.color());
                painter.rect_stroke(rect, 1.0, Stroke::new(1.0, Color32::WHITE));
            }
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        cursor_for(self.handle)
    }
}

pub fn cursor_for(handle: GizmoHandle) -> CursorIcon {
    match handle {
        GizmoHandle::Move => CursorIcon::Move,
        GizmoHandle::Rotate => CursorIcon::Alias,
        GizmoHandle::ScaleTopLeft | GizmoHandle::ScaleBottomRight => CursorIcon::ResizeNwSe,
        GizmoHandle::ScaleTopRight | GizmoHandle::ScaleBottomLeft => CursorIcon::ResizeNeSw,
    }
}
