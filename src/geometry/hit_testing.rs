use egui::{Pos2, Rect};

use crate::element::{rotate_point, Shape};
use crate::gizmo::GizmoHandle;

/// Pick radius around a transform handle.
pub const RESIZE_HANDLE_RADIUS: f32 = 8.0;
/// Distance of the rotate handle above the top edge.
pub const ROTATION_HANDLE_OFFSET: f32 = 30.0;
/// Gap between a shape's bounds and its overlay frame.
pub const OVERLAY_PADDING: f32 = 6.0;

/// Frame drawn around a selected shape, in unrotated shape space.
pub fn overlay_frame(shape: &Shape) -> Rect {
    shape.rect().expand(OVERLAY_PADDING)
}

/// Screen positions of every transform handle, following the shape's rotation.
pub fn handle_positions(shape: &Shape) -> [(GizmoHandle, Pos2); 6] {
    let frame = overlay_frame(shape);
    let center = frame.center();
    let angle = shape.rotation();
    let place = |p: Pos2| rotate_point(p, center, angle);
    [
        (GizmoHandle::Move, center),
        (GizmoHandle::ScaleTopLeft, place(frame.left_top())),
        (GizmoHandle::ScaleTopRight, place(frame.right_top())),
        (GizmoHandle::ScaleBottomLeft, place(frame.left_bottom())),
        (GizmoHandle::ScaleBottomRight, place(frame.right_bottom())),
        (
            GizmoHandle::Rotate,
            place(Pos2::new(center.x, frame.min.y - ROTATION_HANDLE_OFFSET)),
        ),
    ]
}

/// The handle under `pos`, if any. Corner and rotate handles win over the
/// move handle; anywhere on the shape body also counts as a move.
pub fn handle_at(shape: &Shape, pos: Pos2) -> Option<GizmoHandle> {
    let positions = handle_positions(shape);
    let picked = positions
        .iter()
        .filter(|(handle, _)| *handle != GizmoHandle::Move)
        .find(|(_, p)| p.distance(pos) <= RESIZE_HANDLE_RADIUS)
        .map(|(handle, _)| *handle);

    picked.or_else(|| shape.hit_test(pos).then_some(GizmoHandle::Move))
}

/// The topmost shape under `pos`. Later shapes draw on top, so search from the back.
pub fn topmost_shape_at(shapes: &[Shape], pos: Pos2) -> Option<&Shape> {
    shapes.iter().rev().find(|shape| shape.hit_test(pos))
}
