use crate::canvas::CanvasHost;

use super::InputEvent;

/// Hand a canvas input event to the canvas host.
pub fn route_event(event: &InputEvent, host: &mut CanvasHost) {
    match *event {
        InputEvent::PointerDown { position } => host.pointer_down(position),
        InputEvent::PointerMove {
            position,
            keep_aspect,
        } => host.pointer_move(position, keep_aspect),
        InputEvent::PointerUp { .. } | InputEvent::PointerLeave => host.pointer_up(),
    }
}
