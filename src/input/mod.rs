use egui::{Context, PointerButton, Pos2, Rect};

mod router;
pub use router::route_event;

/// Pointer input on the canvas, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas
    PointerDown { position: Pos2 },
    /// Pointer moved; `keep_aspect` is set while Shift is held
    PointerMove { position: Pos2, keep_aspect: bool },
    /// Primary button released after a press that started on the canvas
    PointerUp { position: Pos2 },
    /// Pointer left the window in the middle of a gesture
    PointerLeave,
}

/// What egui reported about the pointer this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSnapshot {
    pub hover_pos: Option<Pos2>,
    pub pressed: bool,
    pub released: bool,
    pub shift: bool,
}

impl PointerSnapshot {
    pub fn capture(ctx: &Context) -> Self {
        ctx.input(|input| Self {
            hover_pos: input.pointer.hover_pos(),
            pressed: input.pointer.button_pressed(PointerButton::Primary),
            released: input.pointer.button_released(PointerButton::Primary),
            shift: input.modifiers.shift,
        })
    }
}

/// Converts raw egui input into canvas events.
///
/// A gesture belongs to the canvas when its press lands there; its moves
/// and release are then reported wherever the pointer goes.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    gesture_active: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture_active
    }

    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect, canvas_hovered: bool) -> Vec<InputEvent> {
        self.process(PointerSnapshot::capture(ctx), canvas_rect, canvas_hovered)
    }

    /// `canvas_rect` is the screen rect of the canvas; `canvas_hovered` is
    /// false while another widget covers it.
    pub fn process(
        &mut self,
        snapshot: PointerSnapshot,
        canvas_rect: Rect,
        canvas_hovered: bool,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let to_canvas = |pos: Pos2| (pos - canvas_rect.min).to_pos2();

        match snapshot.hover_pos {
            Some(pos) => {
                if snapshot.pressed && canvas_hovered && canvas_rect.contains(pos) {
                    self.gesture_active = true;
                    events.push(InputEvent::PointerDown {
                        position: to_canvas(pos),
                    });
                } else if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        position: to_canvas(pos),
                        keep_aspect: snapshot.shift,
                    });
                }
                if snapshot.released && self.gesture_active {
                    self.gesture_active = false;
                    events.push(InputEvent::PointerUp {
                        position: to_canvas(pos),
                    });
                }
                self.last_pointer_pos = Some(pos);
            }
            None => {
                if self.gesture_active {
                    self.gesture_active = false;
                    events.push(InputEvent::PointerLeave);
                }
                self.last_pointer_pos = None;
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::new(100.0, 50.0), vec2(400.0, 300.0))
    }

    fn at(x: f32, y: f32) -> PointerSnapshot {
        PointerSnapshot {
            hover_pos: Some(Pos2::new(x, y)),
            ..Default::default()
        }
    }

    #[test]
    fn drag_is_reported_in_canvas_space() {
        let mut input = InputHandler::new();
        let down = input.process(PointerSnapshot { pressed: true, ..at(110.0, 60.0) }, canvas(), true);
        assert_eq!(down, vec![InputEvent::PointerDown { position: Pos2::new(10.0, 10.0) }]);

        let moved = input.process(at(120.0, 70.0), canvas(), true);
        assert_eq!(
            moved,
            vec![InputEvent::PointerMove {
                position: Pos2::new(20.0, 20.0),
                keep_aspect: false
            }]
        );

        // Released outside the canvas still ends the gesture.
        let up = input.process(PointerSnapshot { released: true, ..at(700.0, 70.0) }, canvas(), false);
        assert_eq!(up.last(), Some(&InputEvent::PointerUp { position: Pos2::new(600.0, 20.0) }));
        assert!(!input.gesture_active());
    }

    #[test]
    fn press_outside_canvas_is_ignored() {
        let mut input = InputHandler::new();
        let events = input.process(PointerSnapshot { pressed: true, ..at(10.0, 10.0) }, canvas(), true);
        assert!(!events.iter().any(|e| matches!(e, InputEvent::PointerDown { .. })));
        let events = input.process(PointerSnapshot { released: true, ..at(10.0, 10.0) }, canvas(), true);
        assert!(events.is_empty());
    }

    #[test]
    fn covered_canvas_does_not_start_gestures() {
        let mut input = InputHandler::new();
        let events = input.process(PointerSnapshot { pressed: true, ..at(110.0, 60.0) }, canvas(), false);
        assert!(!input.gesture_active());
        assert!(!events.iter().any(|e| matches!(e, InputEvent::PointerDown { .. })));
    }

    #[test]
    fn leaving_mid_gesture_ends_it() {
        let mut input = InputHandler::new();
        input.process(PointerSnapshot { pressed: true, ..at(110.0, 60.0) }, canvas(), true);
        let events = input.process(PointerSnapshot::default(), canvas(), true);
        assert_eq!(events, vec![InputEvent::PointerLeave]);
    }
}
