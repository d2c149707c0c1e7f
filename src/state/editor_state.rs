/// Interaction state of the editor canvas.
///
/// The shape being drawn lives here, in its own slot, and only reaches the
/// document when the pointer is released. Pending text entry is likewise held
/// here until confirmed.
///
/// ```text
///            begin (draw tool)            end
///   Idle ───────────────────────► Drawing ─────► Idle (shape committed)
///    │
///    │ begin (text tool)        confirm / cancel
///    └────────────────────► EnteringText ───────► Idle
/// ```
use egui::Pos2;

use crate::element::Shape;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    /// No active operation
    #[default]
    Idle,
    /// A pointer is down and `shape` follows it
    Drawing { shape: Shape },
    /// Waiting for the user to type text that will be placed at `position`
    EnteringText { position: Pos2, buffer: String },
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        match (self, new_state) {
            (EditorState::Idle, _) => true,
            // The in-progress shape is replaced on every pointer move.
            (EditorState::Drawing { .. }, EditorState::Drawing { .. }) => true,
            (EditorState::Drawing { .. }, EditorState::Idle) => true,
            (EditorState::EnteringText { .. }, EditorState::Idle) => true,
            // A second click while typing moves the pending entry.
            (EditorState::EnteringText { .. }, EditorState::EnteringText { .. }) => true,
            _ => false,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    /// Returns true between a pointer-down and its pointer-up for drawing tools
    pub fn is_drawing(&self) -> bool {
        matches!(self, EditorState::Drawing { .. })
    }

    pub fn is_entering_text(&self) -> bool {
        matches!(self, EditorState::EnteringText { .. })
    }

    pub fn in_progress_shape(&self) -> Option<&Shape> {
        match self {
            EditorState::Drawing { shape } => Some(shape),
            _ => None,
        }
    }

    pub fn in_progress_shape_mut(&mut self) -> Option<&mut Shape> {
        match self {
            EditorState::Drawing { shape } => Some(shape),
            _ => None,
        }
    }

    pub fn pending_text(&self) -> Option<(Pos2, &str)> {
        match self {
            EditorState::EnteringText { position, buffer } => Some((*position, buffer.as_str())),
            _ => None,
        }
    }

    pub fn pending_text_mut(&mut self) -> Option<&mut String> {
        match self {
            EditorState::EnteringText { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Drawing { .. } => "Drawing",
            EditorState::EnteringText { .. } => "EnteringText",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::Color32;

    #[test]
    fn drawing_cannot_jump_to_text_entry() {
        let drawing = EditorState::Drawing {
            shape: factory::circle(Pos2::ZERO, Color32::RED, 2.0),
        };
        let text = EditorState::EnteringText {
            position: Pos2::ZERO,
            buffer: String::new(),
        };
        assert!(!drawing.can_transition_to(&text));
        assert!(!text.can_transition_to(&drawing));
        assert!(drawing.can_transition_to(&EditorState::Idle));
    }
}
