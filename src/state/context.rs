/// The annotation model behind the editor canvas: interaction state,
/// committed shapes, selection and the event bus that observes them.
///
/// Every mutation goes through a method here and emits exactly the events
/// describing it, so subscribers (repaint scheduling, auto-export) never miss
/// a change.
use log::{debug, info};

use super::EditorState;
use crate::document::Document;
use crate::element::{Shape, ShapeId};
use crate::event::{EditorEvent, EventBus};
use crate::selection::SelectionManager;

/// Errors that can occur during state transitions.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

#[derive(Debug, Default)]
pub struct EditorContext {
    pub(crate) state: EditorState,
    pub(crate) document: Document,
    pub(crate) selection: SelectionManager,
    pub event_bus: EventBus,
}

impl EditorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    /// Attempts to transition to a new state, validating the transition.
    pub fn transition_to(&mut self, new_state: EditorState) -> Result<(), StateTransitionError> {
        if !self.state.can_transition_to(&new_state) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.state.name(),
                to: new_state.name(),
            });
        }
        self.state = new_state;
        self.event_bus.emit(EditorEvent::PreviewChanged);
        Ok(())
    }

    /// Buffer of the pending text entry, bound to the on-canvas text field.
    pub fn pending_text_mut(&mut self) -> Option<&mut String> {
        self.state.pending_text_mut()
    }

    /// Drop any in-progress shape or pending text without committing it.
    pub fn return_to_idle(&mut self) {
        if !self.state.is_idle() {
            self.state = EditorState::Idle;
            self.event_bus.emit(EditorEvent::PreviewChanged);
        }
    }

    /// Append a finished shape to the document.
    pub fn commit(&mut self, shape: Shape) {
        debug!("Committing {} {}", shape.tool().tag(), shape.id());
        self.selection.register(shape.id());
        self.document.push(shape);
        self.emit_shapes_changed();
    }

    /// Remove the most recent shape. Clears the selection either way.
    ///
    /// While a shape is being drawn it is the most recent one, so it is
    /// dropped from the slot and the document is left alone.
    pub fn undo(&mut self) -> Option<Shape> {
        if self.state.is_drawing() {
            let EditorState::Drawing { shape } = std::mem::take(&mut self.state) else {
                return None;
            };
            info!("Undo dropped in-progress {} {}", shape.tool().tag(), shape.id());
            self.event_bus.emit(EditorEvent::PreviewChanged);
            return Some(shape);
        }

        let removed = self.document.pop();
        let mut deselected = false;
        if let Some(shape) = &removed {
            info!("Undo removed {} {}", shape.tool().tag(), shape.id());
            deselected = self.selection.unregister(shape.id());
        }
        if self.selection.clear() || deselected {
            self.event_bus
                .emit(EditorEvent::SelectionChanged { selected: None });
        }
        if removed.is_some() {
            self.emit_shapes_changed();
        }
        removed
    }

    /// Remove every shape. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.document.clear();
        self.selection.clear_handles();
        self.event_bus
            .emit(EditorEvent::SelectionChanged { selected: None });
        if count > 0 {
            info!("Cleared {} shapes", count);
            self.emit_shapes_changed();
        }
        count
    }

    /// Remove the selected shape, if any, and clear the selection.
    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selection.selected().cloned()?;
        let removed = self.document.remove(&id);
        self.selection.unregister(&id);
        self.event_bus
            .emit(EditorEvent::SelectionChanged { selected: None });
        if removed.is_some() {
            info!("Deleted shape {}", id);
            self.emit_shapes_changed();
        }
        removed
    }

    /// Select a committed shape. Selecting another one replaces it.
    pub fn select(&mut self, id: &ShapeId) -> bool {
        let changed = self.selection.select(id);
        if changed {
            self.event_bus.emit(EditorEvent::SelectionChanged {
                selected: Some(id.clone()),
            });
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.event_bus
                .emit(EditorEvent::SelectionChanged { selected: None });
        }
        changed
    }

    /// Swap in a transformed copy of a committed shape.
    pub fn apply_transform(&mut self, shape: Shape) -> bool {
        let id = shape.id().clone();
        let replaced = self.document.replace(shape);
        if replaced {
            self.event_bus.emit(EditorEvent::ShapeTransformed { id });
        }
        replaced
    }

    /// Forget everything: shapes, handles, selection and in-progress work.
    pub fn reset(&mut self) {
        self.state = EditorState::Idle;
        self.document.clear();
        self.selection.clear_handles();
        self.selection.attach_overlay();
    }

    fn emit_shapes_changed(&self) {
        self.event_bus.emit(EditorEvent::ShapesChanged {
            count: self.document.len(),
        });
    }
}
