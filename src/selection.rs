use std::collections::HashMap;

use crate::element::ShapeId;
use crate::gizmo::TransformGizmo;

/// Tracks the (single) selected shape and the renderable handle of every
/// committed shape.
///
/// Each committed shape gets an `egui::Id` registered here; the transform
/// overlay looks its target up through this map instead of walking the
/// rendered scene.
#[derive(Debug, Default)]
pub struct SelectionManager {
    handles: HashMap<ShapeId, egui::Id>,
    selected: Option<ShapeId>,
    gizmo: Option<TransformGizmo>,
    overlay_detached: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the renderable handle of a newly committed shape.
    pub fn register(&mut self, id: &ShapeId) -> egui::Id {
        let handle = egui::Id::new(("shape", id.as_str()));
        self.handles.insert(id.clone(), handle);
        handle
    }

    /// Drop the handle of a removed shape, deselecting it if needed.
    /// Returns true if the selection was cleared as a result.
    pub fn unregister(&mut self, id: &ShapeId) -> bool {
        self.handles.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.clear()
        } else {
            false
        }
    }

    pub fn clear_handles(&mut self) {
        self.handles.clear();
        self.clear();
    }

    pub fn handle_for(&self, id: &ShapeId) -> Option<egui::Id> {
        self.handles.get(id).copied()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Select `id`, detaching the overlay from any previous selection.
    /// Unknown ids are refused.
    pub fn select(&mut self, id: &ShapeId) -> bool {
        if !self.handles.contains_key(id) {
            log::warn!("Refusing to select unknown shape {}", id);
            return false;
        }
        if self.selected.as_ref() == Some(id) {
            return false;
        }
        self.selected = Some(id.clone());
        self.gizmo = Some(TransformGizmo::new(id.clone()));
        true
    }

    /// Clear the selection. Returns true if something was selected.
    pub fn clear(&mut self) -> bool {
        self.gizmo = None;
        self.selected.take().is_some()
    }

    pub fn selected(&self) -> Option<&ShapeId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &ShapeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// The overlay of the current selection, unless detached for export.
    pub fn gizmo(&self) -> Option<&TransformGizmo> {
        if self.overlay_detached {
            None
        } else {
            self.gizmo.as_ref()
        }
    }

    pub fn gizmo_mut(&mut self) -> Option<&mut TransformGizmo> {
        if self.overlay_detached {
            None
        } else {
            self.gizmo.as_mut()
        }
    }

    /// Hide the overlay without losing the selection.
    pub fn detach_overlay(&mut self) {
        self.overlay_detached = true;
        if let Some(gizmo) = &mut self.gizmo {
            gizmo.end_drag();
        }
    }

    pub fn attach_overlay(&mut self) {
        self.overlay_detached = false;
    }

    pub fn overlay_detached(&self) -> bool {
        self.overlay_detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_b_replaces_a() {
        let mut selection = SelectionManager::new();
        let a = ShapeId::from("a");
        let b = ShapeId::from("b");
        selection.register(&a);
        selection.register(&b);

        assert!(selection.select(&a));
        assert!(selection.select(&b));
        assert_eq!(selection.selected(), Some(&b));
        assert!(!selection.is_selected(&a));
        assert_eq!(selection.gizmo().map(|g| g.shape_id()), Some(&b));
    }

    #[test]
    fn unregister_selected_clears_selection() {
        let mut selection = SelectionManager::new();
        let a = ShapeId::from("a");
        selection.register(&a);
        selection.select(&a);
        assert!(selection.unregister(&a));
        assert!(selection.selected().is_none());
        assert!(selection.handle_for(&a).is_none());
    }

    #[test]
    fn detached_overlay_keeps_selection() {
        let mut selection = SelectionManager::new();
        let a = ShapeId::from("a");
        selection.register(&a);
        selection.select(&a);
        selection.detach_overlay();
        assert!(selection.gizmo().is_none());
        assert_eq!(selection.selected(), Some(&a));
        selection.attach_overlay();
        assert!(selection.gizmo().is_some());
    }

    #[test]
    fn unknown_shape_is_not_selected() {
        let mut selection = SelectionManager::new();
        assert!(!selection.select(&ShapeId::from("ghost")));
        assert!(selection.selected().is_none());
    }
}
