use crate::element::{ShapeId, ToolKind};

/// Everything that changes what the canvas shows.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A new screenshot replaced the previous one; shapes and selection were reset.
    ScreenshotLoaded {
        width: u32,
        height: u32,
        scale: f32,
    },
    /// The committed shape list changed (commit, undo, clear, delete).
    ShapesChanged { count: usize },
    /// A committed shape was moved, resized or rotated through its overlay.
    ShapeTransformed { id: ShapeId },
    /// The in-progress shape or pending text entry changed.
    PreviewChanged,
    ToolChanged { old: ToolKind, new: ToolKind },
    /// Color or stroke width changed.
    StyleChanged,
    SelectionChanged { selected: Option<ShapeId> },
    /// The pointer was released and no shape is being drawn any more.
    DrawingFinished,
}

impl EditorEvent {
    /// Whether the event alters the content that gets exported.
    pub fn changes_shape_list(&self) -> bool {
        matches!(
            self,
            EditorEvent::ShapesChanged { .. } | EditorEvent::ShapeTransformed { .. }
        )
    }
}
