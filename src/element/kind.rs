use serde::{Deserialize, Serialize};

/// Interaction mode of the editor, also used as the tag of the shape it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// Selection marker. Picks and transforms shapes; never tags a committed shape.
    Select,
    #[default]
    Pen,
    Highlighter,
    Arrow,
    Rectangle,
    Circle,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Arrow,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
    ];

    /// Tag written on shapes created with this tool.
    pub fn tag(self) -> &'static str {
        match self {
            ToolKind::Select => "selection-marker",
            ToolKind::Pen => "freehand-stroke",
            ToolKind::Highlighter => "highlighter-stroke",
            ToolKind::Arrow => "arrow",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Arrow => "Arrow",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Text => "Text",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ToolKind::Select => "⬚",
            ToolKind::Pen => "✏",
            ToolKind::Highlighter => "🖍",
            ToolKind::Arrow => "➡",
            ToolKind::Rectangle => "▭",
            ToolKind::Circle => "○",
            ToolKind::Text => "T",
        }
    }

    /// Freehand-style tools that accumulate points while dragging.
    pub fn is_stroke(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Highlighter)
    }
}
