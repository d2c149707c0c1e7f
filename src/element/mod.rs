use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod common;
mod kind;

pub use common::{
    calculate_bounds, distance_to_line_segment, rotate_point, APPROX_CHAR_WIDTH, HIT_TOLERANCE,
    MIN_ELEMENT_SIZE,
};
pub use kind::ToolKind;

use crate::geometry::normalized_rect;

/// Errors raised when a shape is mutated into an invalid configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Element dimensions too small (min: {min}). Width: {width}, Height: {height}")]
    TooSmall { min: f32, width: f32, height: f32 },
    #[error("{tool} shapes cannot carry {geometry} geometry")]
    GeometryMismatch {
        tool: &'static str,
        geometry: &'static str,
    },
    #[error("Cannot resize an empty shape")]
    Empty,
}

/// Stable identifier of a committed shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Geometry carried by a shape. Which variant is allowed depends on the tool kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Ordered point sequence (freehand, highlighter, arrow).
    Points(Vec<Pos2>),
    /// Origin plus raw extent. The extent may be negative when dragged up or left.
    Rect { origin: Pos2, size: Vec2 },
    Circle { center: Pos2, radius: f32 },
    Text {
        origin: Pos2,
        text: String,
        font_size: f32,
    },
}

impl Geometry {
    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Points(_) => "points",
            Geometry::Rect { .. } => "rect",
            Geometry::Circle { .. } => "circle",
            Geometry::Text { .. } => "text",
        }
    }

    /// Whether this geometry is the one `tool` shapes carry.
    pub fn fits(&self, tool: ToolKind) -> bool {
        matches!(
            (tool, self),
            (ToolKind::Pen | ToolKind::Highlighter | ToolKind::Arrow, Geometry::Points(_))
                | (ToolKind::Rectangle, Geometry::Rect { .. })
                | (ToolKind::Circle, Geometry::Circle { .. })
                | (ToolKind::Text, Geometry::Text { .. })
        )
    }
}

/// One annotation primitive drawn over the screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    tool: ToolKind,
    geometry: Geometry,
    color: Color32,
    stroke_width: f32,
    /// Rotation in radians around the center of [`Shape::rect`].
    rotation: f32,
}

impl Shape {
    /// Create a shape, refusing geometry that does not belong to `tool`.
    pub fn new(
        tool: ToolKind,
        geometry: Geometry,
        color: Color32,
        stroke_width: f32,
    ) -> Result<Self, ShapeError> {
        if !geometry.fits(tool) {
            return Err(ShapeError::GeometryMismatch {
                tool: tool.tag(),
                geometry: geometry.name(),
            });
        }
        Ok(Self {
            id: ShapeId::new(),
            tool,
            geometry,
            color,
            stroke_width: stroke_width.max(f32::EPSILON),
            rotation: 0.0,
        })
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Replace the geometry in place. The kind of geometry may not change.
    pub fn set_geometry(&mut self, geometry: Geometry) -> Result<(), ShapeError> {
        if !geometry.fits(self.tool) {
            return Err(ShapeError::GeometryMismatch {
                tool: self.tool.tag(),
                geometry: geometry.name(),
            });
        }
        self.geometry = geometry;
        Ok(())
    }

    /// In-place access for the tool controller while the shape is being drawn.
    /// Callers edit fields of the current variant; they never swap variants.
    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Point sequence for strokes and arrows.
    pub fn points(&self) -> Option<&[Pos2]> {
        match &self.geometry {
            Geometry::Points(points) => Some(points),
            _ => None,
        }
    }

    /// Unrotated, normalized bounding rectangle.
    pub fn rect(&self) -> Rect {
        match &self.geometry {
            Geometry::Points(points) => calculate_bounds(points, 0.0),
            Geometry::Rect { origin, size } => normalized_rect(*origin, *size),
            Geometry::Circle { center, radius } => {
                Rect::from_center_size(*center, Vec2::splat(radius * 2.0))
            }
            Geometry::Text {
                origin,
                text,
                font_size,
            } => Rect::from_min_size(
                *origin,
                Vec2::new(
                    text.chars().count() as f32 * font_size * APPROX_CHAR_WIDTH,
                    *font_size,
                ),
            ),
        }
    }

    /// Test if the shape contains the given position
    pub fn hit_test(&self, pos: Pos2) -> bool {
        let bounds = self.rect();
        if bounds == Rect::NOTHING {
            return false;
        }
        // Undo the rotation so the tests below run in shape space.
        let pos = rotate_point(pos, bounds.center(), -self.rotation);
        let tolerance = self.stroke_width / 2.0 + HIT_TOLERANCE;

        match &self.geometry {
            Geometry::Points(points) => match points.as_slice() {
                [] => false,
                [only] => only.distance(pos) <= tolerance,
                _ => points
                    .windows(2)
                    .any(|pair| distance_to_line_segment(pos, pair[0], pair[1]) <= tolerance),
            },
            Geometry::Rect { .. } => bounds.expand(tolerance).contains(pos),
            Geometry::Circle { center, radius } => center.distance(pos) <= radius + tolerance,
            Geometry::Text { .. } => bounds.expand(HIT_TOLERANCE).contains(pos),
        }
    }

    /// Translate the shape by the given delta
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.geometry {
            Geometry::Points(points) => {
                for point in points {
                    *point += delta;
                }
            }
            Geometry::Rect { origin, .. } => *origin += delta,
            Geometry::Circle { center, .. } => *center += delta,
            Geometry::Text { origin, .. } => *origin += delta,
        }
    }

    /// Resize the shape so that its unrotated bounds become `new_rect`
    pub fn resize(&mut self, new_rect: Rect) -> Result<(), ShapeError> {
        common::validate_rect(&new_rect)?;

        let old_rect = self.rect();
        if old_rect == Rect::NOTHING {
            return Err(ShapeError::Empty);
        }

        match &mut self.geometry {
            Geometry::Points(points) => {
                let scale_x = if old_rect.width() > 0.0 {
                    new_rect.width() / old_rect.width()
                } else {
                    1.0
                };
                let scale_y = if old_rect.height() > 0.0 {
                    new_rect.height() / old_rect.height()
                } else {
                    1.0
                };
                for point in points.iter_mut() {
                    point.x = new_rect.min.x + (point.x - old_rect.min.x) * scale_x;
                    point.y = new_rect.min.y + (point.y - old_rect.min.y) * scale_y;
                }
            }
            Geometry::Rect { origin, size } => {
                *origin = new_rect.min;
                *size = new_rect.size();
            }
            Geometry::Circle { center, radius } => {
                *center = new_rect.center();
                *radius = new_rect.width().min(new_rect.height()) / 2.0;
            }
            Geometry::Text {
                origin, font_size, ..
            } => {
                *origin = new_rect.min;
                if old_rect.height() > 0.0 {
                    *font_size *= new_rect.height() / old_rect.height();
                }
            }
        }
        Ok(())
    }
}

/// Factory functions for the shapes the tool controller seeds on pointer-down
pub mod factory {
    use super::*;

    /// Single-point stroke seeded at `start`. Any tool other than the
    /// highlighter yields a freehand stroke.
    pub fn stroke(tool: ToolKind, start: Pos2, color: Color32, width: f32) -> Shape {
        let tool = if tool == ToolKind::Highlighter {
            ToolKind::Highlighter
        } else {
            ToolKind::Pen
        };
        build(tool, Geometry::Points(vec![start]), color, width)
    }

    /// Two-point arrow with start == end.
    pub fn arrow(start: Pos2, color: Color32, width: f32) -> Shape {
        build(ToolKind::Arrow, Geometry::Points(vec![start, start]), color, width)
    }

    /// Zero-extent rectangle anchored at `origin`.
    pub fn rectangle(origin: Pos2, color: Color32, width: f32) -> Shape {
        build(
            ToolKind::Rectangle,
            Geometry::Rect {
                origin,
                size: Vec2::ZERO,
            },
            color,
            width,
        )
    }

    /// Zero-radius circle centered on `center`.
    pub fn circle(center: Pos2, color: Color32, width: f32) -> Shape {
        build(
            ToolKind::Circle,
            Geometry::Circle {
                center,
                radius: 0.0,
            },
            color,
            width,
        )
    }

    pub fn text(origin: Pos2, text: String, font_size: f32, color: Color32, width: f32) -> Shape {
        build(
            ToolKind::Text,
            Geometry::Text {
                origin,
                text,
                font_size,
            },
            color,
            width,
        )
    }

    // Every factory pairs a tool with its own geometry variant.
    fn build(tool: ToolKind, geometry: Geometry, color: Color32, width: f32) -> Shape {
        Shape {
            id: ShapeId::new(),
            tool,
            geometry,
            color,
            stroke_width: width.max(f32::EPSILON),
            rotation: 0.0,
        }
    }
}
