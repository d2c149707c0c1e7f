use egui::{Pos2, Rect, Vec2};

// Common constants for all shape kinds
pub const MIN_ELEMENT_SIZE: f32 = 2.0;
/// Extra pick tolerance around thin strokes.
pub const HIT_TOLERANCE: f32 = 4.0;
/// Approximate glyph advance relative to the font size, used for text bounds.
pub const APPROX_CHAR_WIDTH: f32 = 0.6;

/// Validates that a rectangle has minimum dimensions
pub(crate) fn validate_rect(rect: &Rect) -> Result<(), super::ShapeError> {
    if rect.width() < MIN_ELEMENT_SIZE || rect.height() < MIN_ELEMENT_SIZE {
        Err(super::ShapeError::TooSmall {
            min: MIN_ELEMENT_SIZE,
            width: rect.width(),
            height: rect.height(),
        })
    } else {
        Ok(())
    }
}

/// Calculate distance from a point to a line segment (used for stroke hit testing)
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Rotate `point` by `angle` radians around `center` (screen space, y down).
pub fn rotate_point(point: Pos2, center: Pos2, angle: f32) -> Pos2 {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = distance_to_line_segment(Pos2::new(-3.0, 4.0), Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-4);
        let d = distance_to_line_segment(Pos2::new(5.0, 2.0), Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert!((d - 2.0).abs() < 1e-4);
    }

    #[test]
    fn bounds_of_empty_point_set_is_nothing() {
        assert_eq!(calculate_bounds(&[], 1.0), Rect::NOTHING);
    }

    #[test]
    fn quarter_turn_rotation() {
        let p = rotate_point(Pos2::new(1.0, 0.0), Pos2::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }
}
