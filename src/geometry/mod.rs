use egui::{Pos2, Rect, Vec2};

pub mod hit_testing;

/// Curve tension used for freehand strokes.
pub const STROKE_TENSION: f32 = 0.5;
/// Interpolated samples inserted between two consecutive stroke points.
pub const SPLINE_SEGMENTS: usize = 8;

/// Turn an origin plus a possibly negative extent into a rectangle with
/// positive width and height.
///
/// A drag from (50,50) to (30,20) stores `size = (-20,-30)`; the result is the
/// 20×30 box whose top-left corner is (30,20).
pub fn normalized_rect(origin: Pos2, size: Vec2) -> Rect {
    Rect::from_two_pos(origin, origin + size)
}

/// Sample a cardinal spline through `points`.
///
/// `tension` scales the tangents (`0.5` gives a Catmull-Rom curve, `0.0`
/// collapses to straight segments). The input points are always part of the
/// output, in order.
pub fn smooth_points(points: &[Pos2], tension: f32, segments: usize) -> Vec<Pos2> {
    if points.len() < 3 || tension == 0.0 || segments < 2 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity((points.len() - 1) * segments + 1);
    let last = points.len() - 1;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        let m1 = (p2 - p0) * tension;
        let m2 = (p3 - p1) * tension;

        for step in 0..segments {
            let t = step as f32 / segments as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let v = p1.to_vec2() * h00 + m1 * h10 + p2.to_vec2() * h01 + m2 * h11;
            out.push(v.to_pos2());
        }
    }
    out.push(points[last]);
    out
}

/// The two barb end points of an arrow head at `tip` pointing away from `tail`.
pub fn arrow_head(tail: Pos2, tip: Pos2, width: f32) -> Option<[Pos2; 2]> {
    let dir = tip - tail;
    let len = dir.length();
    if len < 0.5 {
        return None;
    }
    let unit = dir / len;
    let head_len = (10.0 + width * 2.0).min(len * 0.5);
    let angle = 30.0_f32.to_radians();
    Some([
        tip - rotate_vec(unit, angle) * head_len,
        tip - rotate_vec(unit, -angle) * head_len,
    ])
}

fn rotate_vec(vec: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(vec.x * cos - vec.y * sin, vec.x * sin + vec.y * cos)
}
