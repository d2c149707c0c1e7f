//! Software rendering of the screenshot plus its shapes into one bitmap.
//!
//! Every shape is first rasterized into a coverage mask and then composited
//! once, so a stroke crossing itself does not darken where it overlaps.

use std::io::Cursor;

use egui::{Color32, Pos2, Rect, Vec2};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use crate::element::{rotate_point, Geometry, Shape, ToolKind};
use crate::error::ExportError;
use crate::geometry::{arrow_head, normalized_rect, smooth_points, SPLINE_SEGMENTS, STROKE_TENSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlendMode {
    /// Regular alpha compositing
    Over,
    /// Darkens: the result is never lighter than what was underneath
    Multiply,
}

/// Coverage (0..=255) over an axis-aligned pixel window.
#[derive(Debug, Clone)]
struct Mask {
    x0: i32,
    y0: i32,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    fn new(bounds: Rect) -> Option<Self> {
        if !bounds.is_finite() || !bounds.is_positive() {
            return None;
        }
        let x0 = bounds.min.x.floor() as i32;
        let y0 = bounds.min.y.floor() as i32;
        let width = (bounds.max.x.ceil() as i32 - x0).max(0) as u32;
        let height = (bounds.max.y.ceil() as i32 - y0).max(0) as u32;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x0,
            y0,
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// A mask over `bounds` clipped to a `width`×`height` image.
    fn clipped(bounds: Rect, width: u32, height: u32) -> Option<Self> {
        let image = Rect::from_min_size(Pos2::ZERO, Vec2::new(width as f32, height as f32));
        Self::new(bounds.intersect(image))
    }

    fn bounds(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x0 as f32, self.y0 as f32),
            Vec2::new(self.width as f32, self.height as f32),
        )
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.width as i32 || ly >= self.height as i32 {
            return None;
        }
        Some(ly as usize * self.width as usize + lx as usize)
    }

    fn get(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.data[i])
    }

    fn cover(&mut self, x: i32, y: i32, coverage: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = self.data[i].max(coverage);
        }
    }

    /// Every pixel whose center passes `inside`, within `area`.
    fn fill_where(&mut self, area: Rect, inside: impl Fn(f32, f32) -> bool) {
        let area = area.intersect(self.bounds());
        if !area.is_positive() {
            return;
        }
        for y in area.min.y.floor() as i32..area.max.y.ceil() as i32 {
            for x in area.min.x.floor() as i32..area.max.x.ceil() as i32 {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.cover(x, y, 255);
                }
            }
        }
    }

    fn disc(&mut self, center: Pos2, radius: f32) {
        let radius = radius.max(0.5);
        let radius_sq = radius * radius;
        self.fill_where(
            Rect::from_center_size(center, Vec2::splat(radius * 2.0)),
            |x, y| {
                let (dx, dy) = (x - center.x, y - center.y);
                dx * dx + dy * dy <= radius_sq
            },
        );
    }

    /// Round-capped line of the given thickness.
    fn segment(&mut self, start: Pos2, end: Pos2, thickness: f32) {
        let delta = end - start;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        let radius = thickness / 2.0;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.disc(start + delta * t, radius);
        }
    }

    fn polyline(&mut self, points: &[Pos2], thickness: f32) {
        match points {
            [] => {}
            [only] => self.disc(*only, thickness / 2.0),
            _ => {
                for pair in points.windows(2) {
                    self.segment(pair[0], pair[1], thickness);
                }
            }
        }
    }

    fn ring(&mut self, center: Pos2, radius: f32, thickness: f32) {
        let half = (thickness / 2.0).max(0.5);
        let outer = radius + half;
        self.fill_where(
            Rect::from_center_size(center, Vec2::splat(outer * 2.0)),
            |x, y| ((x - center.x).hypot(y - center.y) - radius).abs() <= half,
        );
    }

    /// This mask turned by `angle` around `center`, sampled nearest-neighbour.
    fn rotated(&self, center: Pos2, angle: f32) -> Option<Self> {
        let b = self.bounds();
        let corners = [b.left_top(), b.right_top(), b.right_bottom(), b.left_bottom()]
            .map(|p| rotate_point(p, center, angle));
        let mut out = Self::new(Rect::from_points(&corners))?;
        for y in out.y0..out.y0 + out.height as i32 {
            for x in out.x0..out.x0 + out.width as i32 {
                let src = rotate_point(Pos2::new(x as f32 + 0.5, y as f32 + 0.5), center, -angle);
                let coverage = self.get(src.x.floor() as i32, src.y.floor() as i32);
                if coverage > 0 {
                    out.cover(x, y, coverage);
                }
            }
        }
        Some(out)
    }

    fn composite(&self, img: &mut RgbaImage, color: Color32, mode: BlendMode) {
        let (width, height) = img.dimensions();
        for ly in 0..self.height {
            for lx in 0..self.width {
                let coverage = self.data[(ly * self.width + lx) as usize];
                if coverage == 0 {
                    continue;
                }
                let x = self.x0 + lx as i32;
                let y = self.y0 + ly as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }
                let pixel = img.get_pixel_mut(x as u32, y as u32);
                *pixel = match mode {
                    BlendMode::Over => blend_over(*pixel, color, coverage),
                    BlendMode::Multiply => blend_multiply(*pixel, color, coverage),
                };
            }
        }
    }
}

fn source_alpha(color: Color32, coverage: u8) -> f32 {
    let [_, _, _, a] = color.to_srgba_unmultiplied();
    (a as f32 / 255.0) * (coverage as f32 / 255.0)
}

fn blend_over(dst: Rgba<u8>, color: Color32, coverage: u8) -> Rgba<u8> {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let src_a = source_alpha(color, coverage);
    if src_a <= 0.0 {
        return dst;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return dst;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f32 / 255.0;
        let dst_f = dst as f32 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba([
        blend(r, dst[0]),
        blend(g, dst[1]),
        blend(b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

fn blend_multiply(dst: Rgba<u8>, color: Color32, coverage: u8) -> Rgba<u8> {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let a = source_alpha(color, coverage);
    let blend = |src: u8, dst: u8| {
        let factor = (1.0 - a) + a * (src as f32 / 255.0);
        (dst as f32 * factor).round().clamp(0.0, 255.0) as u8
    };
    let dst_a = dst[3] as f32 / 255.0;
    Rgba([
        blend(r, dst[0]),
        blend(g, dst[1]),
        blend(b, dst[2]),
        ((a + dst_a * (1.0 - a)) * 255.0).round() as u8,
    ])
}

fn default_font_arc() -> Option<(ab_glyph::FontArc, egui::FontTweak)> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let font_name = family.first()?;
    let data: &egui::FontData = definitions.font_data.get(font_name)?;
    let font = match &data.font {
        std::borrow::Cow::Borrowed(bytes) => {
            ab_glyph::FontRef::try_from_slice_and_index(*bytes, data.index)
                .map(ab_glyph::FontArc::from)
                .ok()
        }
        std::borrow::Cow::Owned(bytes) => {
            ab_glyph::FontVec::try_from_vec_and_index(bytes.clone(), data.index)
                .map(ab_glyph::FontArc::from)
                .ok()
        }
    }?;
    Some((font, data.tweak))
}

/// Glyph coverage of `text` with its top-left at `pos`, unrotated.
fn text_mask(
    font: &ab_glyph::FontArc,
    tweak: egui::FontTweak,
    pos: Pos2,
    text: &str,
    size: f32,
) -> Option<Mask> {
    use ab_glyph::{point, Font, ScaleFont};
    if text.is_empty() || size <= 0.0 {
        return None;
    }
    let scaled = font.as_scaled(size * tweak.scale);
    let advance: f32 = text
        .chars()
        .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
        .sum();
    let height = scaled.ascent() - scaled.descent();
    let mut mask = Mask::new(
        Rect::from_min_size(pos, Vec2::new(advance, height)).expand(size * 0.25 + 2.0),
    )?;

    let mut caret = point(pos.x, pos.y + scaled.ascent() + tweak.y_offset * size);
    for ch in text.chars() {
        let mut glyph = scaled.scaled_glyph(ch);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        if let Some(outlined) = scaled.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                let coverage = (coverage * 255.0).round().clamp(0.0, 255.0) as u8;
                mask.cover(px, py, coverage);
            });
        }
    }
    Some(mask)
}

/// Renders shapes onto a bitmap whose pixels are `pixel_ratio` times the
/// canvas units shapes are expressed in.
struct Rasterizer {
    pixel_ratio: f32,
    font: Option<(ab_glyph::FontArc, egui::FontTweak)>,
}

impl Rasterizer {
    fn new(pixel_ratio: f32) -> Self {
        Self {
            pixel_ratio,
            font: default_font_arc(),
        }
    }

    fn draw(&self, img: &mut RgbaImage, shape: &Shape) {
        let s = self.pixel_ratio;
        let center = shape.rect().center();
        let rotation = shape.rotation();
        let to_px = |p: Pos2| (rotate_point(p, center, rotation).to_vec2() * s).to_pos2();
        let thickness = shape.stroke_width() * s;
        let (width, height) = img.dimensions();
        let mode = if shape.tool() == ToolKind::Highlighter {
            BlendMode::Multiply
        } else {
            BlendMode::Over
        };

        let mask = match shape.geometry() {
            Geometry::Points(points) => {
                let mut path: Vec<Pos2> = if shape.tool() == ToolKind::Arrow {
                    points.to_vec()
                } else {
                    smooth_points(points, STROKE_TENSION, SPLINE_SEGMENTS)
                };
                let head = match (shape.tool(), points.first(), points.last()) {
                    (ToolKind::Arrow, Some(tail), Some(tip)) => {
                        arrow_head(*tail, *tip, shape.stroke_width()).map(|h| (*tip, h))
                    }
                    _ => None,
                };
                path.iter_mut().for_each(|p| *p = to_px(*p));
                let bounds = Rect::from_points(&path).expand(thickness + 1.0);
                let bounds = match head {
                    Some((_, [left, right])) => bounds.union(
                        Rect::from_points(&[to_px(left), to_px(right)]).expand(thickness + 1.0),
                    ),
                    None => bounds,
                };
                Mask::clipped(bounds, width, height).map(|mut mask| {
                    mask.polyline(&path, thickness);
                    if let Some((tip, [left, right])) = head {
                        mask.segment(to_px(tip), to_px(left), thickness);
                        mask.segment(to_px(tip), to_px(right), thickness);
                    }
                    mask
                })
            }
            Geometry::Rect { origin, size } => {
                let rect = normalized_rect(*origin, *size);
                let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
                    .map(to_px);
                let bounds = Rect::from_points(&corners).expand(thickness + 1.0);
                Mask::clipped(bounds, width, height).map(|mut mask| {
                    for i in 0..corners.len() {
                        mask.segment(corners[i], corners[(i + 1) % corners.len()], thickness);
                    }
                    mask
                })
            }
            Geometry::Circle { center, radius } => {
                let c = to_px(*center);
                let r = radius * s;
                let bounds = Rect::from_center_size(c, Vec2::splat(2.0 * r)).expand(thickness + 1.0);
                Mask::clipped(bounds, width, height).map(|mut mask| {
                    mask.ring(c, r, thickness);
                    mask
                })
            }
            Geometry::Text {
                origin,
                text,
                font_size,
            } => {
                let Some((font, tweak)) = &self.font else {
                    log::warn!("No font available, skipping text shape {}", shape.id());
                    return;
                };
                let origin_px = (origin.to_vec2() * s).to_pos2();
                text_mask(font, *tweak, origin_px, text, font_size * s).and_then(|mask| {
                    if rotation == 0.0 {
                        Some(mask)
                    } else {
                        mask.rotated((center.to_vec2() * s).to_pos2(), rotation)
                    }
                })
            }
        };

        if let Some(mask) = mask {
            mask.composite(img, shape.color(), mode);
        }
    }
}

/// Flatten `base` and `shapes` into one bitmap of `display_size × pixel_ratio`
/// pixels. Shapes are drawn in order, later ones on top.
pub fn flatten<'a>(
    base: &RgbaImage,
    display_size: Vec2,
    shapes: impl IntoIterator<Item = &'a Shape>,
    pixel_ratio: f32,
) -> RgbaImage {
    let width = (display_size.x * pixel_ratio).round().max(1.0) as u32;
    let height = (display_size.y * pixel_ratio).round().max(1.0) as u32;
    let mut img = if base.dimensions() == (width, height) {
        base.clone()
    } else {
        image::imageops::resize(base, width, height, FilterType::Triangle)
    };

    let rasterizer = Rasterizer::new(pixel_ratio);
    for shape in shapes {
        rasterizer.draw(&mut img, shape);
    }
    img
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn white(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, WHITE)
    }

    fn rect_shape(origin: Pos2, size: Vec2) -> Shape {
        let mut shape = factory::rectangle(origin, Color32::from_rgb(255, 0, 0), 2.0);
        shape.set_geometry(Geometry::Rect { origin, size }).unwrap();
        shape
    }

    #[test]
    fn output_is_display_size_times_ratio() {
        let out = flatten(&white(400), Vec2::new(100.0, 100.0), &[], 2.0);
        assert_eq!(out.dimensions(), (200, 200));
    }

    #[test]
    fn negative_rectangle_lands_on_normalized_box() {
        let shape = rect_shape(Pos2::new(50.0, 50.0), Vec2::new(-20.0, -30.0));
        let out = flatten(&white(100), Vec2::new(100.0, 100.0), [&shape], 2.0);
        // left edge of the 20x30 box anchored at (30,20)
        assert_eq!(out.get_pixel(60, 70)[1], 0);
        // its interior stays untouched
        assert_eq!(*out.get_pixel(80, 70), WHITE);
        // nothing right of the anchor
        assert_eq!(*out.get_pixel(140, 70), WHITE);
    }

    #[test]
    fn highlighter_multiplies() {
        let mut stroke = factory::stroke(
            ToolKind::Highlighter,
            Pos2::new(10.0, 50.0),
            Color32::from_rgba_unmultiplied(255, 255, 0, 128),
            12.0,
        );
        stroke
            .set_geometry(Geometry::Points(vec![Pos2::new(10.0, 50.0), Pos2::new(90.0, 50.0)]))
            .unwrap();

        let black = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let out = flatten(&black, Vec2::new(100.0, 100.0), [&stroke], 1.0);
        assert_eq!(*out.get_pixel(50, 50), Rgba([0, 0, 0, 255]));

        let out = flatten(&white(100), Vec2::new(100.0, 100.0), [&stroke], 1.0);
        let px = out.get_pixel(50, 50);
        assert_eq!((px[0], px[1]), (255, 255));
        assert!(px[2] < 140 && px[2] > 110, "blue was {}", px[2]);
    }

    #[test]
    fn overlapping_passes_of_one_stroke_do_not_stack() {
        let mut stroke = factory::stroke(
            ToolKind::Pen,
            Pos2::new(10.0, 10.0),
            Color32::from_rgba_unmultiplied(0, 0, 0, 128),
            6.0,
        );
        stroke
            .set_geometry(Geometry::Points(vec![
                Pos2::new(10.0, 10.0),
                Pos2::new(40.0, 10.0),
                Pos2::new(10.0, 10.0),
            ]))
            .unwrap();
        let out = flatten(&white(50), Vec2::new(50.0, 50.0), [&stroke], 1.0);
        let a = out.get_pixel(25, 10)[0];
        assert!(a > 120 && a < 135, "got {}", a);
    }

    #[test]
    fn circle_ring_leaves_center_clear() {
        let mut circle = factory::circle(Pos2::new(50.0, 50.0), Color32::BLACK, 2.0);
        circle
            .set_geometry(Geometry::Circle {
                center: Pos2::new(50.0, 50.0),
                radius: 20.0,
            })
            .unwrap();
        let out = flatten(&white(100), Vec2::new(100.0, 100.0), [&circle], 1.0);
        assert_eq!(*out.get_pixel(50, 50), WHITE);
        assert_eq!(out.get_pixel(70, 50)[0], 0);
    }

    #[test]
    fn text_is_drawn() {
        let text = factory::text(Pos2::new(10.0, 10.0), "Hi".into(), 18.0, Color32::BLACK, 3.0);
        let out = flatten(&white(100), Vec2::new(100.0, 100.0), [&text], 1.0);
        assert!(out.pixels().any(|p| p[0] < 128));
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let png = encode_png(&white(7)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 7));
    }
}
