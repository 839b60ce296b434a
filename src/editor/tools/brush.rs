use image::RgbaImage;

use super::{MaskPoint, PixelRect, StrokeStyle};
use crate::canvas::{blend_source_over, clear_pixel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeMode {
    Paint,
    Erase,
}

/// Draws one round-capped segment of width `style.size` from `from` to `to`.
///
/// Each covered pixel is touched once per segment. Paint composites the accent
/// color source-over; erase clears the pixel whatever it held before.
/// Returns the number of pixels touched.
pub fn paint_segment(
    mask: &mut RgbaImage,
    from: MaskPoint,
    to: MaskPoint,
    style: &StrokeStyle,
    mode: StrokeMode,
) -> usize {
    let radius = style.size as f32 / 2.0;
    let (width, height) = mask.dimensions();
    let bounds = PixelRect::around_segment(from, to, radius, width, height);
    if bounds.is_empty() {
        return 0;
    }

    let paint = style.paint();
    let radius_sq = radius * radius;
    let mut touched = 0;
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let center = MaskPoint::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_sq_to_segment(center, from, to) > radius_sq {
                continue;
            }
            let pixel = mask.get_pixel_mut(x, y);
            match mode {
                StrokeMode::Paint => blend_source_over(pixel, paint),
                StrokeMode::Erase => clear_pixel(pixel),
            }
            touched += 1;
        }
    }
    touched
}

fn distance_sq_to_segment(p: MaskPoint, a: MaskPoint, b: MaskPoint) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    (p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)
}
