use image::RgbaImage;

use super::{MaskPoint, PixelRect, StrokeStyle, ToolKind};
use crate::canvas::blend_source_over;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub const fn for_tool(tool: ToolKind) -> Option<Self> {
        match tool {
            ToolKind::Rectangle => Some(Self::Rectangle),
            ToolKind::Circle => Some(Self::Ellipse),
            ToolKind::Brush | ToolKind::Eraser | ToolKind::Fill => None,
        }
    }
}

/// Fills the shape whose bounding box has corners `origin` and `current`.
///
/// Pixels are covered when their center lies inside the shape; the box is
/// half-open so a rectangle from (10,10) to (50,50) covers `[10,50)×[10,50)`.
pub fn paint_shape(
    mask: &mut RgbaImage,
    kind: ShapeKind,
    origin: MaskPoint,
    current: MaskPoint,
    style: &StrokeStyle,
) -> usize {
    let (width, height) = mask.dimensions();
    let bounds = PixelRect::spanning(origin, current, width, height);
    if bounds.is_empty() {
        return 0;
    }

    let paint = style.paint();
    let center_x = (origin.x + current.x) / 2.0;
    let center_y = (origin.y + current.y) / 2.0;
    let radius_x = (current.x - origin.x).abs() / 2.0;
    let radius_y = (current.y - origin.y).abs() / 2.0;

    let mut touched = 0;
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            if kind == ShapeKind::Ellipse {
                let nx = (x as f32 + 0.5 - center_x) / radius_x;
                let ny = (y as f32 + 0.5 - center_y) / radius_y;
                if nx * nx + ny * ny > 1.0 {
                    continue;
                }
            }
            blend_source_over(mask.get_pixel_mut(x, y), paint);
            touched += 1;
        }
    }
    touched
}
