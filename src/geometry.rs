/// Shared geometric and color primitives used across canvas, editor and mask modules.

/// A position in mask-buffer pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPoint {
    pub x: f32,
    pub y: f32,
}

impl MaskPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Integer pixel containing this point, if it is not left of or above the buffer.
    pub fn pixel(self) -> Option<(u32, u32)> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return None;
        }
        Some((self.x.floor() as u32, self.y.floor() as u32))
    }
}

/// Axis-aligned pixel span, half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Pixels whose centers fall in the box spanned by two points, clipped to `width`×`height`.
    pub fn spanning(a: MaskPoint, b: MaskPoint, width: u32, height: u32) -> Self {
        let min_x = a.x.min(b.x);
        let max_x = a.x.max(b.x);
        let min_y = a.y.min(b.y);
        let max_y = a.y.max(b.y);
        Self {
            x0: center_bound(min_x, width),
            y0: center_bound(min_y, height),
            x1: center_bound(max_x, width),
            y1: center_bound(max_y, height),
        }
    }

    /// Pixels possibly touched by a disc of `radius` around the segment `a`..`b`.
    pub fn around_segment(a: MaskPoint, b: MaskPoint, radius: f32, width: u32, height: u32) -> Self {
        Self {
            x0: clip_floor(a.x.min(b.x) - radius, width),
            y0: clip_floor(a.y.min(b.y) - radius, height),
            x1: clip_ceil(a.x.max(b.x) + radius, width),
            y1: clip_ceil(a.y.max(b.y) + radius, height),
        }
    }
}

// First pixel index whose center (i + 0.5) is not left of `edge`.
fn center_bound(edge: f32, limit: u32) -> u32 {
    clip_ceil(edge - 0.5, limit)
}

fn clip_floor(value: f32, limit: u32) -> u32 {
    if value <= 0.0 {
        0
    } else {
        (value.floor() as u32).min(limit)
    }
}

fn clip_ceil(value: f32, limit: u32) -> u32 {
    if value <= 0.0 {
        0
    } else {
        (value.ceil() as u32).min(limit)
    }
}

/// On-screen bounding rectangle of the displayed mask surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn with_alpha(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_rect_covers_half_open_pixel_range() {
        let rect = PixelRect::spanning(
            MaskPoint::new(50.0, 50.0),
            MaskPoint::new(10.0, 10.0),
            100,
            100,
        );
        assert_eq!(rect, PixelRect::new(10, 10, 50, 50));
    }

    #[test]
    fn spanning_rect_clips_to_buffer() {
        let rect = PixelRect::spanning(
            MaskPoint::new(-20.0, 90.0),
            MaskPoint::new(30.0, 400.0),
            64,
            128,
        );
        assert_eq!(rect, PixelRect::new(0, 90, 30, 128));
    }

    #[test]
    fn degenerate_span_is_empty() {
        let rect = PixelRect::spanning(MaskPoint::new(5.0, 5.0), MaskPoint::new(5.0, 40.0), 64, 64);
        assert!(rect.is_empty());
    }

    #[test]
    fn pixel_rejects_negative_coordinates() {
        assert_eq!(MaskPoint::new(3.7, 9.2).pixel(), Some((3, 9)));
        assert_eq!(MaskPoint::new(-0.5, 2.0).pixel(), None);
    }
}
