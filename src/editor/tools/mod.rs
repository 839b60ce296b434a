mod brush;
mod fill;
mod shape;

pub use crate::geometry::{Color, MaskPoint, PixelRect};
pub use brush::{paint_segment, StrokeMode};
pub use fill::{flood_fill, FillReport, DEFAULT_FILL_TOLERANCE};
pub use shape::{paint_shape, ShapeKind};

pub const BRUSH_SIZE_MIN: u32 = 5;
pub const BRUSH_SIZE_MAX: u32 = 100;
pub const OPACITY_MIN: f32 = 0.1;
pub const OPACITY_MAX: f32 = 1.0;

/// Fixed paint color for every mask operation.
pub const DEFAULT_ACCENT_COLOR: Color = Color::new(255, 64, 129);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Fill,
}

impl ToolKind {
    pub const ALL: [Self; 5] = [
        Self::Brush,
        Self::Eraser,
        Self::Rectangle,
        Self::Circle,
        Self::Fill,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Fill => "fill",
        }
    }
}

/// Width and opacity shared by brush, shape and fill, applied to the accent color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub size: u32,
    pub opacity: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            size: 30,
            opacity: 0.5,
            color: DEFAULT_ACCENT_COLOR,
        }
    }
}

impl StrokeStyle {
    pub fn new(size: u32, opacity: f32, color: Color) -> Self {
        let mut style = Self {
            size: BRUSH_SIZE_MIN,
            opacity: OPACITY_MAX,
            color,
        };
        style.set_size(size);
        style.set_opacity(opacity);
        style
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            OPACITY_MAX
        } else {
            opacity.clamp(OPACITY_MIN, OPACITY_MAX)
        };
    }

    /// `round(255 × opacity)`.
    pub fn alpha(&self) -> u8 {
        (255.0 * self.opacity).round().clamp(0.0, 255.0) as u8
    }

    pub fn paint(&self) -> image::Rgba<u8> {
        self.color.with_alpha(self.alpha())
    }
}
