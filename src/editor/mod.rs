//! Mask editing tool state and gesture dispatch.

pub mod tools;

use image::RgbaImage;

use crate::canvas::CanvasLayers;
use crate::geometry::MaskPoint;
use crate::input::PointerGesture;

pub use tools::{
    flood_fill, paint_segment, paint_shape, FillReport, ShapeKind, StrokeMode, StrokeStyle,
    ToolKind, DEFAULT_ACCENT_COLOR, DEFAULT_FILL_TOLERANCE,
};

/// Transient state alive only between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    drawing: bool,
    last_point: Option<MaskPoint>,
    shape_origin: Option<MaskPoint>,
    snapshot: Option<RgbaImage>,
}

impl GestureState {
    pub fn is_clear(&self) -> bool {
        !self.drawing
            && self.last_point.is_none()
            && self.shape_origin.is_none()
            && self.snapshot.is_none()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// The mask buffer was written.
    MaskChanged,
    /// Gesture bookkeeping only.
    Tracked,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct MaskEditor {
    active_tool: ToolKind,
    style: StrokeStyle,
    fill_tolerance: u8,
    gesture: GestureState,
}

impl Default for MaskEditor {
    fn default() -> Self {
        Self::new(StrokeStyle::default(), DEFAULT_FILL_TOLERANCE)
    }
}

impl MaskEditor {
    pub fn new(style: StrokeStyle, fill_tolerance: u8) -> Self {
        Self {
            active_tool: ToolKind::default(),
            style,
            fill_tolerance,
            gesture: GestureState::default(),
        }
    }

    pub const fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub const fn style(&self) -> StrokeStyle {
        self.style
    }

    pub const fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Switching tools mid-gesture is not supported; the request is refused while drawing.
    pub fn select_tool(&mut self, tool: ToolKind) -> bool {
        if self.gesture.drawing {
            tracing::debug!(
                requested = tool.label(),
                active = self.active_tool.label(),
                "tool switch ignored during gesture"
            );
            return false;
        }
        self.active_tool = tool;
        true
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.style.set_size(size);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.style.set_opacity(opacity);
    }

    /// Drops any in-progress gesture without touching the mask.
    pub fn cancel_gesture(&mut self) {
        self.gesture.reset();
    }

    pub fn handle(&mut self, layers: &mut CanvasLayers, gesture: PointerGesture) -> GestureEffect {
        match gesture {
            PointerGesture::Start(point) => self.begin(layers, point),
            PointerGesture::Move(point) => self.advance(layers, point),
            PointerGesture::End | PointerGesture::Leave => {
                self.gesture.reset();
                GestureEffect::Tracked
            }
        }
    }

    fn begin(&mut self, layers: &mut CanvasLayers, point: MaskPoint) -> GestureEffect {
        self.gesture.reset();
        self.gesture.drawing = true;
        match self.active_tool {
            ToolKind::Brush | ToolKind::Eraser => {
                self.gesture.last_point = Some(point);
                GestureEffect::Tracked
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                self.gesture.shape_origin = Some(point);
                self.gesture.snapshot = Some(layers.mask().clone());
                GestureEffect::Tracked
            }
            ToolKind::Fill => {
                let Some(start) = point.pixel() else {
                    return GestureEffect::Ignored;
                };
                let (base, mask) = layers.layers_mut();
                let report = flood_fill(base, mask, start, &self.style, self.fill_tolerance);
                if report.painted > 0 {
                    GestureEffect::MaskChanged
                } else {
                    GestureEffect::Ignored
                }
            }
        }
    }

    fn advance(&mut self, layers: &mut CanvasLayers, point: MaskPoint) -> GestureEffect {
        if !self.gesture.drawing {
            return GestureEffect::Ignored;
        }
        match self.active_tool {
            ToolKind::Brush | ToolKind::Eraser => {
                let Some(from) = self.gesture.last_point.replace(point) else {
                    return GestureEffect::Ignored;
                };
                let mode = if self.active_tool == ToolKind::Eraser {
                    StrokeMode::Erase
                } else {
                    StrokeMode::Paint
                };
                paint_segment(layers.mask_mut(), from, point, &self.style, mode);
                GestureEffect::MaskChanged
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                let (Some(origin), Some(snapshot), Some(kind)) = (
                    self.gesture.shape_origin,
                    self.gesture.snapshot.as_ref(),
                    ShapeKind::for_tool(self.active_tool),
                ) else {
                    return GestureEffect::Ignored;
                };
                let mask = layers.mask_mut();
                mask.clone_from(snapshot);
                paint_shape(mask, kind, origin, point, &self.style);
                GestureEffect::MaskChanged
            }
            ToolKind::Fill => GestureEffect::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ImageFormatKind;
    use image::Rgba;

    fn layers(width: u32, height: u32) -> CanvasLayers {
        let base = RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]));
        CanvasLayers::new(base, ImageFormatKind::Png).expect("layers")
    }

    fn editor(opacity: f32) -> MaskEditor {
        MaskEditor::new(
            StrokeStyle::new(10, opacity, DEFAULT_ACCENT_COLOR),
            DEFAULT_FILL_TOLERANCE,
        )
    }

    fn drag(editor: &mut MaskEditor, layers: &mut CanvasLayers, points: &[(f32, f32)]) {
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            editor.handle(layers, PointerGesture::Start(MaskPoint::new(x, y)));
        }
        for &(x, y) in iter {
            editor.handle(layers, PointerGesture::Move(MaskPoint::new(x, y)));
        }
        editor.handle(layers, PointerGesture::End);
    }

    #[test]
    fn brush_start_alone_does_not_paint() {
        let mut layers = layers(40, 40);
        let mut editor = editor(1.0);
        let effect = editor.handle(&mut layers, PointerGesture::Start(MaskPoint::new(20.0, 20.0)));
        assert_eq!(effect, GestureEffect::Tracked);
        assert_eq!(layers.mask_coverage(), 0);
    }

    #[test]
    fn brush_then_full_eraser_returns_region_to_transparent() {
        let mut layers = layers(60, 60);
        let mut editor = editor(0.6);
        let path = [(10.0, 30.0), (25.0, 28.0), (40.0, 32.0), (50.0, 30.0)];
        drag(&mut editor, &mut layers, &path);
        drag(&mut editor, &mut layers, &[(10.0, 20.0), (10.0, 40.0)]);
        assert!(layers.mask_coverage() > 0);

        assert!(editor.select_tool(ToolKind::Eraser));
        editor.set_brush_size(100);
        drag(&mut editor, &mut layers, &[(0.0, 30.0), (60.0, 30.0)]);
        assert_eq!(layers.mask_coverage(), 0);
    }

    #[test]
    fn rectangle_preview_is_replaced_on_each_move() {
        let mut layers = layers(100, 100);
        let mut editor = editor(1.0);
        editor.select_tool(ToolKind::Rectangle);
        drag(
            &mut editor,
            &mut layers,
            &[(10.0, 10.0), (90.0, 90.0), (50.0, 50.0)],
        );
        assert_eq!(layers.mask_coverage(), 40 * 40);
        assert_eq!(layers.mask().get_pixel(70, 70)[3], 0);
    }

    #[test]
    fn shape_preview_keeps_prior_mask_content() {
        let mut layers = layers(50, 50);
        let mut editor = editor(1.0);
        layers.mask_mut().put_pixel(45, 45, Rgba([255, 64, 129, 255]));
        editor.select_tool(ToolKind::Circle);
        drag(&mut editor, &mut layers, &[(0.0, 0.0), (30.0, 30.0), (20.0, 20.0)]);
        assert_eq!(layers.mask().get_pixel(45, 45)[3], 255);
        assert_eq!(layers.mask().get_pixel(10, 10)[3], 255);
        assert_eq!(layers.mask().get_pixel(25, 25)[3], 0);
    }

    #[test]
    fn fill_tool_paints_on_start() {
        let mut layers = layers(16, 16);
        let mut editor = editor(1.0);
        editor.select_tool(ToolKind::Fill);
        let effect = editor.handle(&mut layers, PointerGesture::Start(MaskPoint::new(3.2, 4.9)));
        assert_eq!(effect, GestureEffect::MaskChanged);
        assert_eq!(layers.mask_coverage(), 256);
    }

    #[test]
    fn gesture_state_clears_on_end_and_leave_for_every_tool() {
        for tool in ToolKind::ALL {
            for finish in [PointerGesture::End, PointerGesture::Leave] {
                let mut layers = layers(20, 20);
                let mut editor = editor(1.0);
                editor.select_tool(tool);
                editor.handle(&mut layers, PointerGesture::Start(MaskPoint::new(2.0, 2.0)));
                editor.handle(&mut layers, PointerGesture::Move(MaskPoint::new(8.0, 8.0)));
                editor.handle(&mut layers, finish);
                assert!(editor.gesture().is_clear(), "{tool:?} after {finish:?}");
            }
        }
    }

    #[test]
    fn moves_without_active_gesture_are_ignored() {
        let mut layers = layers(20, 20);
        let mut editor = editor(1.0);
        let effect = editor.handle(&mut layers, PointerGesture::Move(MaskPoint::new(5.0, 5.0)));
        assert_eq!(effect, GestureEffect::Ignored);
        assert_eq!(layers.mask_coverage(), 0);
    }

    #[test]
    fn tool_switch_is_refused_mid_gesture() {
        let mut layers = layers(20, 20);
        let mut editor = editor(1.0);
        editor.handle(&mut layers, PointerGesture::Start(MaskPoint::new(1.0, 1.0)));
        assert!(!editor.select_tool(ToolKind::Fill));
        assert_eq!(editor.active_tool(), ToolKind::Brush);
        editor.handle(&mut layers, PointerGesture::End);
        assert!(editor.select_tool(ToolKind::Fill));
    }
}
