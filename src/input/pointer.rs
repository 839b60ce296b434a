use crate::geometry::{MaskPoint, ScreenRect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// Raw position reported by the host for a mouse or touch event, in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerSample {
    Mouse { client_x: f32, client_y: f32 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerSample {
    pub const fn mouse(client_x: f32, client_y: f32) -> Self {
        Self::Mouse { client_x, client_y }
    }

    /// Client position used for mapping; multi-touch only honors the first contact.
    fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            Self::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            Self::Touch { touches } => touches
                .first()
                .map(|touch| (touch.client_x, touch.client_y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Leave,
}

/// Device-independent gesture step in mask-buffer space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Start(MaskPoint),
    Move(MaskPoint),
    End,
    Leave,
}

impl PointerGesture {
    /// Maps a host event into buffer space. Start and move events without a usable
    /// position (a touch list with no contacts, a zero-sized surface) yield `None`.
    pub fn from_sample(
        phase: GesturePhase,
        sample: &PointerSample,
        surface: ScreenRect,
        buffer_size: (u32, u32),
    ) -> Option<Self> {
        match phase {
            GesturePhase::End => Some(Self::End),
            GesturePhase::Leave => Some(Self::Leave),
            GesturePhase::Start => map_to_buffer(sample, surface, buffer_size).map(Self::Start),
            GesturePhase::Move => map_to_buffer(sample, surface, buffer_size).map(Self::Move),
        }
    }
}

/// Scales client coordinates by the ratio of buffer pixels to displayed CSS pixels.
pub fn map_to_buffer(
    sample: &PointerSample,
    surface: ScreenRect,
    buffer_size: (u32, u32),
) -> Option<MaskPoint> {
    let (client_x, client_y) = sample.client_position()?;
    if surface.width <= 0.0 || surface.height <= 0.0 {
        return None;
    }
    let scale_x = buffer_size.0 as f32 / surface.width;
    let scale_y = buffer_size.1 as f32 / surface.height;
    Some(MaskPoint::new(
        (client_x - surface.left) * scale_x,
        (client_y - surface.top) * scale_y,
    ))
}
