use image::{imageops, Rgba, RgbaImage};

use crate::canvas::{encode_png, CanvasError, CanvasResult, TRANSPARENT};
use crate::editor::StrokeStyle;

pub const SELECTED: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const UNSELECTED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Derives the two-level mask sent for editing.
///
/// A pixel is selected exactly when the layer has any coverage there, whatever
/// its color or opacity. Selection is carried by opacity: downstream treats any
/// opaque pixel as editable.
pub fn binarize_mask(mask: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y)[3] > 0 {
            SELECTED
        } else {
            UNSELECTED
        }
    })
}

pub fn encode_binary_mask(mask: &RgbaImage) -> CanvasResult<Vec<u8>> {
    encode_png(&binarize_mask(mask))
}

/// Reads a previously exported binary mask back into a paintable layer of `size`.
pub fn decode_binary_mask(
    encoded: &[u8],
    size: (u32, u32),
    style: &StrokeStyle,
) -> CanvasResult<RgbaImage> {
    let decoded = image::load_from_memory(encoded)
        .map_err(|source| CanvasError::Decode { source })?
        .to_rgba8();
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(CanvasError::EmptyImage);
    }
    let decoded = if decoded.dimensions() == size {
        decoded
    } else {
        imageops::resize(&decoded, size.0, size.1, imageops::FilterType::Nearest)
    };

    let paint = style.paint();
    Ok(RgbaImage::from_fn(size.0, size.1, |x, y| {
        if decoded.get_pixel(x, y)[3] > 0 {
            paint
        } else {
            TRANSPARENT
        }
    }))
}
