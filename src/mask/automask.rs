use image::{imageops, RgbaImage};

use crate::canvas::{CanvasError, CanvasResult, TRANSPARENT};
use crate::editor::StrokeStyle;

/// A segmentation pixel is background when every color channel is above this value.
pub const BACKGROUND_THRESHOLD: u8 = 200;

/// Turns a light-background / dark-subject segmentation image into a mask layer.
///
/// Background pixels become the accent color at the configured opacity; every
/// other pixel is fully transparent. `encoded` is decoded completely before
/// anything is returned, so a decode failure never yields a partial mask.
/// Segmentations that come back at another size are stretched to `size`.
pub fn normalize_segmentation(
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

    let segmentation = if decoded.dimensions() == size {
        decoded
    } else {
        tracing::debug!(
            from = ?decoded.dimensions(),
            to = ?size,
            "resizing segmentation to mask size"
        );
        imageops::resize(&decoded, size.0, size.1, imageops::FilterType::Nearest)
    };

    let paint = style.paint();
    let mut mask = RgbaImage::from_pixel(size.0, size.1, TRANSPARENT);
    for (out, source) in mask.pixels_mut().zip(segmentation.pixels()) {
        let background = source.0[..3]
            .iter()
            .all(|&channel| channel > BACKGROUND_THRESHOLD);
        if background {
            *out = paint;
        }
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::encode_png;
    use crate::editor::DEFAULT_ACCENT_COLOR;
    use image::Rgba;

    fn style(opacity: f32) -> StrokeStyle {
        StrokeStyle::new(10, opacity, DEFAULT_ACCENT_COLOR)
    }

    #[test]
    fn light_pixels_become_accent_and_others_transparent() {
        let segmentation = RgbaImage::from_fn(4, 1, |x, _| match x {
            0 => Rgba([255, 255, 255, 255]),
            1 => Rgba([201, 201, 201, 255]),
            2 => Rgba([200, 255, 255, 255]),
            _ => Rgba([0, 0, 0, 255]),
        });
        let mask =
            normalize_segmentation(&encode_png(&segmentation).unwrap(), (4, 1), &style(0.5))
                .unwrap();

        assert_eq!(*mask.get_pixel(0, 0), Rgba([255, 64, 129, 128]));
        assert_eq!(*mask.get_pixel(1, 0), Rgba([255, 64, 129, 128]));
        assert_eq!(mask.get_pixel(2, 0)[3], 0);
        assert_eq!(mask.get_pixel(3, 0)[3], 0);
    }

    #[test]
    fn mismatched_segmentation_is_stretched_to_mask_size() {
        let segmentation = RgbaImage::from_pixel(8, 4, Rgba([250, 250, 250, 255]));
        let mask =
            normalize_segmentation(&encode_png(&segmentation).unwrap(), (16, 8), &style(1.0))
                .unwrap();
        assert_eq!(mask.dimensions(), (16, 8));
        assert!(mask.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn undecodable_payload_is_an_error() {
        let err = normalize_segmentation(b"\x89PNG\r\n\x1a\nbroken", (4, 4), &style(1.0))
            .unwrap_err();
        assert!(matches!(err, CanvasError::Decode { .. }));
    }
}
