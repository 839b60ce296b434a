//! Base photo and editable mask raster pair.

mod composite;
mod load;

pub use composite::{blend_source_over, clear_pixel};
pub use load::{decode_base_image, fit_within, ImageFormatKind, MAX_BASE_DIMENSION};

use image::{Rgba, RgbaImage};
use thiserror::Error;

pub type CanvasResult<T> = std::result::Result<T, CanvasError>;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("unsupported image format: {detail}")]
    UnsupportedFormat { detail: String },
    #[error("failed to decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
    #[error("image has no pixels")]
    EmptyImage,
    #[error("layer size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The immutable photo plus the mask the user paints on. Both always share dimensions.
#[derive(Debug, Clone)]
pub struct CanvasLayers {
    base: RgbaImage,
    mask: RgbaImage,
    base_format: ImageFormatKind,
}

impl CanvasLayers {
    pub fn new(base: RgbaImage, base_format: ImageFormatKind) -> CanvasResult<Self> {
        if base.width() == 0 || base.height() == 0 {
            return Err(CanvasError::EmptyImage);
        }
        let mask = RgbaImage::from_pixel(base.width(), base.height(), TRANSPARENT);
        Ok(Self {
            base,
            mask,
            base_format,
        })
    }

    /// Decodes and fits an uploaded photo, pairing it with a blank mask.
    pub fn from_encoded(bytes: &[u8]) -> CanvasResult<Self> {
        let (base, format) = decode_base_image(bytes)?;
        Self::new(base, format)
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    pub fn base_format(&self) -> ImageFormatKind {
        self.base_format
    }

    pub fn mask(&self) -> &RgbaImage {
        &self.mask
    }

    pub(crate) fn mask_mut(&mut self) -> &mut RgbaImage {
        &mut self.mask
    }

    /// Split borrow for operations that read the photo while painting the mask.
    pub(crate) fn layers_mut(&mut self) -> (&RgbaImage, &mut RgbaImage) {
        (&self.base, &mut self.mask)
    }

    pub fn clear_mask(&mut self) {
        for pixel in self.mask.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Swaps in a whole mask layer. The replacement must match the base dimensions.
    pub fn replace_mask(&mut self, mask: RgbaImage) -> CanvasResult<()> {
        if mask.dimensions() != self.base.dimensions() {
            return Err(CanvasError::SizeMismatch {
                expected: self.base.dimensions(),
                actual: mask.dimensions(),
            });
        }
        self.mask = mask;
        Ok(())
    }

    /// Number of mask pixels with any coverage.
    pub fn mask_coverage(&self) -> usize {
        self.mask.pixels().filter(|pixel| pixel[3] > 0).count()
    }

    /// Base photo re-encoded as PNG for upload.
    pub fn encode_base_png(&self) -> CanvasResult<Vec<u8>> {
        encode_png(&self.base)
    }
}

pub fn encode_png(image: &RgbaImage) -> CanvasResult<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|source| CanvasError::Encode { source })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([120, 80, 40, 255]))
    }

    #[test]
    fn new_layers_share_dimensions_and_start_transparent() {
        let layers = CanvasLayers::new(solid(12, 7), ImageFormatKind::Png).unwrap();
        assert_eq!(layers.mask().dimensions(), (12, 7));
        assert_eq!(layers.mask_coverage(), 0);
    }

    #[test]
    fn empty_base_is_rejected() {
        let err = CanvasLayers::new(RgbaImage::new(0, 5), ImageFormatKind::Png).unwrap_err();
        assert!(matches!(err, CanvasError::EmptyImage));
    }

    #[test]
    fn replace_mask_refuses_mismatched_size() {
        let mut layers = CanvasLayers::new(solid(8, 8), ImageFormatKind::Png).unwrap();
        let err = layers.replace_mask(RgbaImage::new(4, 8)).unwrap_err();
        assert!(matches!(
            err,
            CanvasError::SizeMismatch {
                expected: (8, 8),
                actual: (4, 8)
            }
        ));
    }

    #[test]
    fn clear_mask_removes_all_coverage() {
        let mut layers = CanvasLayers::new(solid(4, 4), ImageFormatKind::Png).unwrap();
        layers.mask_mut().put_pixel(1, 2, Rgba([255, 0, 0, 200]));
        assert_eq!(layers.mask_coverage(), 1);
        layers.clear_mask();
        assert_eq!(layers.mask_coverage(), 0);
    }

    #[test]
    fn encoded_base_round_trips_through_decoder() {
        let layers = CanvasLayers::new(solid(20, 10), ImageFormatKind::Jpeg).unwrap();
        let png = layers.encode_base_png().unwrap();
        let reloaded = CanvasLayers::from_encoded(&png).unwrap();
        assert_eq!(reloaded.dimensions(), (20, 10));
        assert_eq!(reloaded.base_format(), ImageFormatKind::Png);
    }
}
