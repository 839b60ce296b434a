use image::{imageops, ImageFormat, RgbaImage};

use super::{CanvasError, CanvasResult};

/// Longest side a loaded photo is allowed to keep.
pub const MAX_BASE_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatKind {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormatKind {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
        }
    }

    fn sniff(bytes: &[u8]) -> CanvasResult<Self> {
        let format = image::guess_format(bytes).map_err(|err| CanvasError::UnsupportedFormat {
            detail: err.to_string(),
        })?;
        match format {
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            ImageFormat::WebP => Ok(Self::Webp),
            other => Err(CanvasError::UnsupportedFormat {
                detail: format!("{other:?}"),
            }),
        }
    }
}

/// Target size for an image so its longer side does not exceed `max_side`.
///
/// Aspect ratio is preserved and images already within bounds are left as they are.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width, height);
    }
    let scale = |side: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max_side) + u64::from(longest) / 2)
            / u64::from(longest);
        u32::try_from(scaled).unwrap_or(max_side).max(1)
    };
    (scale(width), scale(height))
}

/// Decodes PNG, JPEG or WEBP bytes and downsizes the result to the editing bound.
pub fn decode_base_image(bytes: &[u8]) -> CanvasResult<(RgbaImage, ImageFormatKind)> {
    let format = ImageFormatKind::sniff(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|source| CanvasError::Decode { source })?
        .to_rgba8();
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(CanvasError::EmptyImage);
    }

    let (width, height) = fit_within(decoded.width(), decoded.height(), MAX_BASE_DIMENSION);
    if (width, height) == decoded.dimensions() {
        return Ok((decoded, format));
    }

    tracing::debug!(
        from_width = decoded.width(),
        from_height = decoded.height(),
        width,
        height,
        "downscaling base image"
    );
    let resized = imageops::resize(&decoded, width, height, imageops::FilterType::Triangle);
    Ok((resized, format))
}
