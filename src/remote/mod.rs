//! Request/response boundary to the generative image services.

mod http;
mod prompt;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::canvas::ImageFormatKind;

pub use http::HttpImageService;
pub use prompt::{compose_prompt, StylePreset, MASK_SCOPE_DIRECTIVE};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("service rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("service returned no image data")]
    MissingPayload,
    #[error("request cancelled")]
    Cancelled,
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Shared flag a dispatcher flips to tell in-flight work its result is no longer wanted.
///
/// There is no way to abort a request already on the wire; services check the
/// token before sending and after receiving.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> RemoteResult<()> {
        if self.is_cancelled() {
            Err(RemoteError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormatKind,
}

impl ImagePayload {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormatKind::Png,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub instruction: String,
    pub negative_instruction: Option<String>,
    pub style: StylePreset,
    pub image: ImagePayload,
    /// Binary mask PNG: opaque pixels may be edited, transparent ones must stay.
    pub mask_png: Vec<u8>,
}

impl EditRequest {
    /// Instruction text as sent, with the style modifier and mask directive appended.
    pub fn prompt(&self) -> String {
        compose_prompt(&self.instruction, self.style)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationRequest {
    pub image: ImagePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpscaleFactor {
    X2,
    X4,
}

impl UpscaleFactor {
    pub const fn value(self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X4 => 4,
        }
    }
}

impl TryFrom<u32> for UpscaleFactor {
    type Error = RemoteError;

    fn try_from(value: u32) -> RemoteResult<Self> {
        match value {
            2 => Ok(Self::X2),
            4 => Ok(Self::X4),
            other => Err(RemoteError::InvalidRequest {
                message: format!("upscale factor must be 2 or 4, got {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleRequest {
    pub image_png: Vec<u8>,
    pub factor: UpscaleFactor,
}

pub trait EditService: Send + Sync {
    /// Returns the edited image as PNG bytes.
    fn edit(&self, request: &EditRequest, cancel: &CancelToken) -> RemoteResult<Vec<u8>>;
}

pub trait SegmentationService: Send + Sync {
    /// Returns a same-size image with near-white background and near-black subject.
    fn segment(&self, request: &SegmentationRequest, cancel: &CancelToken)
        -> RemoteResult<Vec<u8>>;
}

pub trait UpscaleService: Send + Sync {
    fn upscale(&self, request: &UpscaleRequest, cancel: &CancelToken) -> RemoteResult<Vec<u8>>;
}
