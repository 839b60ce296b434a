//! Editing session orchestration: image intake, mask tools, remote work and results.

mod intake;
mod output;
mod session;
mod worker;

use std::sync::Arc;

use thiserror::Error;

use crate::canvas::CanvasError;
use crate::remote::{
    EditService, HttpImageService, RemoteError, SegmentationService, UpscaleService,
};
use crate::state::{SessionPhase, StateError};

pub use intake::{select_input_file, InputFile};
pub use output::{download_file_name, DownloadArtifact, MASK_FILE_NAME};
pub use session::{EditOptions, RemoteOutcome, Session, UpscaledResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    AutoMask,
    Edit,
    Upscale,
}

impl RemoteKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoMask => "auto-mask",
            Self::Edit => "edit",
            Self::Upscale => "upscale",
        }
    }
}

/// Coarse failure class, kept separate so callers can apply per-kind retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Validation,
    Remote,
    MissingPayload,
    Busy,
    NoImage,
    Internal,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load image: {source}")]
    Load {
        #[source]
        source: CanvasError,
    },
    #[error("{message}")]
    Validation { message: String },
    #[error("{} failed: {source}", .operation.label())]
    Remote {
        operation: RemoteKind,
        #[source]
        source: RemoteError,
    },
    #[error("{} returned an unreadable image: {source}", .operation.label())]
    UnreadableResult {
        operation: RemoteKind,
        #[source]
        source: CanvasError,
    },
    #[error("another operation is in progress ({phase:?})")]
    Busy { phase: SessionPhase },
    #[error("no image loaded")]
    NoImage,
    #[error("failed to prepare request: {source}")]
    Encode {
        #[source]
        source: CanvasError,
    },
    #[error(transparent)]
    State(#[from] StateError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } => ErrorKind::Load,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Remote {
                source: RemoteError::MissingPayload,
                ..
            } => ErrorKind::MissingPayload,
            Self::Remote { .. } | Self::UnreadableResult { .. } => ErrorKind::Remote,
            Self::Busy { .. } | Self::State(_) => ErrorKind::Busy,
            Self::NoImage => ErrorKind::NoImage,
            Self::Encode { .. } => ErrorKind::Internal,
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// The three remote capability providers a session talks to.
#[derive(Clone)]
pub struct Services {
    pub edit: Arc<dyn EditService>,
    pub segmentation: Arc<dyn SegmentationService>,
    pub upscale: Arc<dyn UpscaleService>,
}

impl Services {
    pub fn from_http(service: HttpImageService) -> Self {
        let service = Arc::new(service);
        Self {
            edit: service.clone(),
            segmentation: service.clone(),
            upscale: service,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_payload_is_its_own_kind() {
        let err = SessionError::Remote {
            operation: RemoteKind::Edit,
            source: RemoteError::MissingPayload,
        };
        assert_eq!(err.kind(), ErrorKind::MissingPayload);
        assert_eq!(err.to_string(), "edit failed: service returned no image data");

        let err = SessionError::Remote {
            operation: RemoteKind::Upscale,
            source: RemoteError::Network {
                message: "connection refused".to_string(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = SessionError::validation("instruction is empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "instruction is empty");
    }
}
