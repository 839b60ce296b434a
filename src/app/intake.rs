use std::path::Path;

use crate::canvas::{CanvasError, ImageFormatKind};

/// A file handed over by the picker or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, None, bytes))
    }

    /// Declared format: MIME type when the host supplied one, else the file extension.
    pub fn declared_format(&self) -> Option<ImageFormatKind> {
        if let Some(mime) = self.mime_type.as_deref().filter(|mime| !mime.is_empty()) {
            return ImageFormatKind::from_mime(mime);
        }
        Path::new(&self.name)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(ImageFormatKind::from_extension)
    }
}

/// First file wins; it must declare PNG, JPEG or WEBP.
pub fn select_input_file(files: &[InputFile]) -> Result<&InputFile, CanvasError> {
    let file = files.first().ok_or_else(|| CanvasError::UnsupportedFormat {
        detail: "no file provided".to_string(),
    })?;
    if files.len() > 1 {
        tracing::debug!(
            count = files.len(),
            chosen = %file.name,
            "multiple files provided; using the first"
        );
    }
    match file.declared_format() {
        Some(_) => Ok(file),
        None => Err(CanvasError::UnsupportedFormat {
            detail: format!(
                "{} ({})",
                file.name,
                file.mime_type.as_deref().unwrap_or("unknown type")
            ),
        }),
    }
}
