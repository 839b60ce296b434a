use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::app::DownloadArtifact;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid artifact file name: {0:?}")]
    InvalidFileName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

pub trait ArtifactStorage {
    fn save_download(&self, artifact: &DownloadArtifact) -> StorageResult<PathBuf>;
}

/// Writes finished downloads into one output directory, replacing same-named files.
#[derive(Debug, Clone)]
pub struct StorageService {
    output_dir: PathBuf,
}

impl StorageService {
    pub const fn with_output_dir(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn target_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.output_dir.join(file_name))
    }

    pub fn save_download(&self, artifact: &DownloadArtifact) -> StorageResult<PathBuf> {
        let target = self.target_path(&artifact.file_name)?;
        save_overwrite(&artifact.png, &target)?;
        tracing::info!(
            path = %target.display(),
            bytes = artifact.png.len(),
            "download saved"
        );
        Ok(target)
    }
}

impl ArtifactStorage for StorageService {
    fn save_download(&self, artifact: &DownloadArtifact) -> StorageResult<PathBuf> {
        self.save_download(artifact)
    }
}

fn validate_file_name(file_name: &str) -> StorageResult<()> {
    let plain = Path::new(file_name)
        .file_name()
        .is_some_and(|name| name == file_name);
    if file_name.is_empty() || !plain {
        return Err(StorageError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

// Bytes land in a sibling file first so a failed write never truncates an earlier download.
fn save_overwrite(bytes: &[u8], destination: &Path) -> StorageResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut staging = destination.as_os_str().to_owned();
    staging.push(PARTIAL_SUFFIX);
    let staging = PathBuf::from(staging);

    if let Err(err) = fs::write(&staging, bytes) {
        let _ = fs::remove_file(&staging);
        return Err(StorageError::Io(err));
    }
    fs::rename(&staging, destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_service(name: &str) -> StorageService {
        let dir = std::env::temp_dir().join(format!(
            "maskcraft-storage-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        StorageService::with_output_dir(dir)
    }

    fn artifact(file_name: &str, png: &[u8]) -> DownloadArtifact {
        DownloadArtifact {
            file_name: file_name.to_string(),
            png: png.to_vec(),
        }
    }

    #[test]
    fn target_path_joins_output_dir_and_name() {
        let service = StorageService::with_output_dir(PathBuf::from("/home/test/Pictures"));
        let path = service.target_path("edited-image.png").unwrap();
        assert_eq!(path, PathBuf::from("/home/test/Pictures/edited-image.png"));
    }

    #[test]
    fn file_names_with_separators_are_rejected() {
        let service = StorageService::with_output_dir(PathBuf::from("/tmp"));
        for name in ["", "../escape.png", "nested/edited.png", ".."] {
            assert!(
                matches!(
                    service.target_path(name),
                    Err(StorageError::InvalidFileName(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn save_creates_directory_and_overwrites_previous_download() {
        let service = scratch_service("overwrite");

        let first = service
            .save_download(&artifact("edited-image.png", b"first"))
            .expect("first save");
        assert_eq!(fs::read(&first).unwrap(), b"first");

        let second = service
            .save_download(&artifact("edited-image.png", b"second"))
            .expect("second save");
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");

        let leftovers: Vec<_> = fs::read_dir(service.output_dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(PARTIAL_SUFFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn trait_object_saves_through_service() {
        let service = scratch_service("trait");
        let storage: &dyn ArtifactStorage = &service;
        let path = storage
            .save_download(&artifact("edited-image-upscaled-2x.png", b"png"))
            .expect("save through trait");
        assert!(path.ends_with("edited-image-upscaled-2x.png"));
    }
}
