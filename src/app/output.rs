use crate::remote::UpscaleFactor;

const DOWNLOAD_STEM: &str = "edited-image";
pub const MASK_FILE_NAME: &str = "mask.png";

/// A finished image ready to be offered as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub png: Vec<u8>,
}

pub fn download_file_name(upscaled: Option<UpscaleFactor>) -> String {
    match upscaled {
        Some(factor) => format!("{DOWNLOAD_STEM}-upscaled-{}x.png", factor.value()),
        None => format!("{DOWNLOAD_STEM}.png"),
    }
}
