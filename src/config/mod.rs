use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::editor::{StrokeStyle, DEFAULT_ACCENT_COLOR, DEFAULT_FILL_TOLERANCE};
use crate::geometry::Color;

const APP_DIR: &str = "maskcraft";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";
const DEFAULT_API_KEY_ENV: &str = "MASKCRAFT_API_KEY";
const DEFAULT_BRUSH_SIZE: u32 = 30;
const DEFAULT_BRUSH_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Application-level settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub request_timeout_secs: Option<u64>,
    pub accent_color: [u8; 3],
    pub brush_size: u32,
    pub brush_opacity: f32,
    pub fill_tolerance: u8,
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: None,
            accent_color: [
                DEFAULT_ACCENT_COLOR.r,
                DEFAULT_ACCENT_COLOR.g,
                DEFAULT_ACCENT_COLOR.b,
            ],
            brush_size: DEFAULT_BRUSH_SIZE,
            brush_opacity: DEFAULT_BRUSH_OPACITY,
            fill_tolerance: DEFAULT_FILL_TOLERANCE,
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// Strict load; used when the caller names the file explicitly.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Brush settings with out-of-range values clamped.
    pub fn stroke_style(&self) -> StrokeStyle {
        let [r, g, b] = self.accent_color;
        StrokeStyle::new(self.brush_size, self.brush_opacity, Color::new(r, g, b))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Bearer token from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        let (_, home) = config_env_dirs();
        default_output_dir(home.as_deref())
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(?err, "no config directory; using defaults");
            return AppConfig::default();
        }
    };
    if !path.exists() {
        return AppConfig::default();
    }
    AppConfig::from_path(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, "using default configuration");
        AppConfig::default()
    })
}

fn default_output_dir(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join("Pictures"),
        None => PathBuf::from("."),
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
