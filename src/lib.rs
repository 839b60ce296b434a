pub mod app;
pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod mask;
pub mod remote;
pub mod state;
pub mod storage;
pub use error::{AppError, AppResult};

use app::{Services, Session};
use config::AppConfig;
use remote::HttpImageService;

/// Builds a session wired to the HTTP image service named in `config`.
pub fn session_from_config(config: &AppConfig) -> AppResult<Session> {
    let service = HttpImageService::new(
        &config.endpoint,
        config.api_key(),
        config.request_timeout(),
    )?;
    tracing::info!(endpoint = service.endpoint(), "image service configured");
    Ok(Session::new(
        Services::from_http(service),
        config.stroke_style(),
        config.fill_tolerance,
    ))
}
