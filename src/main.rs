//! Command-line front end: masks and edits images through the configured image service.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use maskcraft::app::{download_file_name, DownloadArtifact, EditOptions, InputFile, Session};
use maskcraft::canvas::encode_png;
use maskcraft::config::{load_app_config, AppConfig};
use maskcraft::remote::{
    CancelToken, HttpImageService, StylePreset, UpscaleFactor, UpscaleRequest, UpscaleService,
};
use maskcraft::storage::{ArtifactStorage, StorageService};
use maskcraft::{logging, session_from_config};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "maskcraft")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory results are written to
    #[arg(short, long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment the subject and save the resulting binary mask
    Automask {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Regenerate the masked region of an image from a text instruction
    Edit {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Binary mask PNG; opaque pixels are edited
        #[arg(long, value_name = "PNG")]
        mask: PathBuf,

        #[arg(short, long)]
        prompt: String,

        /// What the result should avoid
        #[arg(long)]
        negative: Option<String>,

        #[arg(long, value_parser = parse_style, default_value = "none")]
        style: StylePreset,
    },
    /// Enlarge an image with the upscale service
    Upscale {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        #[arg(short, long, value_parser = parse_factor)]
        factor: UpscaleFactor,
    },
}

fn parse_style(value: &str) -> Result<StylePreset, String> {
    StylePreset::parse(value).ok_or_else(|| {
        let known: Vec<_> = StylePreset::ALL.iter().map(|style| style.as_str()).collect();
        format!("unknown style {value:?}; expected one of {}", known.join(", "))
    })
}

fn parse_factor(value: &str) -> Result<UpscaleFactor, String> {
    let factor: u32 = value.parse().map_err(|_| format!("{value:?} is not a number"))?;
    UpscaleFactor::try_from(factor).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_verbosity(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => load_app_config(),
    };
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.resolved_output_dir());
    let service = StorageService::with_output_dir(output_dir);
    let storage: &dyn ArtifactStorage = &service;

    let artifact = match cli.command {
        Command::Automask { image } => run_automask(&config, &image)?,
        Command::Edit {
            image,
            mask,
            prompt,
            negative,
            style,
        } => {
            let options = EditOptions {
                instruction: prompt,
                negative_instruction: negative,
                style,
            };
            run_edit(&config, &image, &mask, &options)?
        }
        Command::Upscale { image, factor } => run_upscale(&config, &image, factor)?,
    };

    let path = storage
        .save_download(&artifact)
        .with_context(|| format!("failed to save {}", artifact.file_name))?;
    println!("{}", path.display());
    Ok(())
}

fn open_session(config: &AppConfig, image: &Path) -> Result<Session> {
    let mut session = session_from_config(config)?;
    let file = InputFile::from_path(image)
        .with_context(|| format!("failed to read {}", image.display()))?;
    let (width, height) = session
        .load_files(&[file])
        .with_context(|| format!("failed to load {}", image.display()))?;
    tracing::debug!(width, height, "working image ready");
    Ok(session)
}

fn finish_remote(session: &mut Session) -> Result<()> {
    let outcome = session
        .wait_remote()
        .ok_or_else(|| anyhow!("no remote request was pending"))?;
    outcome
        .result
        .with_context(|| format!("{} did not complete", outcome.kind.label()))
}

fn run_automask(config: &AppConfig, image: &Path) -> Result<DownloadArtifact> {
    let mut session = open_session(config, image)?;
    session.start_auto_mask()?;
    finish_remote(&mut session)?;
    Ok(session.mask_download()?)
}

fn run_edit(
    config: &AppConfig,
    image: &Path,
    mask: &Path,
    options: &EditOptions,
) -> Result<DownloadArtifact> {
    let mut session = open_session(config, image)?;
    let mask_png =
        std::fs::read(mask).with_context(|| format!("failed to read {}", mask.display()))?;
    session
        .import_mask(&mask_png)
        .with_context(|| format!("failed to load mask {}", mask.display()))?;
    session.submit_edit(options)?;
    finish_remote(&mut session)?;
    Ok(session.download()?)
}

// Upscaling a file on disk has no prior edit, so the service is called directly
// with the image at its original size.
fn run_upscale(config: &AppConfig, path: &Path, factor: UpscaleFactor) -> Result<DownloadArtifact> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();

    let service = HttpImageService::new(
        &config.endpoint,
        config.api_key(),
        config.request_timeout(),
    )?;
    let request = UpscaleRequest {
        image_png: encode_png(&decoded)?,
        factor,
    };
    let response = service.upscale(&request, &CancelToken::new())?;
    let upscaled = image::load_from_memory(&response)
        .context("upscale service returned an unreadable image")?
        .to_rgba8();
    tracing::info!(
        width = upscaled.width(),
        height = upscaled.height(),
        factor = factor.value(),
        "image upscaled"
    );
    Ok(DownloadArtifact {
        file_name: download_file_name(Some(factor)),
        png: encode_png(&upscaled)?,
    })
}
