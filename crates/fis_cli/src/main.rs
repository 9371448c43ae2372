mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;
use fis_core::config::{ConfigManager, ConfigSection};
use fis_core::limits::{get_limits, MAX_FILE_SIZE, SUPPORTED_IMAGE_FORMATS};
use fis_core::logging::{self, LogLevel};
use fis_core::models::{JobKind, Tier};
use fis_core::session::{ConfiguredTier, Notice, SessionMsg};
use tracing::info;

use crate::app::{describe_file, describe_files, print_notice, succeeded, App};
use crate::cli::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut manager = ConfigManager::new(&cli.config);
    let init = matches!(
        &cli.command,
        Commands::Config(opts) if matches!(opts.action, ConfigAction::Init)
    );
    if init {
        manager.load_or_create()?;
    } else if manager.path().exists() {
        manager.load()?;
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        manager.settings().logging.level
    };
    logging::init_tracing(level);

    match cli.command {
        Commands::Limits(opts) => {
            let tiers: Vec<Tier> = match opts.tier {
                Some(tier) => vec![tier],
                None => Tier::ALL.to_vec(),
            };
            for tier in tiers {
                let limits = get_limits(tier);
                println!("{} tier", tier.name());
                println!("  images per batch:     {}", limits.max_images);
                println!("  frames per image:     {}", limits.max_frames_per_image);
                println!("  total frames:         {}", limits.max_total_frames);
                println!("  processing timeout:   {}s", limits.processing_timeout().as_secs());
            }
            println!(
                "Accepted formats: {} (max {} MB each)",
                SUPPORTED_IMAGE_FORMATS.join(", "),
                MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        Commands::Interpolate(opts) => {
            let files = match describe_files(&opts.files) {
                Ok(files) => files,
                Err(e) => {
                    print_notice(&Notice::error(e.title(), e.description()));
                    return Ok(ExitCode::FAILURE);
                }
            };
            let settings = manager.settings().clone();
            let resolver = ConfiguredTier::new(opts.tier.unwrap_or(settings.session.tier));
            let frames = opts.frames.unwrap_or(settings.session.frames_per_image);
            let fps = opts.fps.unwrap_or(settings.session.frame_rate);

            info!(images = files.len(), frames, fps, "Submitting interpolation job");
            let mut app = App::new(settings, Some(manager.logs_folder()), &resolver);
            let state = app
                .run(vec![
                    SessionMsg::SwitchView(JobKind::Interpolation),
                    SessionMsg::FilesSelected(files),
                    SessionMsg::FramesPerImageChanged(frames),
                    SessionMsg::FrameRateChanged(fps),
                    SessionMsg::Submit,
                ])
                .await;

            if !succeeded(state) {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(url) = state.artifact_url() {
                println!("{}", url);
            }
        }
        Commands::Sketch(opts) => {
            let sketch = match describe_file(&opts.file) {
                Ok(sketch) => sketch,
                Err(e) => {
                    print_notice(&Notice::error(e.title(), e.description()));
                    return Ok(ExitCode::FAILURE);
                }
            };
            let settings = manager.settings().clone();
            let resolver = ConfiguredTier::new(opts.tier.unwrap_or(settings.session.tier));

            info!(sketch = %sketch.name, "Submitting sketch job");
            let mut app = App::new(settings, Some(manager.logs_folder()), &resolver);
            let state = app
                .run(vec![
                    SessionMsg::SwitchView(JobKind::SketchToImage),
                    SessionMsg::SketchSelected(sketch),
                    SessionMsg::PromptChanged(opts.prompt),
                    SessionMsg::Submit,
                ])
                .await;

            if !succeeded(state) {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(url) = state.artifact_url() {
                println!("{}", url);
            }
        }
        Commands::Config(opts) => match opts.action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(manager.settings())?);
            }
            ConfigAction::Init => {
                info!("Configuration file ready at {}", manager.path().display());
            }
            ConfigAction::Tier { tier } => {
                manager.settings_mut().session.tier = tier;
                manager.update_section(ConfigSection::Session)?;
                info!("Session tier set to {}", tier);
            }
        },
        Commands::Version => {
            println!("frame-studio {}", fis_core::version());
        }
    }

    Ok(ExitCode::SUCCESS)
}
