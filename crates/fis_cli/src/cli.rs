use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fis_core::models::Tier;

#[derive(Parser)]
#[command(name = "frame-studio", version, about = "Frame interpolation and sketch-to-image studio")]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, default_value = ".config/settings.toml")]
    pub config: PathBuf,
    /// Log debug output regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show tier limits
    Limits(LimitsOpts),
    /// Expand images into interpolated frame sequences
    Interpolate(InterpolateOpts),
    /// Turn a sketch and a prompt into an image
    Sketch(SketchOpts),
    /// Inspect or edit the settings file
    Config(ConfigOpts),
    Version,
}

#[derive(clap::Args)]
pub struct LimitsOpts {
    #[arg(short, long)]
    pub tier: Option<Tier>,
}

#[derive(clap::Args)]
pub struct InterpolateOpts {
    /// Frames generated per image
    #[arg(short, long)]
    pub frames: Option<u32>,
    /// Output frame rate
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(short, long)]
    pub tier: Option<Tier>,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct SketchOpts {
    #[arg(short, long)]
    pub prompt: String,
    #[arg(short, long)]
    pub tier: Option<Tier>,
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Init,
    /// Set the tier granted to new sessions
    Tier { tier: Tier },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_interpolate() {
        let cli = Cli::parse_from([
            "frame-studio",
            "interpolate",
            "--frames",
            "12",
            "--tier",
            "Premium",
            "a.png",
            "b.png",
        ]);
        match cli.command {
            Commands::Interpolate(opts) => {
                assert_eq!(opts.frames, Some(12));
                assert_eq!(opts.tier, Some(Tier::Premium));
                assert_eq!(opts.files.len(), 2);
            }
            _ => panic!("expected interpolate"),
        }
    }

    #[test]
    fn rejects_unknown_tier() {
        assert!(Cli::try_parse_from(["frame-studio", "limits", "--tier", "gold"]).is_err());
    }
}
