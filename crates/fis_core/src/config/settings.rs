//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::limits::DEFAULT_FRAME_RATE;
use crate::logging::LogLevel;
use crate::models::Tier;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Session defaults.
    #[serde(default)]
    pub session: SessionSettings,

    /// Progress simulation tuning.
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Path configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format (progress only logged at step intervals).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Number of recent lines to show when a job fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Write a log file per job under `paths.logs_folder`.
    #[serde(default = "default_true")]
    pub job_log_files: bool,
}

fn default_true() -> bool {
    true
}

fn default_progress_step() -> u32 {
    20
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            progress_step: default_progress_step(),
            error_tail: default_error_tail(),
            job_log_files: true,
        }
    }
}

/// Defaults applied to a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Tier granted to sessions started from this installation.
    #[serde(default)]
    pub tier: Tier,

    /// Initial frames-per-image value.
    #[serde(default = "default_frames_per_image")]
    pub frames_per_image: u32,

    /// Initial frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_frames_per_image() -> u32 {
    24
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tier: Tier::Free,
            frames_per_image: default_frames_per_image(),
            frame_rate: default_frame_rate(),
        }
    }
}

/// Tuning for the simulated progress source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Delay between progress updates.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Frames "generated" per tick for interpolation jobs.
    #[serde(default = "default_frames_per_tick")]
    pub frames_per_tick: f64,

    /// Upper bound on ticks before an interpolation job reaches its last
    /// frame. Large jobs advance faster so the run length stays bounded.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,

    /// Percentage added per tick for sketch jobs.
    #[serde(default = "default_sketch_percent_per_tick")]
    pub sketch_percent_per_tick: f64,

    /// Highest value reported before the terminal update.
    #[serde(default = "default_hold_ceiling")]
    pub hold_ceiling: f64,

    /// Pause between reaching the ceiling and completing.
    #[serde(default = "default_finish_delay_ms")]
    pub finish_delay_ms: u64,

    /// Artifact location reported on completion.
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_frames_per_tick() -> f64 {
    1.5
}

fn default_max_ticks() -> u32 {
    150
}

fn default_sketch_percent_per_tick() -> f64 {
    7.5
}

fn default_hold_ceiling() -> f64 {
    95.0
}

fn default_finish_delay_ms() -> u64 {
    500
}

fn default_placeholder_url() -> String {
    "https://images.unsplash.com/photo-1485827404703-89b55fcc595e?w=512&h=512&fit=crop"
        .to_string()
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            frames_per_tick: default_frames_per_tick(),
            max_ticks: default_max_ticks(),
            sketch_percent_per_tick: default_sketch_percent_per_tick(),
            hold_ceiling: default_hold_ceiling(),
            finish_delay_ms: default_finish_delay_ms(),
            placeholder_url: default_placeholder_url(),
        }
    }
}

impl SimulationSettings {
    /// Replace out-of-range values with defaults.
    ///
    /// Returns the names of the fields that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let mut reset = Vec::new();
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = default_tick_interval_ms();
            reset.push("tick_interval_ms");
        }
        if !(self.frames_per_tick > 0.0 && self.frames_per_tick.is_finite()) {
            self.frames_per_tick = default_frames_per_tick();
            reset.push("frames_per_tick");
        }
        if self.max_ticks == 0 {
            self.max_ticks = default_max_ticks();
            reset.push("max_ticks");
        }
        if !(self.sketch_percent_per_tick > 0.0 && self.sketch_percent_per_tick.is_finite()) {
            self.sketch_percent_per_tick = default_sketch_percent_per_tick();
            reset.push("sketch_percent_per_tick");
        }
        if !(self.hold_ceiling > 0.0 && self.hold_ceiling < 100.0) {
            self.hold_ceiling = default_hold_ceiling();
            reset.push("hold_ceiling");
        }
        reset
    }
}

/// Configuration sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Session,
    Simulation,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Session,
        ConfigSection::Simulation,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Session => "session",
            ConfigSection::Simulation => "simulation",
        }
    }

    /// Comment written above the section in a generated file.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Working directories",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Session => {
                "# Session defaults (tier is normally granted by the account service)"
            }
            ConfigSection::Simulation => "# Simulated progress tuning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[session]"));
        assert!(toml.contains("tier = \"free\""));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[session]\ntier = \"premium\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.session.tier, Tier::Premium);
        assert_eq!(parsed.session.frames_per_image, 24);
        assert!(parsed.logging.compact);
        assert_eq!(parsed.simulation.tick_interval_ms, 200);
    }

    #[test]
    fn sanitize_resets_invalid_simulation_values() {
        let mut sim = SimulationSettings {
            tick_interval_ms: 0,
            frames_per_tick: -1.0,
            max_ticks: 0,
            sketch_percent_per_tick: f64::NAN,
            hold_ceiling: 100.0,
            ..SimulationSettings::default()
        };
        let reset = sim.sanitize();
        assert_eq!(reset.len(), 5);
        assert_eq!(sim, SimulationSettings::default());
    }
}
