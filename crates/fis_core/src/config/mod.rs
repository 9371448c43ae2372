//! Configuration management for Frame Interpolation Studio.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use fis_core::config::{ConfigManager, ConfigSection};
//! use fis_core::models::Tier;
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Logs folder: {}", config.settings().paths.logs_folder);
//!
//! // Modify a setting
//! config.settings_mut().session.tier = Tier::Premium;
//!
//! // Save just the session section atomically
//! config.update_section(ConfigSection::Session).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, SessionSettings, Settings, SimulationSettings,
};
