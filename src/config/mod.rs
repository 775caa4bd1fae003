//! Configuration management for MotionBox
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use motionbox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Triangle ticks every {}", config.triangle.step_interval);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `MOTIONBOX__<section>__<key>`
//!
//! Examples:
//! - `MOTIONBOX__DISPLAY__STEP_SPEED=0.5`
//! - `MOTIONBOX__TRIANGLE__STEP_INTERVAL=4ms`
//! - `MOTIONBOX__SHUTDOWN__STOP_ATTEMPTS=10`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/motionbox.toml`.
//! This can be overridden using the `MOTIONBOX_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    CanvasConfig, Config, DisplayConfig, LabelConfig, ShutdownConfig, TelemetryConfig,
    TriangleConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`MOTIONBOX__*`)
    /// 2. TOML file (default: `config/motionbox.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (degenerate polygon, bad speeds, label off canvas, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Run validation on a configuration built in code
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
