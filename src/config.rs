//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Environment variables
//! - Configuration files (TOML)
//! - Defaults

use crate::analysis::StationaryOptions;
use crate::analysis::stationary::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::error::{Error, Result};
use crate::generation::GenerationMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when no seed is configured
pub const SEED_ENV_VAR: &str = "MARKOV_LEARN_SEED";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Stationary distribution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Convergence threshold on the infinity norm
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// Sequence generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_length")]
    pub length: usize,

    #[serde(default)]
    pub mode: GenerationMode,

    /// Fixed seed for reproducible walks
    pub seed: Option<u64>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (json, table, dot)
    #[serde(default = "default_format")]
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path
    pub file: Option<PathBuf>,
}

// Default value functions

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_length() -> usize {
    10
}

fn default_format() -> String {
    "table".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            mode: GenerationMode::default(),
            seed: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./markov-learn.toml
    /// 2. ~/.markov-learn/config.toml
    /// 3. /etc/markov-learn/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("markov-learn.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".markov-learn").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/markov-learn/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Generation seed from config or environment.
    ///
    /// `None` means the walk is seeded from the clock.
    pub fn generation_seed(&self) -> Result<Option<u64>> {
        if let Some(seed) = self.generation.seed {
            return Ok(Some(seed));
        }

        match std::env::var(SEED_ENV_VAR) {
            Ok(value) => value.trim().parse::<u64>().map(Some).map_err(|_| {
                Error::Config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    SEED_ENV_VAR, value
                ))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Power-iteration settings from the `[analysis]` section
    pub fn stationary_options(&self) -> StationaryOptions {
        StationaryOptions {
            tolerance: self.analysis.tolerance,
            max_iterations: self.analysis.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.tolerance, 1e-6);
        assert_eq!(config.analysis.max_iterations, 1000);
        assert_eq!(config.generation.length, 10);
        assert_eq!(config.generation.mode, GenerationMode::Probabilistic);
        assert_eq!(config.output.format, "table");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[analysis]
tolerance = 1e-9

[generation]
length = 25
mode = "deterministic"
seed = 7

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.analysis.tolerance, 1e-9);
        assert_eq!(config.analysis.max_iterations, 1000);
        assert_eq!(config.generation.length, 25);
        assert_eq!(config.generation.mode, GenerationMode::Deterministic);
        assert_eq!(config.generation_seed().unwrap(), Some(7));
        assert_eq!(config.output.format, "table");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_stationary_options() {
        let mut config = Config::default();
        config.analysis.max_iterations = 50;
        let options = config.stationary_options();
        assert_eq!(options.max_iterations, 50);
        assert_eq!(options.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/no/such/markov-learn.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
