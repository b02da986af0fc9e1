//! Configuration file handling for the demo tools.
//!
//! Loads configuration from `~/.config/stereo-demos/config.toml`, the path
//! in `STEREO_DEMOS_CONFIG`, or an explicit path. Every field is optional.
//! A file named through `STEREO_DEMOS_CONFIG` must exist and parse; the
//! default location falls back to defaults with a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::camera::sim::DEFAULT_SVO_FRAMES;
use crate::depth::BOX_SIZE;
use crate::doctor::DEFAULT_DURATION;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "STEREO_DEMOS_CONFIG";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub depth: DepthConfig,
    #[serde(default)]
    pub doctor: DoctorConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CaptureConfig {
    #[serde(default = "default_svo_path")]
    pub svo_path: PathBuf,
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            svo_path: default_svo_path(),
            video_path: default_video_path(),
        }
    }
}

fn default_svo_path() -> PathBuf {
    PathBuf::from("record.svo")
}

fn default_video_path() -> PathBuf {
    PathBuf::from("./record.framelog")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DepthConfig {
    /// Side of the centered averaging box, pixels
    #[serde(default = "default_box_size")]
    pub box_size: usize,
    /// Console refresh period when the GUI is off
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            box_size: default_box_size(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

impl DepthConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

fn default_box_size() -> usize {
    BOX_SIZE
}

fn default_report_interval_ms() -> u64 {
    200
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DoctorConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
}

impl Default for DoctorConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
        }
    }
}

impl DoctorConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

fn default_duration_secs() -> u64 {
    DEFAULT_DURATION.as_secs()
}

/// Simulated backend settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_svo_frames")]
    pub svo_frames: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            svo_frames: default_svo_frames(),
        }
    }
}

fn default_svo_frames() -> u64 {
    DEFAULT_SVO_FRAMES
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        let config = config.validate(&path)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a file the user named explicitly. It must exist.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::load(Some(path))
    }

    /// Settings for a tool run.
    ///
    /// An explicitly named file must load cleanly. Problems with the file
    /// at the default location only produce a warning and the defaults.
    pub fn load_for_run(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_explicit(path);
        }
        match Self::load(None) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        }
    }

    /// Load from `STEREO_DEMOS_CONFIG` if set, else from the default location.
    pub fn load_default() -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_for_run(from_env.as_deref())
    }

    fn validate(self, path: &Path) -> Result<Self, ConfigError> {
        if self.depth.report_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "depth.report_interval_ms must be at least 1".to_string(),
            });
        }
        if self.depth.box_size == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "depth.box_size must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("Invalid config file '{}': {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("stereo-demos").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/stereo-demos/config.toml")
        })
}
