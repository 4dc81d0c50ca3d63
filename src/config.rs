// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{self, detection, preview};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name of the persisted configuration inside the config directory
const CONFIG_FILE: &str = "config.json";

/// A settings application launched by the permission alert
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SettingsCommand {
    /// Executable name looked up in `PATH`
    pub program: String,
    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

impl SettingsCommand {
    pub fn new(program: &str, arg: &str) -> Self {
        Self {
            program: program.to_string(),
            args: if arg.is_empty() {
                Vec::new()
            } else {
                vec![arg.to_string()]
            },
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Last used camera device path
    pub last_camera_path: Option<String>,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Minimum time between two detection passes, in milliseconds
    pub decode_interval_ms: u64,
    /// Frames are downscaled to this size before detection
    pub detector_max_dimension: u32,
    /// Skip the `Detected` notification when the same value is read twice in a row
    pub suppress_repeats: bool,
    /// URI opened by "Open Settings" instead of launching a settings application
    pub settings_uri: Option<String>,
    /// Settings applications tried in order by "Open Settings"
    pub settings_commands: Vec<SettingsCommand>,
    /// Capacity of the frame channel between the camera and the decode loop
    pub frame_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_camera_path: None,
            mirror_preview: false,
            decode_interval_ms: detection::DEFAULT_DECODE_INTERVAL_MS,
            detector_max_dimension: detection::DEFAULT_MAX_DIMENSION,
            suppress_repeats: false,
            settings_uri: None,
            settings_commands: constants::DEFAULT_SETTINGS_COMMANDS
                .iter()
                .map(|(program, arg)| SettingsCommand::new(program, arg))
                .collect(),
            frame_channel_capacity: preview::DEFAULT_FRAME_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Directory holding the configuration file
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_ID))
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load the configuration from its default location.
    ///
    /// A missing or unreadable file yields the defaults; the problem is logged.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load the configuration from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file does not exist yet");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config.sanitized())
    }

    /// Persist the configuration to its default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Persist the configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Detection throttle as a `Duration`
    pub fn decode_interval(&self) -> Duration {
        Duration::from_millis(self.decode_interval_ms)
    }

    /// Replace values that would stall the pipeline with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.detector_max_dimension == 0 {
            self.detector_max_dimension = defaults.detector_max_dimension;
        }
        if self.frame_channel_capacity == 0 {
            self.frame_channel_capacity = defaults.frame_channel_capacity;
        }
        self
    }
}
