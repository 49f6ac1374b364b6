//! Configuration management for playerkit
//!
//! This module handles loading and persisting player configuration as JSON
//! under the user configuration directory.

use crate::utils::error::{IntoPlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main player configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerConfig {
    /// Playback behaviour
    pub playback: PlaybackConfig,

    /// Full screen transition behaviour
    pub transition: TransitionConfig,
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Mute the engine when it is attached
    pub start_muted: bool,

    /// Start playback as soon as the engine reports ready
    pub autoplay: bool,

    /// Step applied by the forward/backward seek buttons, in seconds
    pub seek_step_secs: f64,

    /// Interval between periodic time callbacks, in seconds
    pub tick_interval_secs: f64,

    /// Pause playback when the app enters the background
    pub pause_in_background: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_muted: true,
            autoplay: false,
            seek_step_secs: 10.0,
            tick_interval_secs: 0.5,
            pause_in_background: true,
        }
    }
}

/// Full screen transition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Open/close full screen when the device rotates
    pub expand_on_rotation: bool,

    /// Duration of the open/close animation, in seconds
    pub duration_secs: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            expand_on_rotation: true,
            duration_secs: 0.3,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from the given path, falling back to defaults when
    /// the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).config_err("Parsing configuration")
    }

    /// Persist configuration to the given path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self).config_err("Serializing configuration")?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("playerkit");
        path.push("config.json");
        path
    }
}
