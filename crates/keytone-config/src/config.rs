//! Engine configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::validation::{
    BLOCK_SIZE_RANGE, BUFFER_SIZE_RANGE, CHANNELS_RANGE, MIN_NODES, SAMPLE_RATE_RANGE,
    TICK_INTERVAL_RANGE, ValidationError, ValidationResult, check_min, check_range,
};

/// Complete engine configuration.
///
/// Every section and every field has a default, so an empty file is a valid
/// configuration.
///
/// # TOML Format
///
/// ```toml
/// [audio]
/// sample_rate = 48000
/// buffer_size = 512
/// channels = 2
/// # output_device = "pulse"
///
/// [engine]
/// max_nodes = 4096
/// block_size = 128
/// tick_interval_ms = 20
/// # seed = 7
///
/// [defaults]
/// sound_enabled = true
/// typing_sound_enabled = true
/// background_music_enabled = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Output device settings.
    pub audio: AudioConfig,
    /// Graph and scheduling settings.
    pub engine: EngineSettings,
    /// Initial enable flags.
    pub defaults: DefaultFlags,
}

/// Output device settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Device buffer size in frames.
    pub buffer_size: u32,
    /// Interleaved output channels; every channel carries the same mono mix.
    pub channels: u16,
    /// Output device name; the host default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            channels: 2,
            output_device: None,
        }
    }
}

/// Graph and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on live graph nodes.
    pub max_nodes: usize,
    /// Frames rendered between scheduler ticks when rendering offline.
    pub block_size: usize,
    /// Scheduler tick interval for live playback.
    pub tick_interval_ms: u64,
    /// Seed for track selection; drawn from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_nodes: 4096,
            block_size: 128,
            tick_interval_ms: 20,
            seed: None,
        }
    }
}

impl EngineSettings {
    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Flags the engine starts with before the first snapshot arrives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultFlags {
    /// Master sound switch.
    pub sound_enabled: bool,
    /// Keystroke clicks.
    pub typing_sound_enabled: bool,
    /// Background music.
    pub background_music_enabled: bool,
}

impl Default for DefaultFlags {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            typing_sound_enabled: true,
            background_music_enabled: false,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> ValidationResult {
        let audio = &self.audio;
        check_range(
            "audio.sample_rate",
            u64::from(audio.sample_rate),
            SAMPLE_RATE_RANGE,
        )?;
        check_range(
            "audio.buffer_size",
            u64::from(audio.buffer_size),
            BUFFER_SIZE_RANGE,
        )?;
        check_range("audio.channels", u64::from(audio.channels), CHANNELS_RANGE)?;
        if let Some(device) = &audio.output_device
            && device.trim().is_empty()
        {
            return Err(ValidationError::Empty("audio.output_device"));
        }

        let engine = &self.engine;
        check_min("engine.max_nodes", engine.max_nodes as u64, MIN_NODES)?;
        check_range(
            "engine.block_size",
            engine.block_size as u64,
            BLOCK_SIZE_RANGE,
        )?;
        check_range(
            "engine.tick_interval_ms",
            engine.tick_interval_ms,
            TICK_INTERVAL_RANGE,
        )?;
        Ok(())
    }
}
