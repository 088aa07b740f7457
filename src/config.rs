use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio_system::effects::DEFAULT_FADE_SECONDS;
use crate::audio_system::DEFAULT_MAX_CHANNELS;
use crate::error::ConfigError;

fn default_volume() -> f32 {
    1.0
}

fn default_fade_seconds() -> f32 {
    DEFAULT_FADE_SECONDS
}

fn default_max_channels() -> usize {
    DEFAULT_MAX_CHANNELS
}

fn default_tick_hz() -> u32 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Master bus volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub master_volume: f32,

    /// Effects group volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub effects_volume: f32,

    /// Music group volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub music_volume: f32,

    /// Seconds for a music fade from silence to full volume
    #[serde(default = "default_fade_seconds")]
    pub fade_seconds: f32,

    /// Maximum simultaneous channels on the output device
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,

    /// Update rate of the playback loop
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Effects to preload at startup
    #[serde(default)]
    pub effects: Vec<String>,

    /// Music tracks to preload at startup
    #[serde(default)]
    pub music: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            effects_volume: 1.0,
            music_volume: 1.0,
            fade_seconds: DEFAULT_FADE_SECONDS,
            max_channels: DEFAULT_MAX_CHANNELS,
            tick_hz: 60,
            effects: Vec::new(),
            music: Vec::new(),
        }
    }
}

impl AudioConfig {
    /// Load configuration from the platform config directory.
    /// Creates a default config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it's missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_err = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| load_err(Box::new(e)))?;
            let config: AudioConfig =
                serde_json::from_str(&content).map_err(|e| load_err(Box::new(e)))?;
            config.validate()?;

            tracing::info!("Loaded config from: {}", path.display());
            Ok(config)
        } else {
            let config = AudioConfig::default();
            config.save_to(path)?;
            tracing::info!("Created default config at: {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_err(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_err(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_err(Box::new(e)))?;

        Ok(())
    }

    /// Reject values the playback loop can't work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let volumes = [
            ("master_volume", self.master_volume),
            ("effects_volume", self.effects_volume),
            ("music_volume", self.music_volume),
        ];
        for (name, volume) in volumes {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0.0 and 1.0 (got {})",
                    name, volume
                )));
            }
        }

        if !self.fade_seconds.is_finite() || self.fade_seconds <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fade_seconds must be positive (got {})",
                self.fade_seconds
            )));
        }
        if self.max_channels == 0 {
            return Err(ConfigError::Invalid("max_channels must be at least 1".to_string()));
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::Invalid("tick_hz must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Get the config file path (in the user config folder)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("Soundstage").join("config.json"))
    }
}
