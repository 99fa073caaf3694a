//! Configuration management for the player core
//!
//! This module handles loading and managing configuration from config
//! files and environment variables.

use crate::preload::DeviceClass;
use crate::utils::error::{IntoIptvError, IptvError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback engine configuration
    pub player: PlayerConfig,

    /// On-screen controls configuration
    pub controls: ControlsConfig,

    /// Watch-time tracking configuration
    pub watch: WatchConfig,

    /// Neighbor preloading configuration
    pub preload: PreloadConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Playback engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start playback as soon as the stream is ready
    pub auto_play: bool,

    /// Volume applied to new sessions (0.0 to 1.0)
    pub default_volume: f32,

    /// Start new sessions muted
    pub start_muted: bool,

    /// Error events tolerated before a fallback is attempted
    pub max_error_count: u32,

    /// In-place media recovery attempts per load
    pub max_media_recoveries: u32,

    /// Format fallbacks per load
    pub max_fallbacks_per_load: u32,

    /// Network retry budget handed to the adaptive decoder
    pub retry: RetryPolicy,
}

/// Per-stage network retry budget of the adaptive decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Manifest load retries
    pub manifest: u32,

    /// Level (variant playlist) load retries
    pub level: u32,

    /// Fragment load retries
    pub fragment: u32,
}

/// On-screen controls configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Delay before controls hide after the last interaction
    pub hide_delay_ms: u64,
}

/// Watch-time tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Periodic flush interval while playing
    pub flush_interval_secs: u64,

    /// Samples at or below this duration are discarded
    pub min_duration_secs: u64,
}

/// Neighbor preloading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Issue resource hints at all
    pub enabled: bool,

    /// Force a device class instead of detecting it
    pub device_class: Option<DeviceClass>,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Directory for playlists and watch history
    pub data_dir: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play: true,
            default_volume: 1.0,
            start_muted: false,
            max_error_count: 10,
            max_media_recoveries: 1,
            max_fallbacks_per_load: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            manifest: 5,
            level: 5,
            fragment: 5,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { hide_delay_ms: 3000 }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: 30,
            min_duration_secs: 5,
        }
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device_class: None,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/iptvplayer/config.toml on Linux)
    /// 3. User config file (~/.config/iptvplayer/config.toml on Linux)
    /// 4. Environment variables (IPTV_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from an explicit TOML file, then apply env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| IptvError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration as TOML to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Directory used for persisted playlists and watch history
    pub fn data_dir(&self) -> PathBuf {
        self.general.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("iptvplayer")
        })
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("IPTV_LOG_LEVEL") {
            self.general.log_level = level;
        }

        if let Ok(delay) = std::env::var("IPTV_HIDE_DELAY_MS") {
            self.controls.hide_delay_ms = delay
                .parse()
                .map_err(|_| IptvError::Config("Invalid IPTV_HIDE_DELAY_MS".to_string()))?;
        }

        if let Ok(volume) = std::env::var("IPTV_DEFAULT_VOLUME") {
            self.player.default_volume = volume
                .parse()
                .map_err(|_| IptvError::Config("Invalid IPTV_DEFAULT_VOLUME".to_string()))?;
        }

        if let Ok(class) = std::env::var("IPTV_DEVICE_CLASS") {
            self.preload.device_class = Some(class.parse()?);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.default_volume) {
            return Err(IptvError::Config(
                "Default volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.controls.hide_delay_ms == 0 {
            return Err(IptvError::Config("Hide delay must be non-zero".to_string()));
        }

        if self.watch.flush_interval_secs <= self.watch.min_duration_secs {
            return Err(IptvError::Config(
                "Flush interval must exceed the minimum sample duration".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(IptvError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/iptvplayer/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("IptvPlayer").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/IptvPlayer/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// User config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("iptvplayer").join("config.toml"))
    }
}
