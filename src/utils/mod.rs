//! Utility module for the player core
//!
//! This module provides common utilities used throughout the library:
//! - Error handling with custom error types
//! - Configuration management
//! - Observable user preferences
//! - Index helpers for circular navigation

pub mod config;
pub mod error;
pub mod preferences;

// Re-export commonly used items
pub use config::{Config, ControlsConfig, PlayerConfig, PreloadConfig, RetryPolicy, WatchConfig};
pub use error::{IptvError, Result};
pub use preferences::{PreferenceStore, PreferenceSubscription, Preferences, ThemeMode};

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Circular successor index in a collection of `len` items
pub fn wrap_next(index: usize, len: usize) -> usize {
    (index + 1) % len
}

/// Circular predecessor index in a collection of `len` items
pub fn wrap_prev(index: usize, len: usize) -> usize {
    (index + len - 1) % len
}
