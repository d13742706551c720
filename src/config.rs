//! TOML-backed settings with atomic writes.
//!
//! Settings cover the embedder-tunable timer intervals. Missing keys fall
//! back to defaults on load; a zero interval is treated as missing and
//! cleaned up, with the cleaned file saved back.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Timer intervals, in milliseconds.
    #[serde(default)]
    pub timers: TimerSettings,
}

/// Timer intervals for the banner animation, input polling, and the detect
/// sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Banner animation tick.
    #[serde(default = "default_banner_tick_ms")]
    pub banner_tick_ms: u64,

    /// Input-signal polling interval.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long a detect sequence holds the device in reacquisition mode.
    #[serde(default = "default_detect_duration_ms")]
    pub detect_duration_ms: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            banner_tick_ms: default_banner_tick_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            detect_duration_ms: default_detect_duration_ms(),
        }
    }
}

fn default_banner_tick_ms() -> u64 {
    200
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_detect_duration_ms() -> u64 {
    2000
}

impl Settings {
    /// Replace zero intervals with their defaults. Returns whether anything
    /// was changed.
    fn clean(&mut self) -> bool {
        let defaults = TimerSettings::default();
        let mut changed = false;
        if self.timers.banner_tick_ms == 0 {
            self.timers.banner_tick_ms = defaults.banner_tick_ms;
            changed = true;
        }
        if self.timers.poll_interval_ms == 0 {
            self.timers.poll_interval_ms = defaults.poll_interval_ms;
            changed = true;
        }
        if self.timers.detect_duration_ms == 0 {
            self.timers.detect_duration_ms = defaults.detect_duration_ms;
            changed = true;
        }
        changed
    }
}

/// Load settings from file, creating it with defaults if it doesn't exist.
///
/// Invalid intervals are cleaned and the cleaned file is saved back.
pub fn load_or_create(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&content)?;
        if settings.clean() {
            tracing::warn!("invalid timer interval in {}, restoring default", path.display());
            save(path, &settings)?;
        }
        Ok(settings)
    } else {
        let settings = Settings::default();
        save(path, &settings)?;
        Ok(settings)
    }
}

/// Save settings atomically: write to a temp file, then rename.
pub fn save(path: impl AsRef<Path>, settings: &Settings) -> ConfigResult<()> {
    let path = path.as_ref();
    let content = toml::to_string_pretty(settings)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory, so the rename is atomic.
    let temp_path = temp_path_for(path);
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("toml.tmp")
}
