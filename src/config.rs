use crate::domain::dial::DIAL_MINUTES;
use crate::notifications::{NotifyOptions, Permission};
use crate::persistence::{config_file, read_file};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from `config.toml` in the data directory.
///
/// Every field is optional in the file. A file that exists but does not parse
/// is an error: better to refuse to start than to silently run with defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Duration used when storage holds none
    pub default_minutes: u64,
    /// Timer-up sound, relative to the data directory unless absolute
    pub sound_file: PathBuf,
    /// Command used to play `sound_file`; platform default when unset
    pub audio_player: Option<String>,
    /// Desktop notification permission
    pub notifications: Permission,
    /// Alert/original title pairs in the title flash fallback
    pub flash_count: u32,
    pub flash_interval_ms: u64,
    /// Text shown in the title while flashing
    pub alert_title: String,
    /// Log filter when RUST_LOG is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let notify = NotifyOptions::default();
        Self {
            default_minutes: 25,
            sound_file: PathBuf::from("sounds/timer_up_sound.mp3"),
            audio_player: None,
            notifications: Permission::Default,
            flash_count: notify.flash_count,
            flash_interval_ms: notify.flash_interval.as_millis() as u64,
            alert_title: notify.flash_text,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` from `data_dir`; defaults when the file is absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = config_file(data_dir);
        let content = read_file(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Default duration in seconds, kept within one dial revolution
    pub fn default_total_seconds(&self) -> u64 {
        self.default_minutes.clamp(1, DIAL_MINUTES) * 60
    }

    pub fn notify_options(&self) -> NotifyOptions {
        NotifyOptions {
            flash_text: self.alert_title.clone(),
            flash_count: self.flash_count,
            flash_interval: Duration::from_millis(self.flash_interval_ms.max(1)),
            ..NotifyOptions::default()
        }
    }

    /// Filter directive for the log subscriber
    pub fn log_filter(&self) -> String {
        format!("tickdial={}", self.log_level)
    }
}
