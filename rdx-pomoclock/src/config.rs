//! Defines all configuration structures for the Pomoclock engine.
//!
//! These structs are deserialized with `serde` through the `config` crate,
//! layering an optional TOML file under `POMOCLOCK__*` environment variables.
//! Interval lengths are deliberately absent: only the wall-clock speed of a
//! tick, the counter store and the collaborators can be tuned.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an alternate configuration file.
pub const CONFIG_PATH_ENV: &str = "POMOCLOCK_CONFIG";
/// Configuration file looked up in the working directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "pomoclock.toml";
/// Key the completed-interval counter is stored under.
pub const DEFAULT_STORE_KEY: &str = "pomodoroCount";

/// The top-level configuration for the `PomodoroEngine`.
#[derive(Debug, Clone, Deserialize)]
pub struct PomodoroConfig {
    /// How long one tick lasts in wall-clock time.
    #[serde(default)]
    pub resolution: ClockResolution,

    /// Where the completed-interval counter lives.
    #[serde(default)]
    pub store: StoreConfig,

    /// Phase-completion tone settings.
    #[serde(default)]
    pub alert: AlertConfig,

    /// Display renderer settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Default `tracing` filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Defines the operational speed of the tick scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// One tick per second. A work interval lasts 25 minutes.
    #[default]
    Realtime,
    /// 100 ticks per second. Useful for watching a whole cycle go by.
    Fast,
    /// A user-defined tick period.
    Custom { millis_per_tick: u64 },
}

impl ClockResolution {
    /// The wall-clock period between two ticks.
    pub fn tick_period(&self) -> Duration {
        match self {
            ClockResolution::Realtime => Duration::from_secs(1),
            ClockResolution::Fast => Duration::from_millis(10),
            ClockResolution::Custom { millis_per_tick } => {
                Duration::from_millis((*millis_per_tick).max(1))
            }
        }
    }
}

/// Settings for the JSON key-value counter store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_store_key")]
    pub key: String,
}

/// Settings for the phase-completion tone.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// External program handed the synthesized WAV file.
    #[serde(default = "default_player")]
    pub player: String,
}

/// Settings for the terminal display renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Radius of the progress ring, used to compute the stroke offset.
    #[serde(default = "default_ring_radius")]
    pub ring_radius: f64,
    /// Number of cells used to draw the ring as a bar in a terminal.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl PomodoroConfig {
    /// Loads the configuration from `POMOCLOCK_CONFIG` (or `pomoclock.toml`)
    /// and `POMOCLOCK__*` environment overrides. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit file path plus the environment.
    pub fn load_from(path: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("POMOCLOCK").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration from '{}'", path))?
            .try_deserialize()
            .context("invalid pomoclock configuration")
    }
}

// --- Default value functions for serde ---

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("pomoclock.json")
}

fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_player() -> String {
    "aplay".to_string()
}

fn default_ring_radius() -> f64 {
    90.0
}

fn default_bar_width() -> usize {
    30
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            resolution: ClockResolution::default(),
            store: StoreConfig::default(),
            alert: AlertConfig::default(),
            display: DisplayConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            key: default_store_key(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player: default_player(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            ring_radius: default_ring_radius(),
            bar_width: default_bar_width(),
        }
    }
}
