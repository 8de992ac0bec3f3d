//! Game configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_rps::{HandAssignment, RoundTiming};
use tracing::{debug, info, instrument};

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "STRICTLY_GAMES_CONFIG";

/// Timing, detector and simulation settings for a session.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of one countdown tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,

    /// Number of countdown ticks before capture.
    #[serde(default = "default_ticks")]
    ticks: u32,

    /// Upper bound on one capture request in milliseconds.
    #[serde(default = "default_capture_timeout_ms")]
    capture_timeout_ms: u64,

    /// How long each round result stays on screen, in milliseconds.
    #[serde(default = "default_result_hold_ms")]
    result_hold_ms: u64,

    /// Delay per percent of warm-up progress, in milliseconds.
    #[serde(default = "default_warmup_step_ms")]
    warmup_step_ms: u64,

    /// Minimum confidence for a new hand detection.
    #[serde(default = "default_detection_confidence")]
    min_detection_confidence: f32,

    /// Minimum confidence to keep tracking a hand.
    #[serde(default = "default_tracking_confidence")]
    min_tracking_confidence: f32,

    /// How detected hands map to players in human mode.
    #[serde(default)]
    hand_assignment: HandAssignment,

    /// Chance that each simulated hand is in view.
    #[serde(default = "default_hand_presence")]
    hand_presence: f64,

    /// Fixed seed for reproducible games.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_tick_ms() -> u64 {
    700
}

fn default_ticks() -> u32 {
    3
}

fn default_capture_timeout_ms() -> u64 {
    2000
}

fn default_result_hold_ms() -> u64 {
    2000
}

fn default_warmup_step_ms() -> u64 {
    30
}

fn default_detection_confidence() -> f32 {
    0.7
}

fn default_tracking_confidence() -> f32 {
    0.5
}

fn default_hand_presence() -> f64 {
    0.9
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            ticks: default_ticks(),
            capture_timeout_ms: default_capture_timeout_ms(),
            result_hold_ms: default_result_hold_ms(),
            warmup_step_ms: default_warmup_step_ms(),
            min_detection_confidence: default_detection_confidence(),
            min_tracking_confidence: default_tracking_confidence(),
            hand_assignment: HandAssignment::default(),
            hand_presence: default_hand_presence(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(
            tick_ms = config.tick_ms,
            result_hold_ms = config.result_hold_ms,
            assignment = ?config.hand_assignment,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path`, or the file named by [`CONFIG_ENV`], or the defaults.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Checks that probabilities and thresholds lie in `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.min_detection_confidence) {
            return Err(ConfigError::new(format!(
                "min_detection_confidence must be within 0..=1, got {}",
                self.min_detection_confidence
            )));
        }
        if !unit.contains(&self.min_tracking_confidence) {
            return Err(ConfigError::new(format!(
                "min_tracking_confidence must be within 0..=1, got {}",
                self.min_tracking_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.hand_presence) {
            return Err(ConfigError::new(format!(
                "hand_presence must be within 0..=1, got {}",
                self.hand_presence
            )));
        }
        Ok(())
    }

    /// Round timing derived from the millisecond fields.
    pub fn timing(&self) -> RoundTiming {
        RoundTiming {
            tick: Duration::from_millis(self.tick_ms),
            ticks: self.ticks,
            capture_timeout: Duration::from_millis(self.capture_timeout_ms),
        }
    }

    /// Pause after each round result.
    pub fn result_hold(&self) -> Duration {
        Duration::from_millis(self.result_hold_ms)
    }

    /// Delay per warm-up percent.
    pub fn warmup_step(&self) -> Duration {
        Duration::from_millis(self.warmup_step_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
