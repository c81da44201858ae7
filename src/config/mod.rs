//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::str::FromStr;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::tracker::{
    DEFAULT_ACTIVE_THRESHOLD_PX, DEFAULT_TRIGGER_DISTANCE_PX, TrackerConfig,
};

pub use cli::{
    CliArgs, Command, FormatArg, IdsArgs, IndexArgs, LoggingOverrides, ReplayArgs,
    TrackerOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "lectio";
const DEFAULT_HEADER_OFFSET_PX: f64 = 64.0;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub tracker: TrackerSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    pub active_threshold_px: f64,
    pub trigger_distance_px: f64,
    pub header_offset_px: f64,
}

impl From<&TrackerSettings> for TrackerConfig {
    fn from(settings: &TrackerSettings) -> Self {
        TrackerConfig {
            active_threshold_px: settings.active_threshold_px,
            trigger_distance_px: settings.trigger_distance_px,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("LECTIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_logging_overrides(&cli.logging);
    if let Command::Replay(args) = &cli.command {
        raw.apply_tracker_overrides(&args.overrides);
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    tracker: RawTrackerSettings,
}

impl RawSettings {
    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_tracker_overrides(&mut self, overrides: &TrackerOverrides) {
        if let Some(value) = overrides.active_threshold_px {
            self.tracker.active_threshold_px = Some(value);
        }
        if let Some(value) = overrides.trigger_distance_px {
            self.tracker.trigger_distance_px = Some(value);
        }
        if let Some(value) = overrides.header_offset_px {
            self.tracker.header_offset_px = Some(value);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            logging: build_logging_settings(raw.logging)?,
            tracker: build_tracker_settings(raw.tracker)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_tracker_settings(tracker: RawTrackerSettings) -> Result<TrackerSettings, LoadError> {
    let active_threshold_px = non_negative_px(
        tracker
            .active_threshold_px
            .unwrap_or(DEFAULT_ACTIVE_THRESHOLD_PX),
        "tracker.active_threshold_px",
    )?;
    let trigger_distance_px = non_negative_px(
        tracker
            .trigger_distance_px
            .unwrap_or(DEFAULT_TRIGGER_DISTANCE_PX),
        "tracker.trigger_distance_px",
    )?;
    let header_offset_px = non_negative_px(
        tracker.header_offset_px.unwrap_or(DEFAULT_HEADER_OFFSET_PX),
        "tracker.header_offset_px",
    )?;

    Ok(TrackerSettings {
        active_threshold_px,
        trigger_distance_px,
        header_offset_px,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTrackerSettings {
    active_threshold_px: Option<f64>,
    trigger_distance_px: Option<f64>,
    header_offset_px: Option<f64>,
}

fn non_negative_px(value: f64, key: &'static str) -> Result<f64, LoadError> {
    if !value.is_finite() {
        return Err(LoadError::invalid(key, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(LoadError::invalid(key, "must not be negative"));
    }
    Ok(value)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
