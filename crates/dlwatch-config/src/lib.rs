//! Shared configuration for the dlwatch CLI and TUI.
//!
//! One TOML file with calculator and monitor defaults, overridable by
//! `DLWATCH_`-prefixed environment variables, and translation to
//! `dlwatch_core::AutoExitConfig`. Both binaries depend on this crate.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use dlwatch_core::{AutoExitConfig, SizeUnit, SpeedUnit};

/// Environment variable prefix. Nested keys use `__`, as in
/// `DLWATCH_MONITOR__THRESHOLD=50`.
pub const ENV_PREFIX: &str = "DLWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Output and color defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Units preselected by the calculator.
    #[serde(default)]
    pub calculator: CalculatorDefaults,

    /// Auto-exit monitor settings.
    #[serde(default)]
    pub monitor: AutoExitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CalculatorDefaults {
    #[serde(default)]
    pub size_unit: SizeUnit,

    #[serde(default)]
    pub speed_unit: SpeedUnit,
}

impl Config {
    /// Monitor settings with bounds applied.
    pub fn auto_exit(&self) -> AutoExitConfig {
        self.monitor.clone().validated()
    }

    /// Set a dotted key (`monitor.threshold`) from its string form.
    ///
    /// The value is typed by the schema: the edited document is
    /// re-deserialized, so `monitor.duration_secs = abc` is rejected.
    /// An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut doc = toml::Value::try_from(&*self)?;

        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::UnknownKey { key: key.into() })?;
        if !KNOWN_KEYS.contains(&key) {
            return Err(ConfigError::UnknownKey { key: key.into() });
        }

        let table = doc
            .as_table_mut()
            .and_then(|root| {
                root.entry(section)
                    .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                    .as_table_mut()
            })
            .ok_or_else(|| ConfigError::UnknownKey { key: key.into() })?;

        if value.trim().is_empty() {
            table.remove(field);
        } else {
            table.insert(field.to_owned(), parse_scalar(value));
        }

        let updated: Self = doc.try_into().map_err(|e: toml::de::Error| ConfigError::Validation {
            field: key.into(),
            reason: e.message().to_owned(),
        })?;
        debug!(key, value, "config value set");
        *self = updated;
        Ok(())
    }
}

/// Every key accepted by [`Config::set`].
pub const KNOWN_KEYS: &[&str] = &[
    "defaults.output",
    "defaults.color",
    "calculator.size_unit",
    "calculator.speed_unit",
    "monitor.threshold",
    "monitor.threshold_unit",
    "monitor.duration_secs",
    "monitor.action",
    "monitor.adapter",
];

fn parse_scalar(raw: &str) -> toml::Value {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        toml::Value::Integer(int)
    } else if let Ok(float) = raw.parse::<f64>() {
        toml::Value::Float(float)
    } else if let Ok(flag) = raw.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else {
        toml::Value::String(raw.to_owned())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "dlwatch", "dlwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dlwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load only the file, without environment overrides. Used when the
/// result is written back, so env values never leak into the file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
