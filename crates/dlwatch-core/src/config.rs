// ── Runtime monitor configuration ──
//
// These types describe *what* the auto-exit monitor watches for and how
// often the watcher ticks. They never touch disk: the CLI/TUI builds an
// `AutoExitConfig` from its config file and flags and hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{PowerAction, ThresholdUnit};

/// Largest accepted threshold value, in threshold units.
pub const MAX_THRESHOLD: f64 = 1_048_576.0;
/// Shortest accepted low-speed duration, in seconds.
pub const MIN_DURATION_SECS: u64 = 1;
/// Longest accepted low-speed duration (one week), in seconds.
pub const MAX_DURATION_SECS: u64 = 604_800;
/// Default sampling period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// User-facing auto-exit settings.
///
/// `threshold` and `duration_secs` are optional: a monitor missing either
/// one stays idle instead of firing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoExitConfig {
    pub threshold: Option<f64>,
    #[serde(default)]
    pub threshold_unit: ThresholdUnit,
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub action: PowerAction,
    /// Interface name filter. `None` sums every interface.
    pub adapter: Option<String>,
}

impl AutoExitConfig {
    /// Clamp every field into its accepted range.
    ///
    /// Non-finite thresholds are dropped, finite ones clamped to
    /// `[0, MAX_THRESHOLD]`. Durations are clamped to
    /// `[MIN_DURATION_SECS, MAX_DURATION_SECS]`.
    pub fn validated(mut self) -> Self {
        self.threshold = self
            .threshold
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, MAX_THRESHOLD));
        self.duration_secs = self
            .duration_secs
            .map(|secs| secs.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS));
        self
    }

    /// Threshold in bytes per second, when present and finite.
    pub fn threshold_bytes_per_sec(&self) -> Option<f64> {
        self.threshold
            .filter(|value| value.is_finite())
            .map(|value| self.threshold_unit.to_bytes_per_sec(value))
    }

    /// Both threshold and duration are present.
    pub fn is_complete(&self) -> bool {
        self.threshold_bytes_per_sec().is_some() && self.duration_secs.is_some()
    }
}

/// Everything a [`Watcher`](crate::Watcher) needs at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    /// Time between samples.
    pub interval: Duration,
    pub auto_exit: AutoExitConfig,
    /// Whether the monitor is armed from the first tick.
    pub enabled: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            auto_exit: AutoExitConfig::default(),
            enabled: false,
        }
    }
}

impl WatchSettings {
    pub fn new(auto_exit: AutoExitConfig) -> Self {
        Self {
            auto_exit,
            ..Self::default()
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn validation_clamps_into_range() {
        let config = AutoExitConfig {
            threshold: Some(5_000_000.0),
            duration_secs: Some(0),
            ..AutoExitConfig::default()
        }
        .validated();
        assert_eq!(config.threshold, Some(MAX_THRESHOLD));
        assert_eq!(config.duration_secs, Some(MIN_DURATION_SECS));

        let config = AutoExitConfig {
            threshold: Some(-4.0),
            duration_secs: Some(10_000_000),
            ..AutoExitConfig::default()
        }
        .validated();
        assert_eq!(config.threshold, Some(0.0));
        assert_eq!(config.duration_secs, Some(MAX_DURATION_SECS));
    }

    #[test]
    fn non_finite_threshold_counts_as_missing() {
        let config = AutoExitConfig {
            threshold: Some(f64::INFINITY),
            duration_secs: Some(30),
            ..AutoExitConfig::default()
        }
        .validated();
        assert_eq!(config.threshold, None);
        assert!(!config.is_complete());
    }

    #[test]
    fn threshold_converts_with_unit() {
        let mut config = AutoExitConfig {
            threshold: Some(100.0),
            duration_secs: Some(60),
            ..AutoExitConfig::default()
        };
        assert_eq!(config.threshold_bytes_per_sec(), Some(102_400.0));

        config.threshold_unit = ThresholdUnit::MegabytesPerSec;
        config.threshold = Some(2.0);
        assert_eq!(config.threshold_bytes_per_sec(), Some(2_097_152.0));
        assert!(config.is_complete());
    }

    #[test]
    fn defaults_are_idle() {
        let settings = WatchSettings::default();
        assert_eq!(settings.interval, DEFAULT_INTERVAL);
        assert!(!settings.enabled);
        assert!(!settings.auto_exit.is_complete());
        assert_eq!(settings.auto_exit.action, PowerAction::Shutdown);
    }
}
