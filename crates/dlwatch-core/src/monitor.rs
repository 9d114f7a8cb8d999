//! Low-speed auto-exit state machine.
//!
//! [`LowSpeedMonitor`] is fed one download rate per tick together with the
//! tick's [`Instant`]. It tracks a single contiguous low-speed run and
//! reports [`MonitorEvent::Fire`] once that run reaches the configured
//! duration. After firing it stays in the performed state for the rest of
//! its life, so a session triggers at most one power action.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AutoExitConfig;
use crate::format::format_countdown;
use crate::model::PowerAction;

/// Countdown text once the action has been triggered.
pub const PERFORMING_ACTION: &str = "Performing Action...";

/// Mutable monitor state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    /// Start of the current low-speed run, if one is in progress.
    pub low_speed_since: Option<Instant>,
    /// Set when the action fires. Never cleared.
    pub action_performed: bool,
}

/// What a single evaluation observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Monitoring is switched off.
    Inactive,
    /// Threshold or duration missing.
    Unconfigured,
    AboveThreshold,
    /// First sample of a new low-speed run.
    LowSpeedStarted { remaining_secs: u64 },
    CountingDown { remaining_secs: u64 },
    /// Rate climbed back over the threshold, ending a low-speed run.
    Recovered,
    /// The run reached the configured duration; perform `action` now.
    Fire { action: PowerAction },
    /// The action already fired earlier this session.
    ActionPerformed,
}

impl MonitorEvent {
    /// User-facing countdown line, empty when nothing is counting down.
    pub fn countdown_text(&self, action: PowerAction) -> String {
        match self {
            Self::LowSpeedStarted { remaining_secs } | Self::CountingDown { remaining_secs } => {
                format!("{action} in {}", format_countdown(*remaining_secs))
            }
            Self::Fire { .. } | Self::ActionPerformed => PERFORMING_ACTION.to_owned(),
            Self::Inactive | Self::Unconfigured | Self::AboveThreshold | Self::Recovered => {
                String::new()
            }
        }
    }
}

/// Low-speed monitor driven by externally supplied samples and instants.
#[derive(Debug, Clone)]
pub struct LowSpeedMonitor {
    config: AutoExitConfig,
    enabled: bool,
    state: MonitorState,
}

impl LowSpeedMonitor {
    pub fn new(config: AutoExitConfig, enabled: bool) -> Self {
        Self {
            config: config.validated(),
            enabled,
            state: MonitorState::default(),
        }
    }

    pub fn config(&self) -> &AutoExitConfig {
        &self.config
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Arm or disarm. Either way any running low-speed run is dropped.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(enabled, "auto-exit toggled");
        }
        self.enabled = enabled;
        self.state.low_speed_since = None;
    }

    /// Replace the settings. A running low-speed run is kept and measured
    /// against the new duration on the next sample.
    pub fn configure(&mut self, config: AutoExitConfig) {
        self.config = config.validated();
        if !self.config.is_complete() {
            self.state.low_speed_since = None;
        }
    }

    /// Feed one download rate sampled at `now`.
    pub fn observe(&mut self, download_bytes_per_sec: f64, now: Instant) -> MonitorEvent {
        if !self.enabled {
            return MonitorEvent::Inactive;
        }
        if self.state.action_performed {
            return MonitorEvent::ActionPerformed;
        }
        let (Some(threshold), Some(duration_secs)) = (
            self.config.threshold_bytes_per_sec(),
            self.config.duration_secs,
        ) else {
            self.state.low_speed_since = None;
            return MonitorEvent::Unconfigured;
        };

        if download_bytes_per_sec >= threshold {
            return if self.state.low_speed_since.take().is_some() {
                debug!(rate = download_bytes_per_sec, "download speed recovered");
                MonitorEvent::Recovered
            } else {
                MonitorEvent::AboveThreshold
            };
        }

        let Some(since) = self.state.low_speed_since else {
            debug!(
                rate = download_bytes_per_sec,
                threshold, "low-speed run started"
            );
            self.state.low_speed_since = Some(now);
            return MonitorEvent::LowSpeedStarted {
                remaining_secs: duration_secs,
            };
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed >= Duration::from_secs(duration_secs) {
            let action = self.config.action;
            info!(%action, elapsed_secs = elapsed.as_secs(), "low-speed duration reached");
            self.state.action_performed = true;
            self.state.low_speed_since = None;
            return MonitorEvent::Fire { action };
        }

        MonitorEvent::CountingDown {
            remaining_secs: duration_secs.saturating_sub(elapsed.as_secs()),
        }
    }

    /// Describe the current state at `now` without advancing it.
    pub fn status(&self, now: Instant) -> MonitorEvent {
        if !self.enabled {
            return MonitorEvent::Inactive;
        }
        if self.state.action_performed {
            return MonitorEvent::ActionPerformed;
        }
        let Some(duration_secs) = self.config.duration_secs.filter(|_| self.config.is_complete())
        else {
            return MonitorEvent::Unconfigured;
        };
        match self.state.low_speed_since {
            Some(since) => MonitorEvent::CountingDown {
                remaining_secs: duration_secs
                    .saturating_sub(now.saturating_duration_since(since).as_secs()),
            },
            None => MonitorEvent::AboveThreshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ThresholdUnit;

    // 1 KB/s threshold, 3 second run.
    fn config() -> AutoExitConfig {
        AutoExitConfig {
            threshold: Some(1.0),
            threshold_unit: ThresholdUnit::KilobytesPerSec,
            duration_secs: Some(3),
            action: PowerAction::Sleep,
            adapter: None,
        }
    }

    fn tick(start: Instant, secs: u64) -> Instant {
        start + Duration::from_secs(secs)
    }

    #[test]
    fn fires_once_after_a_full_low_speed_run() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);

        assert_eq!(
            monitor.observe(10.0, tick(start, 0)),
            MonitorEvent::LowSpeedStarted { remaining_secs: 3 }
        );
        assert_eq!(
            monitor.observe(10.0, tick(start, 1)),
            MonitorEvent::CountingDown { remaining_secs: 2 }
        );
        assert_eq!(
            monitor.observe(10.0, tick(start, 2)),
            MonitorEvent::CountingDown { remaining_secs: 1 }
        );
        assert_eq!(
            monitor.observe(10.0, tick(start, 3)),
            MonitorEvent::Fire {
                action: PowerAction::Sleep
            }
        );
        assert!(monitor.state().action_performed);

        for secs in 4..10 {
            assert_eq!(
                monitor.observe(0.0, tick(start, secs)),
                MonitorEvent::ActionPerformed
            );
        }
    }

    #[test]
    fn recovery_resets_the_run() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);

        monitor.observe(10.0, tick(start, 0));
        monitor.observe(10.0, tick(start, 2));
        assert_eq!(monitor.observe(4_096.0, tick(start, 3)), MonitorEvent::Recovered);
        assert_eq!(monitor.state().low_speed_since, None);

        // A fresh run has to last the whole duration again.
        assert_eq!(
            monitor.observe(10.0, tick(start, 4)),
            MonitorEvent::LowSpeedStarted { remaining_secs: 3 }
        );
        assert_eq!(
            monitor.observe(10.0, tick(start, 6)),
            MonitorEvent::CountingDown { remaining_secs: 1 }
        );
        assert!(!monitor.state().action_performed);
    }

    #[test]
    fn rate_equal_to_threshold_is_not_low() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);
        assert_eq!(monitor.observe(1_024.0, start), MonitorEvent::AboveThreshold);
    }

    #[test]
    fn disabling_drops_the_run_without_firing() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);
        monitor.observe(10.0, tick(start, 0));
        monitor.observe(10.0, tick(start, 2));

        monitor.set_enabled(false);
        assert_eq!(monitor.state(), MonitorState::default());
        assert_eq!(monitor.observe(10.0, tick(start, 5)), MonitorEvent::Inactive);

        monitor.set_enabled(true);
        assert_eq!(
            monitor.observe(10.0, tick(start, 6)),
            MonitorEvent::LowSpeedStarted { remaining_secs: 3 }
        );
    }

    #[test]
    fn re_enabling_does_not_rearm_after_firing() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);
        monitor.observe(0.0, tick(start, 0));
        monitor.observe(0.0, tick(start, 3));
        monitor.set_enabled(false);
        monitor.set_enabled(true);
        assert_eq!(
            monitor.observe(0.0, tick(start, 10)),
            MonitorEvent::ActionPerformed
        );
    }

    #[test]
    fn missing_threshold_or_duration_never_fires() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(
            AutoExitConfig {
                duration_secs: None,
                ..config()
            },
            true,
        );
        for secs in 0..10 {
            assert_eq!(
                monitor.observe(0.0, tick(start, secs)),
                MonitorEvent::Unconfigured
            );
        }

        monitor.configure(AutoExitConfig {
            threshold: None,
            ..config()
        });
        assert_eq!(monitor.observe(0.0, tick(start, 11)), MonitorEvent::Unconfigured);
    }

    #[test]
    fn reconfiguring_keeps_the_running_run() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(
            AutoExitConfig {
                duration_secs: Some(60),
                ..config()
            },
            true,
        );
        monitor.observe(0.0, tick(start, 0));
        monitor.observe(0.0, tick(start, 5));

        monitor.configure(config());
        assert_eq!(
            monitor.observe(0.0, tick(start, 6)),
            MonitorEvent::Fire {
                action: PowerAction::Sleep
            }
        );
    }

    #[test]
    fn status_does_not_advance_state() {
        let start = Instant::now();
        let mut monitor = LowSpeedMonitor::new(config(), true);
        assert_eq!(monitor.status(start), MonitorEvent::AboveThreshold);

        monitor.observe(0.0, start);
        assert_eq!(
            monitor.status(tick(start, 2)),
            MonitorEvent::CountingDown { remaining_secs: 1 }
        );
        assert_eq!(
            monitor.status(tick(start, 30)),
            MonitorEvent::CountingDown { remaining_secs: 0 }
        );
        assert!(!monitor.state().action_performed);
    }

    #[test]
    fn countdown_text_names_the_action() {
        let counting = MonitorEvent::CountingDown { remaining_secs: 42 };
        assert_eq!(counting.countdown_text(PowerAction::Shutdown), "Shutdown in 42s");
        let long = MonitorEvent::LowSpeedStarted { remaining_secs: 185 };
        assert_eq!(long.countdown_text(PowerAction::Sleep), "Sleep in 3m 05s");
        assert_eq!(
            MonitorEvent::Fire {
                action: PowerAction::Restart
            }
            .countdown_text(PowerAction::Restart),
            PERFORMING_ACTION
        );
        assert_eq!(MonitorEvent::Recovered.countdown_text(PowerAction::Sleep), "");
    }
}
