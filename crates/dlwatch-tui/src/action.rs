//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use dlwatch_core::{AutoExitConfig, WatchUpdate};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast notification shown above the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Watcher data (from the data bridge) ───────────────────────
    WatchUpdated(Arc<WatchUpdate>),

    // ── Watcher commands (from the Auto-Exit screen) ──────────────
    SelectAdapter(Option<String>),
    SetMonitorEnabled(bool),
    ConfigureMonitor(AutoExitConfig),
    SaveMonitorConfig(AutoExitConfig),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
