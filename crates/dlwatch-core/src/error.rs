// ── Core error types ──
//
// User-facing errors from dlwatch-core. Sampling and calculation never
// fail outright (they degrade to "no sample" / placeholder output), so
// the only real failures are power actions and talking to a watcher
// that has already shut down.

use thiserror::Error;

use crate::model::PowerAction;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Power actions ────────────────────────────────────────────────
    #[error("Failed to perform {action}: {reason}")]
    PowerAction { action: PowerAction, reason: String },

    #[error("{action} is not supported on {platform}")]
    UnsupportedAction {
        action: PowerAction,
        platform: &'static str,
    },

    // ── Watcher lifecycle ────────────────────────────────────────────
    #[error("Watcher is no longer running")]
    WatcherStopped,
}
