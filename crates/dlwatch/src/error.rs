//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dlwatch_config::ConfigError;
use dlwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const POWER_ACTION: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dlwatch::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown {kind} '{value}'")]
    #[diagnostic(code(dlwatch::unknown_value), help("Expected one of: {expected}"))]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Auto-exit is not fully configured: missing {missing}")]
    #[diagnostic(
        code(dlwatch::unconfigured),
        help(
            "Pass --threshold and --duration, or store defaults with:\n\
             dlwatch config set monitor.threshold 100\n\
             dlwatch config set monitor.duration_secs 300"
        )
    )]
    Unconfigured { missing: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Adapter '{name}' not found")]
    #[diagnostic(
        code(dlwatch::adapter_not_found),
        help("Run: dlwatch adapters to see available adapters")
    )]
    AdapterNotFound { name: String },

    // ── Power actions ────────────────────────────────────────────────

    #[error("Power action failed: {message}")]
    #[diagnostic(
        code(dlwatch::power_action),
        help("Performing power actions may require elevated privileges. Try --dry-run to test.")
    )]
    PowerAction { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(dlwatch::config),
        help("Check the file printed by: dlwatch config path")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(dlwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation, or --dry-run to only log the action.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Watcher stopped unexpectedly")]
    #[diagnostic(code(dlwatch::watcher_stopped))]
    WatcherStopped,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. }
            | Self::UnknownValue { .. }
            | Self::Unconfigured { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::AdapterNotFound { .. } => exit_code::NOT_FOUND,
            Self::PowerAction { .. } => exit_code::POWER_ACTION,
            Self::WatcherStopped | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            err @ (CoreError::PowerAction { .. } | CoreError::UnsupportedAction { .. }) => {
                CliError::PowerAction {
                    message: err.to_string(),
                }
            }
            CoreError::WatcherStopped => CliError::WatcherStopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use dlwatch_core::PowerAction;

    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let unknown = CliError::UnknownValue {
            kind: "size unit",
            value: "parsec".into(),
            expected: "B, KB".into(),
        };
        assert_eq!(unknown.exit_code(), exit_code::USAGE);
        assert_eq!(
            CliError::AdapterNotFound { name: "eth9".into() }.exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(ConfigError::UnknownKey { key: "x".into() }).exit_code(),
            exit_code::CONFIG
        );
    }

    #[test]
    fn power_failures_map_to_their_own_code() {
        let err = CliError::from(CoreError::UnsupportedAction {
            action: PowerAction::Hibernate,
            platform: "macos",
        });
        assert_eq!(err.exit_code(), exit_code::POWER_ACTION);
        assert!(err.to_string().contains("Hibernate is not supported on macos"));
    }
}
