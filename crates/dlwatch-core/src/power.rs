// ── Power actuator ──
//
// Maps a `PowerAction` to the platform's shutdown/sleep command and runs
// it. The command is spawned and left alone: the machine is about to go
// down, there is nothing useful to wait for.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::PowerAction;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl fmt::Display for PowerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

const fn cmd(program: &'static str, args: &'static [&'static str]) -> PowerCommand {
    PowerCommand { program, args }
}

/// Name of the platform the power table was built for.
pub const PLATFORM: &str = std::env::consts::OS;

/// The command that performs `action` on this platform.
#[cfg(target_os = "windows")]
pub fn power_command(action: PowerAction) -> Result<PowerCommand, CoreError> {
    Ok(match action {
        PowerAction::Shutdown => cmd("shutdown", &["/s", "/t", "0"]),
        PowerAction::Restart => cmd("shutdown", &["/r", "/t", "0"]),
        PowerAction::Hibernate => cmd("shutdown", &["/h"]),
        PowerAction::Sleep => cmd("rundll32.exe", &["powrprof.dll,SetSuspendState", "0,1,0"]),
    })
}

/// The command that performs `action` on this platform.
#[cfg(target_os = "macos")]
pub fn power_command(action: PowerAction) -> Result<PowerCommand, CoreError> {
    match action {
        PowerAction::Shutdown => Ok(cmd("shutdown", &["-h", "now"])),
        PowerAction::Restart => Ok(cmd("shutdown", &["-r", "now"])),
        PowerAction::Hibernate => Err(CoreError::UnsupportedAction {
            action,
            platform: PLATFORM,
        }),
        PowerAction::Sleep => Ok(cmd("pmset", &["sleepnow"])),
    }
}

/// The command that performs `action` on this platform.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn power_command(action: PowerAction) -> Result<PowerCommand, CoreError> {
    Ok(match action {
        PowerAction::Shutdown => cmd("systemctl", &["poweroff"]),
        PowerAction::Restart => cmd("systemctl", &["reboot"]),
        PowerAction::Hibernate => cmd("systemctl", &["hibernate"]),
        PowerAction::Sleep => cmd("systemctl", &["suspend"]),
    })
}

// ── Actuators ───────────────────────────────────────────────────────

/// Performs power actions. Implementations must not block.
pub trait PowerActuator: Send + Sync {
    fn perform(&self, action: PowerAction) -> Result<(), CoreError>;
}

/// Runs the real OS command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPower;

impl PowerActuator for SystemPower {
    fn perform(&self, action: PowerAction) -> Result<(), CoreError> {
        let command = power_command(action)?;
        info!(%action, %command, "performing power action");

        Command::new(command.program)
            .args(command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| {
                warn!(%action, error = %e, "power command failed to start");
                CoreError::PowerAction {
                    action,
                    reason: e.to_string(),
                }
            })
    }
}

/// Logs the command it would run and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPower;

impl PowerActuator for DryRunPower {
    fn perform(&self, action: PowerAction) -> Result<(), CoreError> {
        let command = power_command(action)?;
        info!(%action, %command, "dry run: power action skipped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_uses_systemctl() {
        let rendered: Vec<String> = [
            PowerAction::Shutdown,
            PowerAction::Restart,
            PowerAction::Hibernate,
            PowerAction::Sleep,
        ]
        .into_iter()
        .map(|action| power_command(action).map(|c| c.to_string()))
        .collect::<Result<_, _>>()
        .expect("every action is supported on linux");

        assert_eq!(
            rendered,
            [
                "systemctl poweroff",
                "systemctl reboot",
                "systemctl hibernate",
                "systemctl suspend"
            ]
        );
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn macos_cannot_hibernate() {
        assert!(matches!(
            power_command(PowerAction::Hibernate),
            Err(CoreError::UnsupportedAction { .. })
        ));
    }

    #[test]
    fn command_display_joins_args() {
        let command = cmd("shutdown", &["/s", "/t", "0"]);
        assert_eq!(command.to_string(), "shutdown /s /t 0");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn dry_run_never_fails_for_supported_actions() {
        assert!(DryRunPower.perform(PowerAction::Shutdown).is_ok());
        assert!(DryRunPower.perform(PowerAction::Hibernate).is_ok());
    }
}
