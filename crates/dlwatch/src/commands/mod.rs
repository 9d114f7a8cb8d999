//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod adapters;
pub mod calc;
pub mod config_cmd;
pub mod stats;
pub mod util;
pub mod watch;

use crate::cli::Command;
use crate::config::{Config, Resolved};
use crate::error::CliError;

/// Dispatch a command that needs the loaded config.
pub async fn dispatch(cmd: Command, cfg: &Config, out: &Resolved) -> Result<(), CliError> {
    match cmd {
        Command::Calc(args) => calc::handle(&args, cfg, out),
        Command::Stats(args) => stats::handle(args, out).await,
        Command::Adapters => adapters::handle(out),
        Command::Watch(args) => watch::handle(args, cfg, out).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
