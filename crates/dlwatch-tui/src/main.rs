//! `dlwatch-tui`: terminal dashboard for the download calculator and the
//! low-speed auto-exit monitor.
//!
//! Built on [ratatui](https://ratatui.rs). Screen F1 is the Calculator,
//! F2 the Auto-Exit monitor fed by a background
//! [`Watcher`](dlwatch_core::Watcher) that samples once per second.
//!
//! Logs go to a file (default `dlwatch-tui.log` in the temp directory)
//! so they never corrupt the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dlwatch_config::Config;
use dlwatch_core::{DryRunPower, PowerActuator, SysinfoSource, SystemPower, WatchSettings, Watcher};

use crate::app::App;

/// Terminal dashboard: download ETA calculator and auto-exit monitor.
#[derive(Parser, Debug)]
#[command(name = "dlwatch-tui", version, about)]
struct Cli {
    /// Log the power action instead of performing it
    #[arg(long)]
    dry_run: bool,

    /// Log file path (defaults to dlwatch-tui.log in the temp directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI. The returned guard must live until exit so logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dlwatch_tui={log_level},dlwatch_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("dlwatch-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("dlwatch-tui.log"))
        .to_owned();

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = dlwatch_config::load_config().unwrap_or_else(|e| {
        warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    });

    let actuator: Arc<dyn PowerActuator> = if cli.dry_run {
        Arc::new(DryRunPower)
    } else {
        Arc::new(SystemPower)
    };

    info!(dry_run = cli.dry_run, "starting dlwatch-tui");

    // The monitor starts disarmed; the user enables it on the Auto-Exit screen
    let watcher = Watcher::spawn(
        WatchSettings::new(config.auto_exit()),
        SysinfoSource::new(),
        actuator,
    );
    let mut app = App::new(&config, watcher);
    app.run().await?;

    Ok(())
}
