//! `dlwatch watch`: run the auto-exit monitor until it fires or Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use dlwatch_core::sampler::normalize_adapter;
use dlwatch_core::{
    AutoExitConfig, DryRunPower, MonitorEvent, PowerAction, PowerActuator, SysinfoSource,
    SystemPower, ThresholdUnit, WatchSettings, WatchUpdate, Watcher, power_command,
};

use crate::cli::{OutputFormat, WatchArgs};
use crate::config::{Config, Resolved};
use crate::error::CliError;
use crate::output;

use super::util;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Layer command-line overrides on top of the `[monitor]` config section.
fn build_auto_exit(args: &WatchArgs, cfg: &Config) -> Result<AutoExitConfig, CliError> {
    let mut auto_exit = cfg.monitor.clone();
    if let Some(threshold) = args.threshold {
        auto_exit.threshold = Some(threshold);
    }
    if let Some(raw) = args.threshold_unit.as_deref() {
        auto_exit.threshold_unit = util::parse_choice::<ThresholdUnit>("threshold unit", raw)?;
    }
    if let Some(raw) = args.duration.as_deref() {
        auto_exit.duration_secs = Some(util::parse_duration_secs(raw)?);
    }
    if let Some(raw) = args.action.as_deref() {
        auto_exit.action = util::parse_choice::<PowerAction>("power action", raw)?;
    }
    if let Some(adapter) = args.adapter.as_deref() {
        auto_exit.adapter = normalize_adapter(Some(adapter));
    }
    let auto_exit = auto_exit.validated();

    let missing = match (auto_exit.threshold.is_some(), auto_exit.duration_secs.is_some()) {
        (true, true) => return Ok(auto_exit),
        (false, true) => "threshold",
        (true, false) => "duration",
        (false, false) => "threshold and duration",
    };
    Err(CliError::Unconfigured {
        missing: missing.into(),
    })
}

fn describe(auto_exit: &AutoExitConfig) -> String {
    let threshold = auto_exit.threshold.unwrap_or_default();
    let duration =
        humantime::format_duration(Duration::from_secs(auto_exit.duration_secs.unwrap_or_default()));
    let adapter = auto_exit.adapter.as_deref().unwrap_or("all adapters");
    format!(
        "{} once download on {adapter} stays below {threshold} {} for {duration}",
        auto_exit.action, auto_exit.threshold_unit
    )
}

fn status_line(update: &WatchUpdate, color: bool) -> String {
    let speeds = update.sample.as_ref().map_or_else(
        || output::dim("waiting for samples", color),
        |s| {
            format!(
                "↓ {}  ↑ {}",
                output::accent(&s.formatted_download, color),
                s.formatted_upload
            )
        },
    );
    let countdown = update.countdown_text();
    let state = match update.event {
        MonitorEvent::Fire { .. } | MonitorEvent::ActionPerformed => output::danger(&countdown, color),
        MonitorEvent::LowSpeedStarted { .. } | MonitorEvent::CountingDown { .. } => {
            output::warn(&countdown, color)
        }
        _ => output::dim("speed OK", color),
    };
    format!("{}  {speeds}  {state}", update.at.format("%H:%M:%S"))
}

fn spinner(out: &Resolved) -> ProgressBar {
    if out.quiet || out.output != OutputFormat::Table {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(SPINNER_TICK);
    bar
}

/// Structured formats emit one record per tick.
fn emit_update(update: &WatchUpdate, out: &Resolved) {
    let rendered = match out.output {
        OutputFormat::Table => return,
        OutputFormat::Json => output::render_json_pretty(update),
        OutputFormat::JsonCompact => output::render_json_compact(update),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(update)),
        OutputFormat::Plain => {
            let (down, up) = update.sample.as_ref().map_or((0.0, 0.0), |s| {
                (s.download_bytes_per_sec, s.upload_bytes_per_sec)
            });
            format!("{down:.0}\t{up:.0}\t{}", update.countdown_text())
        }
    };
    output::print_output(&rendered, out.quiet);
}

pub async fn handle(args: WatchArgs, cfg: &Config, out: &Resolved) -> Result<(), CliError> {
    let auto_exit = build_auto_exit(&args, cfg)?;
    let action = auto_exit.action;
    let summary = describe(&auto_exit);

    let actuator: Arc<dyn PowerActuator> = if args.dry_run {
        Arc::new(DryRunPower)
    } else {
        // Fail early on actions this platform cannot perform.
        power_command(action)?;
        if !util::confirm(&format!("{summary}?"), out.yes)? {
            return Ok(());
        }
        Arc::new(SystemPower)
    };

    let watcher = Watcher::spawn(
        WatchSettings::new(auto_exit.clone()).enabled(true),
        SysinfoSource::new(),
        actuator,
    );
    if let Err(err) = util::ensure_adapter(auto_exit.adapter.as_deref(), watcher.adapters()) {
        watcher.stop().await;
        return Err(err);
    }

    if !out.quiet {
        let mode = if args.dry_run { " (dry run)" } else { "" };
        eprintln!("Watching{mode}: {summary}. Press Ctrl-C to stop.");
    }

    let bar = spinner(out);
    let result = watch_loop(&watcher, &bar, out, args.dry_run, action).await;
    bar.finish_and_clear();
    watcher.stop().await;
    result
}

async fn watch_loop(
    watcher: &Watcher,
    bar: &ProgressBar,
    out: &Resolved,
    dry_run: bool,
    action: PowerAction,
) -> Result<(), CliError> {
    let mut updates = watcher.updates();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                if !out.quiet {
                    eprintln!("Stopped; no action taken.");
                }
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Err(CliError::WatcherStopped);
                }
                let Some(update) = updates.borrow_and_update().clone() else {
                    continue;
                };
                bar.set_message(status_line(&update, out.color));
                emit_update(&update, out);

                if let Some(message) = update.action_error {
                    return Err(CliError::PowerAction { message });
                }
                if matches!(update.event, MonitorEvent::Fire { .. }) {
                    if !out.quiet {
                        let verb = if dry_run { "Would perform" } else { "Performing" };
                        eprintln!("{verb} {action}: download speed stayed low.");
                    }
                    return Ok(());
                }
            }
        }
    }
}
