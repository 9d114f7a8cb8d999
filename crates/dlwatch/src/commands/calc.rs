//! `dlwatch calc`: download duration and finish time.

use chrono::Local;
use serde::Serialize;

use dlwatch_core::{DownloadSpec, EstimateReport, SizeUnit, SpeedUnit};

use crate::cli::CalcArgs;
use crate::config::{Config, Resolved};
use crate::error::CliError;
use crate::output;

use super::util::parse_choice;

#[derive(Debug, Serialize)]
struct CalcResult {
    size: f64,
    size_unit: SizeUnit,
    speed: f64,
    speed_unit: SpeedUnit,
    #[serde(flatten)]
    report: EstimateReport,
}

fn detail(result: &CalcResult, color: bool) -> String {
    output::render_detail(&[
        ("Size", format!("{} {}", result.size, result.size_unit)),
        ("Speed", format!("{} {}", result.speed, result.speed_unit)),
        ("Duration", output::accent(&result.report.duration, color)),
        ("Finish Time", result.report.finish_time.clone()),
    ])
}

pub fn handle(args: &CalcArgs, cfg: &Config, out: &Resolved) -> Result<(), CliError> {
    let size_unit = args
        .size_unit
        .as_deref()
        .map(|raw| parse_choice::<SizeUnit>("size unit", raw))
        .transpose()?
        .unwrap_or(cfg.calculator.size_unit);
    let speed_unit = args
        .speed_unit
        .as_deref()
        .map(|raw| parse_choice::<SpeedUnit>("speed unit", raw))
        .transpose()?
        .unwrap_or(cfg.calculator.speed_unit);

    let spec = DownloadSpec::new(args.size, size_unit, args.speed, speed_unit);
    let result = CalcResult {
        size: args.size,
        size_unit,
        speed: args.speed,
        speed_unit,
        report: spec.report(&Local::now()),
    };

    let rendered = output::render_single(
        out.output,
        &result,
        |r| detail(r, out.color),
        |r| format!("{}\n{}", r.report.duration, r.report.finish_time),
    );
    output::print_output(&rendered, out.quiet);
    Ok(())
}
