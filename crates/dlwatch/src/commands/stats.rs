//! `dlwatch stats`: live throughput samples.

use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;
use tokio::time::{Instant, MissedTickBehavior};

use dlwatch_core::{NetworkSample, NetworkSampler, SysinfoSource};

use crate::cli::{OutputFormat, StatsArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct StatRecord {
    time: String,
    #[serde(flatten)]
    sample: NetworkSample,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Download")]
    download: String,
    #[tabled(rename = "Upload")]
    upload: String,
}

fn stream_line(record: &StatRecord, color: bool) -> String {
    format!(
        "{}  ↓ {:>12}  ↑ {:>12}",
        output::dim(&record.time, color),
        output::accent(&record.sample.formatted_download, color),
        record.sample.formatted_upload,
    )
}

pub async fn handle(args: StatsArgs, out: &Resolved) -> Result<(), CliError> {
    let mut sampler = NetworkSampler::new(SysinfoSource::new());
    util::ensure_adapter(args.adapter.as_deref(), &sampler.adapters())?;
    sampler.set_adapter(args.adapter.as_deref(), Instant::now().into_std());

    // Table output streams one line per sample; everything else is
    // collected and rendered once at the end.
    let streaming = out.output == OutputFormat::Table;
    let mut records = Vec::new();

    let mut interval = tokio::time::interval(SAMPLE_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    for _ in 0..args.count {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = interval.tick() => {
                if let Some(sample) = sampler.sample(Instant::now().into_std()) {
                    let record = StatRecord {
                        time: Local::now().format("%H:%M:%S").to_string(),
                        sample,
                    };
                    if streaming {
                        output::print_output(&stream_line(&record, out.color), out.quiet);
                    }
                    records.push(record);
                } else {
                    tracing::debug!("no matching interfaces this tick");
                }
            }
        }
    }

    if !streaming {
        let rendered = output::render_list(
            out.output,
            &records,
            |r| StatRow {
                time: r.time.clone(),
                download: r.sample.formatted_download.clone(),
                upload: r.sample.formatted_upload.clone(),
            },
            |r| {
                format!(
                    "{:.0}\t{:.0}",
                    r.sample.download_bytes_per_sec, r.sample.upload_bytes_per_sec
                )
            },
        );
        output::print_output(&rendered, out.quiet);
    }
    Ok(())
}
