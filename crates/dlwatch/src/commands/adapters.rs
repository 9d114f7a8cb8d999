//! `dlwatch adapters`: interfaces with their cumulative counters.
//!
//! Table output ends with the summed counters of the up, non-loopback
//! interfaces, which is exactly what `stats` and `watch` measure.

use tabled::Tabled;

use dlwatch_core::format::format_bytes;
use dlwatch_core::{InterfaceCounters, NetworkSampler, SysinfoSource, Totals};

use crate::cli::OutputFormat;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct AdapterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Received")]
    received: String,
    #[tabled(rename = "Sent")]
    sent: String,
}

fn to_row(iface: &InterfaceCounters, color: bool) -> AdapterRow {
    let state = match (iface.is_loopback, iface.is_up) {
        (true, _) => output::dim("loopback", color),
        (false, true) => output::accent("up", color),
        (false, false) => output::warn("down", color),
    };
    AdapterRow {
        name: iface.name.clone(),
        state,
        received: format_bytes(iface.bytes_received),
        sent: format_bytes(iface.bytes_sent),
    }
}

fn totals_line(totals: Option<Totals>, color: bool) -> String {
    match totals {
        Some(totals) => format!(
            "{}  ↓ {}  ↑ {}",
            output::dim("Counted:", color),
            format_bytes(totals.received),
            format_bytes(totals.sent),
        ),
        None => output::warn("No up, non-loopback interfaces to count", color),
    }
}

#[allow(clippy::unnecessary_wraps)]
pub fn handle(out: &Resolved) -> Result<(), CliError> {
    let mut sampler = NetworkSampler::new(SysinfoSource::new());
    let interfaces = sampler.interfaces();

    let rendered = output::render_list(
        out.output,
        &interfaces,
        |iface| to_row(iface, out.color),
        |iface| iface.name.clone(),
    );
    output::print_output(&rendered, out.quiet);

    if out.output == OutputFormat::Table {
        output::print_output(&totals_line(sampler.current_totals(), out.color), out.quiet);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_line_sums_counted_interfaces() {
        let line = totals_line(
            Some(Totals {
                received: 3 * 1024 * 1024,
                sent: 1536,
            }),
            false,
        );
        assert_eq!(line, "Counted:  ↓ 3.00 MB  ↑ 1.50 KB");
    }

    #[test]
    fn totals_line_warns_when_nothing_counts() {
        assert_eq!(
            totals_line(None, false),
            "No up, non-loopback interfaces to count"
        );
    }
}
