// ── Network throughput sampler ──
//
// Reads cumulative interface counters, sums the ones that are up, not
// loopback, and match the adapter filter, and turns the delta since the
// previous reading into a byte rate. The sampler never reads a clock:
// callers pass `now` so tests can drive it deterministically.

use std::time::Instant;

use sysinfo::Networks;
use tracing::{debug, trace};

use crate::model::{InterfaceCounters, NetworkSample};

/// Pseudo-adapter that clears the filter.
pub const ALL_ADAPTERS: &str = "All Adapters";

/// Map "no filter" spellings (`None`, empty, [`ALL_ADAPTERS`]) to `None`.
pub fn normalize_adapter(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty() && *name != ALL_ADAPTERS)
        .map(ToOwned::to_owned)
}

// ── Interface sources ───────────────────────────────────────────────

/// Something that can list interfaces with their cumulative counters.
pub trait InterfaceSource: Send {
    fn interfaces(&mut self) -> Vec<InterfaceCounters>;
}

/// Production source backed by `sysinfo`'s network table.
pub struct SysinfoSource {
    networks: Networks,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceSource for SysinfoSource {
    fn interfaces(&mut self) -> Vec<InterfaceCounters> {
        // Picks up interfaces that appeared since the last call.
        self.networks.refresh_list();

        let mut interfaces = Vec::new();
        for (name, data) in &self.networks {
            interfaces.push(InterfaceCounters {
                name: name.clone(),
                is_up: interface_is_up(name),
                is_loopback: is_loopback_name(name),
                bytes_received: data.total_received(),
                bytes_sent: data.total_transmitted(),
            });
        }
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        interfaces
    }
}

fn is_loopback_name(name: &str) -> bool {
    name == "lo" || name == "lo0" || name.to_ascii_lowercase().contains("loopback")
}

#[cfg(target_os = "linux")]
fn interface_is_up(name: &str) -> bool {
    // "unknown" is what tun/wireguard devices report while passing traffic.
    match std::fs::read_to_string(format!("/sys/class/net/{name}/operstate")) {
        Ok(state) => matches!(state.trim(), "up" | "unknown"),
        Err(_) => true,
    }
}

#[cfg(not(target_os = "linux"))]
fn interface_is_up(_name: &str) -> bool {
    true
}

// ── Sampler ─────────────────────────────────────────────────────────

/// Summed cumulative counters of the filtered interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub received: u64,
    pub sent: u64,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    totals: Totals,
    at: Instant,
}

/// Turns cumulative counters into per-second rates.
pub struct NetworkSampler<S> {
    source: S,
    adapter: Option<String>,
    baseline: Option<Baseline>,
}

impl<S: InterfaceSource> NetworkSampler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            adapter: None,
            baseline: None,
        }
    }

    /// Start with an adapter filter already applied.
    pub fn with_adapter(mut self, adapter: Option<&str>) -> Self {
        self.adapter = normalize_adapter(adapter);
        self
    }

    /// Active adapter filter, `None` meaning every interface.
    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// Selectable adapters: [`ALL_ADAPTERS`] followed by every
    /// non-loopback interface, whether up or not.
    pub fn adapters(&mut self) -> Vec<String> {
        let mut names = vec![ALL_ADAPTERS.to_owned()];
        for iface in self.source.interfaces() {
            if !iface.is_loopback && !names.contains(&iface.name) {
                names.push(iface.name);
            }
        }
        names
    }

    /// Every interface the source reports, unfiltered.
    pub fn interfaces(&mut self) -> Vec<InterfaceCounters> {
        self.source.interfaces()
    }

    /// Change the filter and re-baseline so the next sample does not
    /// compare counters from two different interface sets.
    pub fn set_adapter(&mut self, adapter: Option<&str>, now: Instant) {
        self.adapter = normalize_adapter(adapter);
        debug!(adapter = ?self.adapter, "adapter filter changed");
        self.rebaseline(now);
    }

    /// Replace the previous reading with the current one without emitting.
    pub fn rebaseline(&mut self, now: Instant) {
        self.baseline = self
            .current_totals()
            .map(|totals| Baseline { totals, at: now });
    }

    /// Summed counters of the interfaces matching the filter, or `None`
    /// when nothing matches.
    pub fn current_totals(&mut self) -> Option<Totals> {
        let adapter = self.adapter.as_deref();
        let mut matched = false;
        let mut totals = Totals { received: 0, sent: 0 };

        for iface in self.source.interfaces() {
            if !iface.is_countable() || adapter.is_some_and(|name| name != iface.name) {
                continue;
            }
            matched = true;
            totals.received = totals.received.saturating_add(iface.bytes_received);
            totals.sent = totals.sent.saturating_add(iface.bytes_sent);
        }

        matched.then_some(totals)
    }

    /// Take one reading. Returns `None` when no interface matches, on the
    /// very first reading, and when no time has passed since the last one.
    pub fn sample(&mut self, now: Instant) -> Option<NetworkSample> {
        let Some(totals) = self.current_totals() else {
            trace!(adapter = ?self.adapter, "no matching interfaces");
            return None;
        };

        let previous = self.baseline.replace(Baseline { totals, at: now })?;
        let elapsed = now.saturating_duration_since(previous.at).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        let received = totals.received.saturating_sub(previous.totals.received);
        let sent = totals.sent.saturating_sub(previous.totals.sent);
        Some(NetworkSample::from_rates(
            per_second(received, elapsed),
            per_second(sent, elapsed),
        ))
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn per_second(bytes: u64, elapsed_secs: f64) -> f64 {
    bytes as f64 / elapsed_secs
}
