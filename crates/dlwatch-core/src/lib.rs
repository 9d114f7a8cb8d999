// dlwatch-core: download ETA calculator and low-speed auto-exit monitor.

pub mod calc;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod monitor;
pub mod power;
pub mod sampler;
pub mod watcher;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use calc::{DownloadSpec, Estimate, EstimateReport};
pub use config::{AutoExitConfig, WatchSettings};
pub use error::CoreError;
pub use monitor::{LowSpeedMonitor, MonitorEvent, MonitorState};
pub use power::{DryRunPower, PowerActuator, PowerCommand, SystemPower, power_command};
pub use sampler::{ALL_ADAPTERS, InterfaceSource, NetworkSampler, SysinfoSource, Totals};
pub use watcher::{WatchUpdate, Watcher};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    InterfaceCounters, NetworkSample, PowerAction, SizeUnit, SpeedUnit, ThresholdUnit,
};
