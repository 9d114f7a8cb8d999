// ── Domain model ──
//
// Plain records shared by the calculator, the sampler, the monitor and
// both front ends. Nothing here touches the OS or a clock.

/// Deserialize a strum enum through its `FromStr`, so config files and
/// env vars accept every spelling the CLI does (`GB`, `gib`, `Shutdown`).
/// Serialization still writes the short lowercase serde names.
macro_rules! deserialize_from_str {
    ($ty:ty, $what:literal) => {
        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.trim()
                    .parse()
                    .map_err(|_| format!("unknown {} `{raw}`", $what))
            }
        }
    };
}

pub mod power;
pub mod sample;
pub mod units;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use dlwatch_core::model::*` gives you everything.

pub use power::PowerAction;
pub use sample::{InterfaceCounters, NetworkSample};
pub use units::{SizeUnit, SpeedUnit, ThresholdUnit};
