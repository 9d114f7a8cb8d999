// ── Size, speed and threshold units ──
//
// Size units are binary (powers of 1024), link speeds are decimal
// (powers of 1000). "MB/s (real)" is the one speed unit measured in
// bytes: 8 bits × 1,000,000.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

const BITS_PER_BYTE: f64 = 8.0;
const KIBI: f64 = 1024.0;
const KILO: f64 = 1000.0;

/// Unit of a file size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum SizeUnit {
    #[serde(rename = "b")]
    #[strum(to_string = "B", serialize = "byte", serialize = "bytes")]
    Bytes,
    #[serde(rename = "kb")]
    #[strum(to_string = "KB", serialize = "kib")]
    Kilobytes,
    #[serde(rename = "mb")]
    #[strum(to_string = "MB", serialize = "mib")]
    Megabytes,
    #[default]
    #[serde(rename = "gb")]
    #[strum(to_string = "GB", serialize = "gib")]
    Gigabytes,
    #[serde(rename = "tb")]
    #[strum(to_string = "TB", serialize = "tib")]
    Terabytes,
}

impl SizeUnit {
    /// Power of 1024 this unit represents.
    pub fn exponent(self) -> i32 {
        match self {
            Self::Bytes => 0,
            Self::Kilobytes => 1,
            Self::Megabytes => 2,
            Self::Gigabytes => 3,
            Self::Terabytes => 4,
        }
    }

    /// Number of bytes in one of this unit.
    pub fn bytes_factor(self) -> f64 {
        KIBI.powi(self.exponent())
    }

    /// Convert `size` in this unit to bits.
    pub fn to_bits(self, size: f64) -> f64 {
        size * BITS_PER_BYTE * self.bytes_factor()
    }
}

/// Unit of a link speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum SpeedUnit {
    #[serde(rename = "bps")]
    #[strum(to_string = "bps", serialize = "bit/s")]
    BitsPerSec,
    #[serde(rename = "kbps")]
    #[strum(to_string = "Kbps", serialize = "kbit/s")]
    KilobitsPerSec,
    #[default]
    #[serde(rename = "mbps")]
    #[strum(to_string = "Mbps", serialize = "mbit/s")]
    MegabitsPerSec,
    #[serde(rename = "gbps")]
    #[strum(to_string = "Gbps", serialize = "gbit/s")]
    GigabitsPerSec,
    /// Megabytes per second as shown by download managers.
    #[serde(rename = "mb/s")]
    #[strum(to_string = "MB/s", serialize = "mbyte/s", serialize = "mb/s-real")]
    MegabytesPerSec,
}

impl SpeedUnit {
    /// Convert `speed` in this unit to bits per second.
    pub fn to_bits_per_sec(self, speed: f64) -> f64 {
        match self {
            Self::BitsPerSec => speed,
            Self::KilobitsPerSec => speed * KILO,
            Self::MegabitsPerSec => speed * KILO.powi(2),
            Self::GigabitsPerSec => speed * KILO.powi(3),
            Self::MegabytesPerSec => speed * BITS_PER_BYTE * KILO.powi(2),
        }
    }
}

/// Unit of the auto-exit speed threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum ThresholdUnit {
    #[default]
    #[serde(rename = "kb/s")]
    #[strum(to_string = "KB/s", serialize = "kb", serialize = "kbps")]
    KilobytesPerSec,
    #[serde(rename = "mb/s")]
    #[strum(to_string = "MB/s", serialize = "mb", serialize = "mbps")]
    MegabytesPerSec,
}

impl ThresholdUnit {
    /// Convert a threshold `value` in this unit to bytes per second.
    pub fn to_bytes_per_sec(self, value: f64) -> f64 {
        match self {
            Self::KilobytesPerSec => value * KIBI,
            Self::MegabytesPerSec => value * KIBI * KIBI,
        }
    }
}

deserialize_from_str!(SizeUnit, "size unit");
deserialize_from_str!(SpeedUnit, "speed unit");
deserialize_from_str!(ThresholdUnit, "threshold unit");
