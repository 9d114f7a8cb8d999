// ── Network samples and raw interface counters ──

use serde::{Deserialize, Serialize};

use crate::format::format_speed;

/// One second's worth of throughput, already clamped to non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    pub download_bytes_per_sec: f64,
    pub upload_bytes_per_sec: f64,
    pub formatted_download: String,
    pub formatted_upload: String,
}

impl NetworkSample {
    /// Build a sample from raw rates. Negative or non-finite rates become `0`.
    pub fn from_rates(download: f64, upload: f64) -> Self {
        let download = clamp_rate(download);
        let upload = clamp_rate(upload);
        Self {
            download_bytes_per_sec: download,
            upload_bytes_per_sec: upload,
            formatted_download: format_speed(download),
            formatted_upload: format_speed(upload),
        }
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}

/// Cumulative counters for a single OS network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub name: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl InterfaceCounters {
    /// Whether this interface contributes to throughput totals.
    pub fn is_countable(&self) -> bool {
        self.is_up && !self.is_loopback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_nan_rates_clamp_to_zero() {
        let sample = NetworkSample::from_rates(-5.0, f64::NAN);
        assert!(sample.download_bytes_per_sec.abs() < f64::EPSILON);
        assert!(sample.upload_bytes_per_sec.abs() < f64::EPSILON);
        assert_eq!(sample.formatted_download, "0 B/s");
    }

    #[test]
    fn formats_both_directions() {
        let sample = NetworkSample::from_rates(2048.0, 512.0);
        assert_eq!(sample.formatted_download, "2.00 KB/s");
        assert_eq!(sample.formatted_upload, "512 B/s");
    }
}
