//! Download time and finish-time estimation.
//!
//! Sizes are converted to bits with binary prefixes, link speeds with
//! decimal prefixes, and the quotient is the transfer time in seconds.
//! Nothing here fails: invalid input yields [`Estimate::Placeholder`] and
//! results too large for a [`TimeDelta`] yield [`Estimate::Unbounded`].

use chrono::{DateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::format::format_elapsed;
use crate::model::{SizeUnit, SpeedUnit};

/// Duration text shown before a valid size and speed are entered.
pub const PLACEHOLDER_DURATION: &str = "...";
/// Finish-time text shown when no finish time can be computed.
pub const PLACEHOLDER_FINISH: &str = "--:--";
/// Duration text for transfers that would never finish.
pub const UNBOUNDED_DURATION: &str = "∞";

const FINISH_TIME_FORMAT: &str = "%I:%M %p";
const MILLIS_PER_SEC: f64 = 1_000.0;

// ── Input ───────────────────────────────────────────────────────────

/// A file size and link speed, each with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownloadSpec {
    pub size: f64,
    pub size_unit: SizeUnit,
    pub speed: f64,
    pub speed_unit: SpeedUnit,
}

impl DownloadSpec {
    pub fn new(size: f64, size_unit: SizeUnit, speed: f64, speed_unit: SpeedUnit) -> Self {
        Self {
            size,
            size_unit,
            speed,
            speed_unit,
        }
    }

    pub fn size_bits(&self) -> f64 {
        self.size_unit.to_bits(self.size)
    }

    pub fn speed_bits_per_sec(&self) -> f64 {
        self.speed_unit.to_bits_per_sec(self.speed)
    }

    /// Classify this input into an [`Estimate`].
    pub fn estimate(&self) -> Estimate {
        // NaN compares false, so it lands in the placeholder branch too.
        let positive = self.size > 0.0 && self.speed > 0.0;
        if !positive {
            return Estimate::Placeholder;
        }

        let speed_bits = self.speed_bits_per_sec();
        if speed_bits.is_nan() || speed_bits <= 0.0 {
            return Estimate::Placeholder;
        }

        let seconds = self.size_bits() / speed_bits;
        if !seconds.is_finite() || to_time_delta(seconds).is_none() {
            return Estimate::Unbounded;
        }

        Estimate::Finite { seconds }
    }

    /// Shorthand for `self.estimate().report(now)`.
    pub fn report<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> EstimateReport
    where
        Tz::Offset: std::fmt::Display,
    {
        self.estimate().report(now)
    }
}

// ── Output ──────────────────────────────────────────────────────────

/// Typed calculator result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimate {
    /// Size or speed missing, zero or negative.
    Placeholder,
    /// Too large to represent as a duration.
    Unbounded,
    Finite { seconds: f64 },
}

impl Estimate {
    /// Render against a wall-clock `now`. A finish time past the end of
    /// the calendar degrades to the unbounded report.
    pub fn report<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> EstimateReport
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Self::Placeholder => EstimateReport::placeholder(),
            Self::Unbounded => EstimateReport::unbounded(),
            Self::Finite { seconds } => {
                let Some(delta) = to_time_delta(*seconds) else {
                    return EstimateReport::unbounded();
                };
                let Some(finish) = now.clone().checked_add_signed(delta) else {
                    return EstimateReport::unbounded();
                };
                let whole_secs = u64::try_from(delta.num_seconds()).unwrap_or(0);
                EstimateReport {
                    duration: format_elapsed(whole_secs),
                    finish_time: finish.format(FINISH_TIME_FORMAT).to_string(),
                    seconds: Some(*seconds),
                }
            }
        }
    }
}

/// Display strings for one estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub duration: String,
    pub finish_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
}

impl EstimateReport {
    pub fn placeholder() -> Self {
        Self {
            duration: PLACEHOLDER_DURATION.into(),
            finish_time: PLACEHOLDER_FINISH.into(),
            seconds: None,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            duration: UNBOUNDED_DURATION.into(),
            finish_time: PLACEHOLDER_FINISH.into(),
            seconds: None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn to_time_delta(seconds: f64) -> Option<TimeDelta> {
    let millis = (seconds * MILLIS_PER_SEC).round();
    // i64::MAX as f64 rounds up to 2^63, so compare strictly below it.
    if !millis.is_finite() || millis < 0.0 || millis >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .map(|naive| naive.and_utc())
            .expect("valid test timestamp")
    }

    fn seconds_of(spec: &DownloadSpec) -> f64 {
        match spec.estimate() {
            Estimate::Finite { seconds } => seconds,
            other => panic!("expected finite estimate, got {other:?}"),
        }
    }

    #[test]
    fn one_gigabyte_over_100_mbps() {
        let spec = DownloadSpec::new(1.0, SizeUnit::Gigabytes, 100.0, SpeedUnit::MegabitsPerSec);
        let expected = 8.0 * 1_073_741_824.0 / 100_000_000.0;
        assert!((seconds_of(&spec) - expected).abs() < 1e-9);

        let report = spec.report(&at(15, 0));
        assert_eq!(
            report,
            EstimateReport {
                duration: "1m 25s".into(),
                finish_time: "03:01 PM".into(),
                seconds: Some(expected),
            }
        );
    }

    #[test]
    fn real_megabytes_per_second_counts_bytes() {
        let spec = DownloadSpec::new(100.0, SizeUnit::Megabytes, 1.0, SpeedUnit::MegabytesPerSec);
        let expected = 100.0 * 8.0 * 1_048_576.0 / 8_000_000.0;
        assert!((seconds_of(&spec) - expected).abs() < 1e-9);
    }

    #[test]
    fn long_downloads_show_days() {
        // 1 TB at 1 Mbps ≈ 101.8 days
        let spec = DownloadSpec::new(1.0, SizeUnit::Terabytes, 1.0, SpeedUnit::MegabitsPerSec);
        let report = spec.report(&at(9, 30));
        assert_eq!(report.duration, "101d 19h 21m");
    }

    #[test]
    fn hours_minutes_seconds_in_the_middle_range() {
        let spec = DownloadSpec::new(4_295.0, SizeUnit::Bytes, 8.0, SpeedUnit::BitsPerSec);
        let report = spec.report(&at(0, 0));
        assert_eq!(report.duration, "1h 11m 35s");
        assert_eq!(report.finish_time, "01:11 AM");
    }

    #[test]
    fn zero_or_negative_input_is_placeholder() {
        for (size, speed) in [(0.0, 10.0), (10.0, 0.0), (-1.0, 10.0), (10.0, -3.0), (f64::NAN, 1.0)] {
            let spec = DownloadSpec::new(size, SizeUnit::Megabytes, speed, SpeedUnit::MegabitsPerSec);
            assert_eq!(spec.estimate(), Estimate::Placeholder);
            assert_eq!(spec.report(&at(12, 0)), EstimateReport::placeholder());
        }
    }

    #[test]
    fn absurd_ratios_are_unbounded() {
        let spec = DownloadSpec::new(1e300, SizeUnit::Terabytes, 1e-300, SpeedUnit::BitsPerSec);
        assert_eq!(spec.estimate(), Estimate::Unbounded);

        let report = spec.report(&at(12, 0));
        assert_eq!(report.duration, UNBOUNDED_DURATION);
        assert_eq!(report.finish_time, PLACEHOLDER_FINISH);
    }

    #[test]
    fn finish_past_the_calendar_is_unbounded() {
        // Representable as a TimeDelta, but tens of millions of years out.
        let seconds = 1e15;
        assert!(to_time_delta(seconds).is_some());
        let estimate = Estimate::Finite { seconds };
        assert_eq!(estimate.report(&at(12, 0)), EstimateReport::unbounded());
    }
}
