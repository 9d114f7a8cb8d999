//! Compact rate formatting for chart labels.

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Compact rate for chart Y-axis labels: "512B", "40K", "1.5M", "2.0G".
/// Input is bytes/sec, scaled by 1024 like the live speed readout.
pub fn fmt_rate_axis(bytes_per_sec: f64) -> String {
    let rate = bytes_per_sec.max(0.0);
    if rate >= GIB {
        format!("{:.1}G", rate / GIB)
    } else if rate >= MIB {
        format!("{:.1}M", rate / MIB)
    } else if rate >= KIB {
        format!("{:.0}K", rate / KIB)
    } else {
        format!("{rate:.0}B")
    }
}

/// Upper bound for a rate chart: 20% headroom over the peak, never
/// below 1 KiB/s so an idle link still draws a flat line.
pub fn chart_ceiling(peak_bytes_per_sec: f64) -> f64 {
    (peak_bytes_per_sec * 1.2).max(KIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_scale_by_1024() {
        assert_eq!(fmt_rate_axis(0.0), "0B");
        assert_eq!(fmt_rate_axis(512.0), "512B");
        assert_eq!(fmt_rate_axis(40.0 * KIB), "40K");
        assert_eq!(fmt_rate_axis(1.5 * MIB), "1.5M");
        assert_eq!(fmt_rate_axis(2.0 * GIB), "2.0G");
    }

    #[test]
    fn negative_rates_clamp_to_zero() {
        assert_eq!(fmt_rate_axis(-5.0), "0B");
    }

    #[test]
    fn ceiling_has_headroom_and_floor() {
        assert!((chart_ceiling(0.0) - KIB).abs() < f64::EPSILON);
        assert!((chart_ceiling(10.0 * KIB) - 12.0 * KIB).abs() < 1e-9);
    }
}
