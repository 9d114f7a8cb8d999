//! Human-readable speed and duration formatting.

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * KIB;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_DAY: u64 = 86_400;

/// Format a byte rate: `"512 B/s"`, `"1.50 KB/s"`, `"12.34 MB/s"`.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec < KIB {
        format!("{bytes_per_sec:.0} B/s")
    } else if bytes_per_sec < MIB {
        format!("{:.2} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.2} MB/s", bytes_per_sec / MIB)
    }
}

/// Format a byte count with binary units: `"512 B"`, `"1.50 KB"`, `"3.25 GB"`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / KIB;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < KIB {
            break;
        }
        value /= KIB;
        unit = next;
    }
    format!("{value:.2} {unit}")
}

/// Format whole seconds as `"{d}d {h}h {m}m"`, `"{h}h {m}m {s}s"` or
/// `"{m}m {s}s"` depending on magnitude.
pub fn format_elapsed(total_secs: u64) -> String {
    let days = total_secs / SECS_PER_DAY;
    let hours = (total_secs % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total_secs % SECS_PER_MINUTE;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Format the remaining countdown compactly (`"42s"`, `"3m 05s"`).
pub fn format_countdown(secs: u64) -> String {
    if secs >= SECS_PER_MINUTE {
        format!("{}m {:02}s", secs / SECS_PER_MINUTE, secs % SECS_PER_MINUTE)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_switches_units_at_binary_boundaries() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(1023.0), "1023 B/s");
        assert_eq!(format_speed(1024.0), "1.00 KB/s");
        assert_eq!(format_speed(1536.0), "1.50 KB/s");
        assert_eq!(format_speed(MIB), "1.00 MB/s");
        assert_eq!(format_speed(12.5 * MIB), "12.50 MB/s");
    }

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024 * 1024), "2048.00 TB");
    }

    #[test]
    fn elapsed_picks_granularity() {
        assert_eq!(format_elapsed(0), "0m 0s");
        assert_eq!(format_elapsed(59), "0m 59s");
        assert_eq!(format_elapsed(3_599), "59m 59s");
        assert_eq!(format_elapsed(3_600), "1h 0m 0s");
        assert_eq!(format_elapsed(4_295), "1h 11m 35s");
        assert_eq!(format_elapsed(86_400), "1d 0h 0m");
        assert_eq!(format_elapsed(90_061), "1d 1h 1m");
    }

    #[test]
    fn countdown_pads_seconds_past_a_minute() {
        assert_eq!(format_countdown(7), "7s");
        assert_eq!(format_countdown(185), "3m 05s");
    }
}
