//! Power-source usage table formatting.

use crate::display::DisplayClock;
use crate::models::{DisplayRow, UsageInterval};

// ---

pub const ONGOING: &str = "Ongoing";
pub const NOT_AVAILABLE: &str = "N/A";

/// Render one usage interval as a table row.
pub fn format_interval(interval: &UsageInterval, clock: &DisplayClock) -> DisplayRow {
    // ---
    DisplayRow {
        id: interval.id.to_string(),
        device_id: interval.device_id.clone(),
        power_source: interval.power_source.clone(),
        start_time: clock.format(interval.start_time),
        end_time: interval
            .end_time
            .map_or_else(|| ONGOING.to_string(), |end| clock.format(end)),
        usage_time: interval
            .usage_time
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_duration),
        ongoing: interval.end_time.is_none(),
    }
}

/// `HH:MM:SS` with unbounded hours; fractions are truncated, negatives clamp to zero.
pub fn format_duration(seconds: f64) -> String {
    // ---
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hrs = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hrs:02}:{mins:02}:{secs:02}")
}
