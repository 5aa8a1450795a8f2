//! Rendering of instants for the dashboard.

use chrono::{DateTime, FixedOffset, Offset, Utc};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders UTC instants in the dashboard's local offset.
#[derive(Debug, Clone, Copy)]
pub struct DisplayClock {
    offset: FixedOffset,
}

impl DisplayClock {
    /// Clock for `hours` east of UTC; out-of-range offsets fall back to UTC.
    pub fn from_offset_hours(hours: i32) -> Self {
        // ---
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| {
            tracing::warn!("Display offset of {} hours is out of range, using UTC", hours);
            utc()
        });
        Self { offset }
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(DISPLAY_FORMAT)
            .to_string()
    }
}

impl Default for DisplayClock {
    fn default() -> Self {
        Self { offset: utc() }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
