//! Wall-clock arithmetic
//!
//! The firmware keeps time as unix seconds (SNTP-anchored); this module
//! turns that into a local time of day under a whole-hour UTC offset.

use core::fmt;

/// A local time of day. The date is irrelevant to the marquee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    /// Convert unix seconds to local time of day under `tz_hours`.
    /// Wraps at 24:00 in both directions (negative offsets near midnight
    /// land on the previous day's evening hours).
    pub fn from_unix(unix_secs: u64, tz_hours: i8) -> Self {
        let day_secs = (unix_secs % 86_400) as i64 + i64::from(tz_hours) * 3_600;
        let day_secs = day_secs.rem_euclid(86_400) as u32;
        Self {
            hour: (day_secs / 3_600) as u8,
            minute: (day_secs % 3_600 / 60) as u8,
            second: (day_secs % 60) as u8,
        }
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}
