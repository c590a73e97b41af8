//! Clock times on a convention day.
//!
//! Times are minutes since the start of the grid day. Hours are allowed to
//! run past 23 so that an event starting at 23:30 for 120 minutes ends at
//! `25:30` on the same grid day instead of moving to the next date.

use serde::{Serialize, Serializer};
use std::fmt;

/// Longest duration accepted for a single item: one week.
pub const MAX_DURATION_MINS: u32 = 24 * 60 * 7;

/// Minutes since midnight of the grid day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        ClockTime(hours.saturating_mul(60).saturating_add(minutes))
    }

    /// Parse `HH:MM` (also `H:MM` and `HH:MM:SS`, seconds ignored).
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let hours = parts.next()?.trim().parse::<u32>().ok()?;
        let minutes = parts.next()?.trim().parse::<u32>().ok()?;
        if minutes >= 60 {
            return None;
        }
        hours.checked_mul(60)?.checked_add(minutes).map(ClockTime)
    }

    pub fn hours(self) -> u32 {
        self.0 / 60
    }

    pub fn minutes(self) -> u32 {
        self.0 % 60
    }

    pub fn total_minutes(self) -> u32 {
        self.0
    }

    pub fn plus_minutes(self, mins: u32) -> Self {
        ClockTime(self.0.saturating_add(mins))
    }

    /// Minutes from `self` until `later`, zero if `later` is not after `self`.
    pub fn minutes_until(self, later: ClockTime) -> u32 {
        later.0.saturating_sub(self.0)
    }

    /// 12-hour display form, e.g. `2:00pm`, `12:30am`. Hours past 23 wrap.
    pub fn display_12h(self) -> String {
        let hour = self.hours() % 24;
        let suffix = if hour < 12 { "am" } else { "pm" };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02}{}", hour12, self.minutes(), suffix)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a duration cell. `None` for missing, negative, non-numeric input or
/// anything longer than [`MAX_DURATION_MINS`].
pub fn parse_minutes(raw: Option<&str>) -> Option<u32> {
    let value = raw?.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.round() <= f64::from(MAX_DURATION_MINS) {
        Some(value.round() as u32)
    } else {
        None
    }
}
