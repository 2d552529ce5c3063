//! In-game calendar
//!
//! Simplified model: 60 minutes/hour, 24 hours/day, 365 days/year, no leap
//! years or months. Good enough for monotonic, human-legible progression.

use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: i64 = 60;
pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_YEAR: i64 = 365;

/// A point on the in-game calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub year: i64,
    /// 1..=365
    pub day: i64,
    /// 0..=23
    pub hour: i64,
    /// 0..=59
    pub minute: i64,
}

impl Default for GameTime {
    fn default() -> Self {
        // Fresh campaigns open at noon on the first day of 1491
        Self { year: 1491, day: 1, hour: 12, minute: 0 }
    }
}

impl GameTime {
    /// Advance the calendar by the given amounts
    ///
    /// Carries cascade minutes -> hours -> days -> years, and `day` is
    /// re-normalized into 1..=365 after both the carried and explicit days
    /// are applied. Negative amounts rewind and normalize the same way.
    /// Every carry saturates at the i64 bounds instead of wrapping.
    pub fn advance(&mut self, years: i64, days: i64, hours: i64, minutes: i64) {
        let total_minutes = self.minute.saturating_add(minutes);
        self.minute = total_minutes.rem_euclid(MINUTES_PER_HOUR);

        let total_hours = self
            .hour
            .saturating_add(hours)
            .saturating_add(total_minutes.div_euclid(MINUTES_PER_HOUR));
        self.hour = total_hours.rem_euclid(HOURS_PER_DAY);

        // Day is 1-based; shift to 0-based for the carry arithmetic
        let total_days = (self.day - 1)
            .saturating_add(days)
            .saturating_add(total_hours.div_euclid(HOURS_PER_DAY));
        self.day = total_days.rem_euclid(DAYS_PER_YEAR) + 1;

        self.year = self
            .year
            .saturating_add(years)
            .saturating_add(total_days.div_euclid(DAYS_PER_YEAR));
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Year {}, Day {}, {:02}:{:02}",
            self.year, self.day, self.hour, self.minute
        )
    }
}
