//! Injectable time source.
//!
//! Stores never read the wall clock directly. They ask a `Clock` for the
//! current instant (creation timestamps) and for "today" (habit streaks), so
//! tests can move across day boundaries deterministically.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which calendar a "day" is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
}

pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date.
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch, as stored in `createdAt`.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    boundary: DayBoundary,
}

impl SystemClock {
    pub fn new(boundary: DayBoundary) -> Self {
        Self { boundary }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        match self.boundary {
            DayBoundary::Local => Local::now().date_naive(),
            DayBoundary::Utc => Utc::now().date_naive(),
        }
    }
}

/// Manually driven clock. "Today" is the UTC date of the held instant.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Clock set to noon UTC on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(noon(date))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set(noon(date));
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

fn noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fixed_clock_moves_between_days() {
        let clock = FixedClock::at_date(date("2024-01-01"));
        assert_eq!(clock.today(), date("2024-01-01"));

        clock.advance(Duration::hours(11));
        assert_eq!(clock.today(), date("2024-01-01"));
        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), date("2024-01-02"));

        clock.set_date(date("2024-03-01"));
        assert_eq!(clock.today(), date("2024-03-01"));
    }

    #[test]
    fn test_now_millis_matches_instant() {
        let clock = FixedClock::at_date(date("2024-01-01"));
        assert_eq!(clock.now_millis(), 1_704_110_400_000);
    }

    #[test]
    fn test_day_boundary_parsing() {
        use clap::ValueEnum;
        assert_eq!(DayBoundary::from_str("UTC", true).unwrap(), DayBoundary::Utc);
        assert_eq!(DayBoundary::from_str("local", false).unwrap(), DayBoundary::Local);
        assert!(DayBoundary::from_str("mars", true).is_err());
    }
}
