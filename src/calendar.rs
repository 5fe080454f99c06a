//! Calendar-month arithmetic for projection timelines

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid calendar month '{0}' (expected YYYY-MM or YYYY-MM-DD)")]
pub struct ParseMonthError(pub String);

/// A year/month pair with no day component
///
/// Ordering is chronological. Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CalendarMonth {
    year: i32,
    /// 1-12
    month: u32,
}

impl CalendarMonth {
    /// Returns `None` when `month` is outside 1-12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First whole month on or after `date`
    ///
    /// A launch on the 1st is active that month; a launch mid-month is first
    /// active the following month.
    pub fn first_full_month_from(date: NaiveDate) -> Self {
        let month = Self::from_date(date);
        if date.day() == 1 {
            month
        } else {
            month.add_months(1)
        }
    }

    /// Month of the local clock
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar month `n` months after this one
    pub fn add_months(&self, n: u32) -> Self {
        let zero_based = self.month as i64 - 1 + n as i64;
        Self {
            year: self.year + zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: &CalendarMonth) -> i64 {
        (self.year as i64 - earlier.year as i64) * 12 + (self.month as i64 - earlier.month as i64)
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is always 1-12, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl Default for CalendarMonth {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = ParseMonthError;

    /// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date (truncated to its month)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }

        let (year, month) = s.split_once('-').ok_or_else(|| ParseMonthError(s.to_string()))?;
        let year: i32 = year.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| ParseMonthError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

impl From<CalendarMonth> for String {
    fn from(month: CalendarMonth) -> Self {
        month.to_string()
    }
}

impl TryFrom<String> for CalendarMonth {
    type Error = ParseMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> CalendarMonth {
        CalendarMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_add_months_rolls_year() {
        assert_eq!(ym(2026, 1).add_months(0), ym(2026, 1));
        assert_eq!(ym(2026, 11).add_months(2), ym(2027, 1));
        assert_eq!(ym(2026, 1).add_months(35), ym(2028, 12));
        assert_eq!(ym(2026, 12).add_months(12), ym(2027, 12));
    }

    #[test]
    fn test_months_since() {
        assert_eq!(ym(2026, 4).months_since(&ym(2026, 1)), 3);
        assert_eq!(ym(2027, 2).months_since(&ym(2026, 11)), 3);
        assert_eq!(ym(2026, 1).months_since(&ym(2026, 6)), -5);
    }

    #[test]
    fn test_launch_rounds_up_mid_month() {
        let on_first = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let mid = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let december = NaiveDate::from_ymd_opt(2026, 12, 3).unwrap();

        assert_eq!(CalendarMonth::first_full_month_from(on_first), ym(2026, 2));
        assert_eq!(CalendarMonth::first_full_month_from(mid), ym(2026, 3));
        assert_eq!(CalendarMonth::first_full_month_from(december), ym(2027, 1));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("2026-03".parse::<CalendarMonth>().unwrap(), ym(2026, 3));
        assert_eq!("2026-03-17".parse::<CalendarMonth>().unwrap(), ym(2026, 3));
        assert_eq!(ym(2026, 3).to_string(), "2026-03");
        assert!("2026-13".parse::<CalendarMonth>().is_err());
        assert!("March".parse::<CalendarMonth>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ym(2027, 9)).unwrap();
        assert_eq!(json, "\"2027-09\"");
        let back: CalendarMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym(2027, 9));
    }
}
