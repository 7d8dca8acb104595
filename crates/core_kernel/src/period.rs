//! Billing period and date span types
//!
//! A billing period is one calendar month. All date matching in the billing
//! system is strictly half-open `[start, end)` on dates only; time-of-day
//! and timezone handling stop at the boundary of the external clock
//! collaborator and never reach this crate.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to period operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    #[error("Invalid span: start {start} must be before end {end}")]
    InvalidSpan { start: NaiveDate, end: NaiveDate },

    #[error("Unparseable period: {0}")]
    Unparseable(String),
}

/// One calendar month of billing, identified by year and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a billing period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month (inclusive)
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated year/month")
    }

    /// First day of the following month (exclusive)
    pub fn end(&self) -> NaiveDate {
        self.start() + Months::new(1)
    }

    /// Number of calendar days in the month
    pub fn days(&self) -> i64 {
        (self.end() - self.start()).num_days()
    }

    /// True if the date falls inside `[start, end)`
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date < self.end()
    }

    /// The month's date span
    pub fn span(&self) -> DateSpan {
        DateSpan {
            start: self.start(),
            end: self.end(),
        }
    }

    /// The following period
    pub fn next(&self) -> Self {
        Self::containing(self.end())
    }

    /// The preceding period
    pub fn prev(&self) -> Self {
        Self::containing(self.start() - Months::new(1))
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodError::Unparseable(s.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| PeriodError::Unparseable(s.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| PeriodError::Unparseable(s.to_string()))?;
        Self::new(year, month)
    }
}

/// A half-open date span `[start, end)`
///
/// Container stay mathematics (overlap, clamping, month splitting) all work
/// on this type so the half-open convention is applied in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Creates a span; start must be strictly before end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start >= end {
            return Err(PeriodError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// True if the date falls inside `[start, end)`
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// True if the two spans share at least one day
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The common part of two spans, if any
    pub fn intersect(&self, other: &DateSpan) -> Option<DateSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(DateSpan { start, end })
        } else {
            None
        }
    }

    /// Splits the span at calendar-month boundaries
    ///
    /// Each returned span lies within a single month; together they cover
    /// the original span exactly, in order.
    pub fn split_by_month(&self) -> Vec<DateSpan> {
        let mut segments = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let month_end = BillingPeriod::containing(cursor).end();
            let segment_end = month_end.min(self.end);
            segments.push(DateSpan {
                start: cursor,
                end: segment_end,
            });
            cursor = segment_end;
        }
        segments
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_period_bounds_are_half_open() {
        let march = BillingPeriod::new(2026, 3).unwrap();
        assert_eq!(march.start(), d(2026, 3, 1));
        assert_eq!(march.end(), d(2026, 4, 1));
        assert!(march.contains(d(2026, 3, 1)));
        assert!(march.contains(d(2026, 3, 31)));
        assert!(!march.contains(d(2026, 4, 1)));
        assert_eq!(march.days(), 31);
    }

    #[test]
    fn test_period_rejects_invalid_month() {
        assert_eq!(
            BillingPeriod::new(2026, 13).unwrap_err(),
            PeriodError::InvalidMonth(13)
        );
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let december = BillingPeriod::new(2025, 12).unwrap();
        assert_eq!(december.end(), d(2026, 1, 1));
        assert_eq!(december.next(), BillingPeriod::new(2026, 1).unwrap());
    }

    #[test]
    fn test_period_parse_round_trip() {
        let period = BillingPeriod::new(2026, 3).unwrap();
        assert_eq!(period.to_string(), "2026-03");
        assert_eq!("2026-03".parse::<BillingPeriod>().unwrap(), period);
    }

    #[test]
    fn test_span_split_by_month() {
        let span = DateSpan::new(d(2026, 2, 20), d(2026, 4, 5)).unwrap();
        let segments = span.split_by_month();

        assert_eq!(
            segments,
            vec![
                DateSpan { start: d(2026, 2, 20), end: d(2026, 3, 1) },
                DateSpan { start: d(2026, 3, 1), end: d(2026, 4, 1) },
                DateSpan { start: d(2026, 4, 1), end: d(2026, 4, 5) },
            ]
        );
        let total: i64 = segments.iter().map(DateSpan::days).sum();
        assert_eq!(total, span.days());
    }

    #[test]
    fn test_span_intersect() {
        let a = DateSpan::new(d(2026, 3, 1), d(2026, 3, 20)).unwrap();
        let b = DateSpan::new(d(2026, 3, 15), d(2026, 4, 1)).unwrap();

        assert_eq!(
            a.intersect(&b),
            Some(DateSpan { start: d(2026, 3, 15), end: d(2026, 3, 20) })
        );

        let c = DateSpan::new(d(2026, 4, 1), d(2026, 4, 2)).unwrap();
        assert_eq!(a.intersect(&c), None);
        assert!(!a.overlaps(&c));
    }
}
