use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc,
};
use serde::Deserialize;
use thiserror::Error;

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("month must look like YYYY-MM, got {0:?}")]
    Format(String),
    #[error("month number {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("month {0} cannot be represented in the local time zone")]
    Unrepresentable(String),
}

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The month an instant falls in, as seen on the wall clock of its zone.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let day = instant.date_naive();
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    /// Resolves the half-open interval `[start, end)` of this month in `tz`.
    pub fn range_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<MonthRange<Tz>, MonthError> {
        let unrepresentable = || MonthError::Unrepresentable(self.to_string());
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(unrepresentable)?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(unrepresentable)?;
        Ok(MonthRange {
            start: start_of_day(tz, first).ok_or_else(unrepresentable)?,
            end: start_of_day(tz, next).ok_or_else(unrepresentable)?,
        })
    }
}

impl FromStr for YearMonth {
    type Err = MonthError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let format_error = || MonthError::Format(input.to_string());
        let (year, month) = input.trim().split_once('-').ok_or_else(format_error)?;
        let year: i32 = year.parse().map_err(|_| format_error())?;
        let month: u32 = month.parse().map_err(|_| format_error())?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Half-open interval covering one calendar month.
#[derive(Debug, Clone)]
pub struct MonthRange<Tz: TimeZone = Local> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl MonthRange<Local> {
    /// Range for `month` (`YYYY-MM`) in local time, or the current local month
    /// when `month` is absent or blank.
    pub fn resolve(month: Option<&str>) -> Result<Self, MonthError> {
        Self::resolve_in(&Local, month, Local::now())
    }
}

impl<Tz: TimeZone> MonthRange<Tz> {
    pub fn resolve_in(tz: &Tz, month: Option<&str>, now: DateTime<Tz>) -> Result<Self, MonthError> {
        let month = match month.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => raw.parse::<YearMonth>()?,
            None => YearMonth::of(&now),
        };
        month.range_in(tz)
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(&self.start)
    }

    pub fn label(&self) -> String {
        self.year_month().to_string()
    }

    #[cfg(test)]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        let instant = instant.naive_utc();
        self.start.naive_utc() <= instant && instant < self.end.naive_utc()
    }

    pub fn to_utc(&self) -> MonthRange<Utc> {
        MonthRange {
            start: self.start.with_timezone(&Utc),
            end: self.end.with_timezone(&Utc),
        }
    }
}

/// First instant of `day` in `tz`. When midnight falls in a DST gap the clock
/// is stepped forward a whole hour at a time until it exists; an ambiguous
/// midnight takes its earlier occurrence.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=3).find_map(|hours| {
        tz.from_local_datetime(&(midnight + TimeDelta::hours(hours)))
            .earliest()
    })
}

/// A record date as sent by clients: epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl DateInput {
    /// Accepts RFC 3339, naive date-times and bare dates; the naive forms are
    /// read as wall-clock time in `tz`.
    pub fn resolve_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            DateInput::Text(text) => parse_date_text(tz, text.trim()),
        }
    }
}

fn parse_date_text<Tz: TimeZone>(tz: &Tz, text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    start_of_day(tz, day).map(|local| local.with_timezone(&Utc))
}
