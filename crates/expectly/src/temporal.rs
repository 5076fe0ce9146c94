//! Calendar helpers for date matchers.
//!
//! Calendar comparisons read the year/month/day/weekday fields of the first
//! date, after moving the second date into the first date's offset. Two
//! instants 23 hours apart can therefore be the same day or adjacent days
//! depending on the offset they are read in.
//!
//! [`DeviationWindow`] converts exactly to milliseconds. [`CalendarSpan`]
//! uses average month (30.44 days) and year (365.25 days) lengths and is
//! approximate by construction.

use crate::result::{ExpectlyError, ExpectlyResult};
use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Date type used by every date matcher
pub type Date = DateTime<FixedOffset>;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Average days per month used by [`CalendarSpan`]
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.44;

/// Average days per year used by [`CalendarSpan`]
pub const AVERAGE_DAYS_PER_YEAR: f64 = 365.25;

// =============================================================================
// PARSING
// =============================================================================

/// Parse RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]` (UTC) or `YYYY-MM-DD` (UTC midnight)
pub fn parse_date(input: &str) -> ExpectlyResult<Date> {
    let trimmed = input.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(day) => day
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset())
            .ok_or_else(|| invalid_date(input, "midnight is not representable")),
        Err(e) => Err(invalid_date(input, &e.to_string())),
    }
}

/// Parse every input, failing on the first invalid one
pub fn parse_dates<I, S>(inputs: I) -> ExpectlyResult<Vec<Date>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs.into_iter().map(|s| parse_date(s.as_ref())).collect()
}

/// Date from epoch milliseconds (UTC)
pub fn from_timestamp_millis(ms: i64) -> ExpectlyResult<Date> {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.fixed_offset())
        .ok_or_else(|| invalid_date(&ms.to_string(), "timestamp out of range"))
}

fn invalid_date(input: &str, message: &str) -> ExpectlyError {
    ExpectlyError::InvalidDate {
        input: input.to_string(),
        message: message.to_string(),
    }
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-])(\d{2})(?::?(\d{2}))?$").unwrap_or_else(|e| panic!("offset pattern: {e}"))
    })
}

/// Parse `Z`, `±HH:MM`, `±HHMM` or `±HH`
pub fn parse_offset(input: &str) -> ExpectlyResult<FixedOffset> {
    let invalid = || ExpectlyError::InvalidTimezoneOffset {
        input: input.to_string(),
    };
    if input.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }
    let caps = offset_pattern().captures(input).ok_or_else(invalid)?;
    let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;
    if hours > 14 || minutes >= 60 {
        return Err(invalid());
    }
    let seconds = hours * 3600 + minutes * 60;
    let seconds = if &caps[1] == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).ok_or_else(invalid)
}

// =============================================================================
// CALENDAR FIELDS
// =============================================================================

fn aligned(reference: &Date, other: &Date) -> Date {
    other.with_timezone(reference.offset())
}

/// Same year, month and day
pub fn same_day(a: &Date, b: &Date) -> bool {
    let b = aligned(a, b);
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// Same year and month
pub fn same_month(a: &Date, b: &Date) -> bool {
    let b = aligned(a, b);
    a.year() == b.year() && a.month() == b.month()
}

/// Same year
pub fn same_year(a: &Date, b: &Date) -> bool {
    aligned(a, b).year() == a.year()
}

/// Same day of the week (any week)
pub fn same_weekday(a: &Date, b: &Date) -> bool {
    aligned(a, b).weekday() == a.weekday()
}

/// Same year and quarter
pub fn same_quarter(a: &Date, b: &Date) -> bool {
    let b = aligned(a, b);
    a.year() == b.year() && quarter(a) == quarter(&b)
}

/// Quarter of the year, 1..=4
pub fn quarter(date: &Date) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Day of week with Sunday = 0
pub fn day_of_week(date: &Date) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Saturday or Sunday
pub fn is_weekend(date: &Date) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// =============================================================================
// CONSECUTIVE DATES
// =============================================================================

/// Calendar step for consecutiveness checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// One calendar day
    Day,
    /// One calendar month
    Month,
    /// One calendar year
    Year,
}

impl TimeUnit {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advance by one calendar unit; month steps clamp to the last day (Jan 31 -> Feb 29)
pub fn advance(date: &Date, unit: TimeUnit) -> Option<Date> {
    match unit {
        TimeUnit::Day => date.checked_add_days(Days::new(1)),
        TimeUnit::Month => date.checked_add_months(Months::new(1)),
        TimeUnit::Year => date.checked_add_months(Months::new(12)),
    }
}

fn same_in_unit(a: &Date, b: &Date, unit: TimeUnit) -> bool {
    match unit {
        TimeUnit::Day => same_day(a, b),
        TimeUnit::Month => same_month(a, b),
        TimeUnit::Year => same_year(a, b),
    }
}

/// First place where a date is not exactly one unit after its predecessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsecutiveViolation {
    /// Index of the offending date
    pub index: usize,
    /// Date before it
    pub previous: Date,
    /// Offending date
    pub current: Date,
    /// What was expected at `index`
    pub expected: Date,
}

/// Check each date is one `unit` after the previous one
pub fn check_consecutive(dates: &[Date], unit: TimeUnit) -> ExpectlyResult<Option<ConsecutiveViolation>> {
    for (index, pair) in dates.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let expected = advance(previous, unit).ok_or_else(|| {
            invalid_date(&previous.to_rfc3339(), "cannot advance past the representable range")
        })?;
        if !same_in_unit(&expected, current, unit) {
            return Ok(Some(ConsecutiveViolation {
                index: index + 1,
                previous: *previous,
                current: *current,
                expected,
            }));
        }
    }
    Ok(None)
}

// =============================================================================
// WINDOWS
// =============================================================================

/// Exact tolerance made of days, hours, minutes and seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationWindow {
    /// Days
    pub days: i64,
    /// Hours
    pub hours: i64,
    /// Minutes
    pub minutes: i64,
    /// Seconds
    pub seconds: i64,
}

impl DeviationWindow {
    /// Empty window
    #[must_use]
    pub const fn new() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Set days
    #[must_use]
    pub const fn with_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    /// Set hours
    #[must_use]
    pub const fn with_hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    /// Set minutes
    #[must_use]
    pub const fn with_minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    /// Set seconds
    #[must_use]
    pub const fn with_seconds(mut self, seconds: i64) -> Self {
        self.seconds = seconds;
        self
    }

    /// Exact total in milliseconds, `None` when it does not fit in an `i64`
    #[must_use]
    pub fn to_millis(&self) -> Option<i64> {
        [
            (self.days, MS_PER_DAY),
            (self.hours, MS_PER_HOUR),
            (self.minutes, MS_PER_MINUTE),
            (self.seconds, MS_PER_SECOND),
        ]
        .into_iter()
        .try_fold(0i64, |total, (count, unit)| total.checked_add(count.checked_mul(unit)?))
    }
}

impl fmt::Display for DeviationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Approximate span made of days, months and years
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSpan {
    /// Days
    pub days: i64,
    /// Months (30.44 days each)
    pub months: i64,
    /// Years (365.25 days each)
    pub years: i64,
}

impl CalendarSpan {
    /// Empty span
    #[must_use]
    pub const fn new() -> Self {
        Self {
            days: 0,
            months: 0,
            years: 0,
        }
    }

    /// Set days
    #[must_use]
    pub const fn with_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    /// Set months
    #[must_use]
    pub const fn with_months(mut self, months: i64) -> Self {
        self.months = months;
        self
    }

    /// Set years
    #[must_use]
    pub const fn with_years(mut self, years: i64) -> Self {
        self.years = years;
        self
    }

    /// Approximate total in milliseconds
    #[must_use]
    pub fn approx_millis(&self) -> f64 {
        let days = self.days as f64
            + self.months as f64 * AVERAGE_DAYS_PER_MONTH
            + self.years as f64 * AVERAGE_DAYS_PER_YEAR;
        days * MS_PER_DAY as f64
    }
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}y {}mo {}d", self.years, self.months, self.days)
    }
}

/// Milliseconds between the earliest and latest date
pub fn date_span(dates: &[Date]) -> Option<i64> {
    let earliest = dates.iter().map(DateTime::timestamp_millis).min()?;
    let latest = dates.iter().map(DateTime::timestamp_millis).max()?;
    Some(latest - earliest)
}

/// Largest gap between chronologically adjacent dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// Earlier date
    pub from: Date,
    /// Later date
    pub to: Date,
    /// Gap in milliseconds
    pub millis: i64,
}

/// Largest gap after sorting chronologically; `None` for fewer than two dates
pub fn max_gap(dates: &[Date]) -> Option<Gap> {
    let mut sorted = dates.to_vec();
    sorted.sort_by_key(DateTime::timestamp_millis);
    sorted
        .windows(2)
        .map(|pair| Gap {
            from: pair[0],
            to: pair[1],
            millis: pair[1].timestamp_millis() - pair[0].timestamp_millis(),
        })
        .max_by_key(|gap| gap.millis)
}

/// Human-readable milliseconds, e.g. `2d 3h 0m 5s`
pub fn format_millis(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let days = ms / MS_PER_DAY as u64;
    let hours = (ms % MS_PER_DAY as u64) / MS_PER_HOUR as u64;
    let minutes = (ms % MS_PER_HOUR as u64) / MS_PER_MINUTE as u64;
    let seconds = (ms % MS_PER_MINUTE as u64) / MS_PER_SECOND as u64;
    format!("{sign}{days}d {hours}h {minutes}m {seconds}s")
}
