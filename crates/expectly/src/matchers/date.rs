//! Date and date-sequence matchers.
//!
//! Calendar comparisons read fields in the offset of the actual date. Range
//! and gap tolerances given as a [`CalendarSpan`] use average month and year
//! lengths.

use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::temporal::{
    self, check_consecutive, date_span, format_millis, max_gap, parse_offset, CalendarSpan, Date,
    DeviationWindow, TimeUnit,
};
use chrono::{Datelike, SecondsFormat};

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn show(date: &Date) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn show_all(ctx: &MatcherContext, dates: &[Date]) -> String {
    let rendered: Vec<String> = dates.iter().map(show).collect();
    ctx.excerpt(&rendered)
}

fn calendar(
    ctx: &MatcherContext,
    name: &'static str,
    unit: &str,
    actual: &Date,
    other: &Date,
    same: fn(&Date, &Date) -> bool,
) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(same(actual, other), show(actual), format!("be the same {unit} as {}", show(other)));
    Ok(MatcherResult::from_outcome(name, &outcome, ctx))
}

/// Same calendar day
pub fn to_be_same_day(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    calendar(ctx, "to_be_same_day", "day", actual, other, temporal::same_day)
}

/// Same calendar month of the same year
pub fn to_be_same_month(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    calendar(ctx, "to_be_same_month", "month", actual, other, temporal::same_month)
}

/// Same year
pub fn to_be_same_year(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    calendar(ctx, "to_be_same_year", "year", actual, other, temporal::same_year)
}

/// Same day of the week
pub fn to_be_same_weekday(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    calendar(ctx, "to_be_same_weekday", "weekday", actual, other, temporal::same_weekday)
}

/// Same quarter of the same year
pub fn to_be_same_quarter(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    calendar(ctx, "to_be_same_quarter", "quarter", actual, other, temporal::same_quarter)
}

/// Strictly earlier instant
pub fn to_be_before(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(actual < other, show(actual), format!("be before {}", show(other)));
    Ok(MatcherResult::from_outcome("to_be_before", &outcome, ctx))
}

/// Strictly later instant
pub fn to_be_after(ctx: &MatcherContext, actual: &Date, other: &Date) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(actual > other, show(actual), format!("be after {}", show(other)));
    Ok(MatcherResult::from_outcome("to_be_after", &outcome, ctx))
}

/// Within `window` of `expected`, either side
pub fn to_be_close_to_date(
    ctx: &MatcherContext,
    actual: &Date,
    expected: &Date,
    window: DeviationWindow,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_be_close_to_date";
    let tolerance = window.to_millis().ok_or_else(|| {
        ExpectlyError::invalid_argument(NAME, format!("deviation window ({window}) is too large"))
    })?;
    if tolerance < 0 {
        return Err(ExpectlyError::invalid_argument(
            NAME,
            format!("deviation window ({window}) must not be negative"),
        ));
    }
    let difference = (actual.timestamp_millis() - expected.timestamp_millis()).abs();
    let detail = format!("difference is {}", format_millis(difference));
    let outcome = Outcome::new(
        difference <= tolerance,
        show(actual),
        format!("be within {window} of {}", show(expected)),
    )
    .with_failure_detail(&detail)
    .with_pass_detail(&detail);
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Monday through Friday
pub fn to_be_weekday(ctx: &MatcherContext, actual: &Date) -> ExpectlyResult<MatcherResult> {
    let day = WEEKDAY_NAMES[temporal::day_of_week(actual) as usize];
    let outcome = Outcome::new(!temporal::is_weekend(actual), show(actual), "fall on a weekday")
        .with_failure_detail(format!("it is a {day}"));
    Ok(MatcherResult::from_outcome("to_be_weekday", &outcome, ctx))
}

/// Saturday or Sunday
pub fn to_be_weekend(ctx: &MatcherContext, actual: &Date) -> ExpectlyResult<MatcherResult> {
    let day = WEEKDAY_NAMES[temporal::day_of_week(actual) as usize];
    let outcome = Outcome::new(temporal::is_weekend(actual), show(actual), "fall on a weekend")
        .with_failure_detail(format!("it is a {day}"));
    Ok(MatcherResult::from_outcome("to_be_weekend", &outcome, ctx))
}

/// Month number, 1 = January
pub fn to_be_in_month(ctx: &MatcherContext, actual: &Date, month: u32) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_be_in_month";
    if !(1..=12).contains(&month) {
        return Err(ExpectlyError::OutOfRange {
            matcher: NAME,
            name: "month",
            min: 1,
            max: 12,
            value: i64::from(month),
        });
    }
    let outcome = Outcome::new(actual.month() == month, show(actual), format!("be in month {month}"));
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Day of the week, 0 = Sunday
pub fn to_be_day_of_week(ctx: &MatcherContext, actual: &Date, day: u32) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_be_day_of_week";
    let Some(expected) = WEEKDAY_NAMES.get(day as usize) else {
        return Err(ExpectlyError::OutOfRange {
            matcher: NAME,
            name: "day",
            min: 0,
            max: 6,
            value: i64::from(day),
        });
    };
    let actual_day = temporal::day_of_week(actual);
    let outcome = Outcome::new(actual_day == day, show(actual), format!("fall on a {expected}"))
        .with_failure_detail(format!("it is a {}", WEEKDAY_NAMES[actual_day as usize]));
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// UTC offset equals `offset` (`Z`, `±HH:MM`, `±HHMM` or `±HH`)
pub fn to_have_timezone_offset(ctx: &MatcherContext, actual: &Date, offset: &str) -> ExpectlyResult<MatcherResult> {
    let expected = parse_offset(offset)?;
    let outcome = Outcome::new(
        actual.offset().local_minus_utc() == expected.local_minus_utc(),
        show(actual),
        format!("have offset {expected}"),
    )
    .with_failure_detail(format!("offset is {}", actual.offset()));
    Ok(MatcherResult::from_outcome("to_have_timezone_offset", &outcome, ctx))
}

fn require_dates(name: &'static str, dates: &[Date]) -> ExpectlyResult<()> {
    if dates.is_empty() {
        return Err(ExpectlyError::EmptyInput {
            matcher: name,
            what: "list of dates",
        });
    }
    Ok(())
}

/// Each date exactly one `unit` after the previous
pub fn to_have_consecutive_dates(ctx: &MatcherContext, actual: &[Date], unit: TimeUnit) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_consecutive_dates";
    require_dates(NAME, actual)?;
    let violation = check_consecutive(actual, unit)?;
    let mut outcome = Outcome::new(violation.is_none(), show_all(ctx, actual), format!("be consecutive by {unit}"));
    if let Some(v) = violation {
        outcome = outcome.with_failure_detail(format!(
            "index {} is {}, previous {}, expected {}",
            v.index,
            show(&v.current),
            show(&v.previous),
            show(&v.expected)
        ));
    }
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Earliest to latest fits within `span`
pub fn to_span_at_most(ctx: &MatcherContext, actual: &[Date], span: CalendarSpan) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_span_at_most";
    require_dates(NAME, actual)?;
    let covered = date_span(actual).unwrap_or(0);
    let detail = format!("span is {}", format_millis(covered));
    let outcome = Outcome::new(
        covered as f64 <= span.approx_millis(),
        show_all(ctx, actual),
        format!("span at most {span}"),
    )
    .with_failure_detail(&detail)
    .with_pass_detail(&detail);
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// No chronological gap exceeds `span`
pub fn to_have_max_gap(ctx: &MatcherContext, actual: &[Date], span: CalendarSpan) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_max_gap";
    require_dates(NAME, actual)?;
    let gap = max_gap(actual);
    let pass = gap.map_or(true, |g| g.millis as f64 <= span.approx_millis());
    let mut outcome = Outcome::new(pass, show_all(ctx, actual), format!("have no gap longer than {span}"));
    if let Some(g) = gap {
        let detail = format!(
            "largest gap is {} between {} and {}",
            format_millis(g.millis),
            show(&g.from),
            show(&g.to)
        );
        outcome = outcome.with_failure_detail(&detail).with_pass_detail(&detail);
    }
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}
