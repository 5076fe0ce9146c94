//! `expect(actual)` assertion builder.
//!
//! ```ignore
//! expect("https://example.com").to_start_with("https://")?;
//! expect(&scores[..]).not().to_have_unique_values()?;
//! expect(&element).to_have_class("active", ElementOptions::new()).await?;
//! ```
//!
//! Every method runs one matcher, then [`verify`] turns a result whose
//! `pass` equals the negation flag into [`ExpectlyError::AssertionError`].
//! Argument errors from the matcher are returned unchanged.

use crate::config::ExpectConfig;
use crate::matcher::{MatcherContext, MatcherResult};
use crate::matchers::{any, date, numeric, sequence, string};
use crate::ordering::Direction;
use crate::poll::{poll_blocking, PollSchedule};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::shape::Shape;
use crate::temporal::{parse_date, CalendarSpan, Date, DeviationWindow, TimeUnit};
use crate::value::Value;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "dom")]
use crate::config::{ElementOptions, StabilityOptions};
#[cfg(feature = "dom")]
use crate::element::ElementHandle;
#[cfg(feature = "dom")]
use crate::matchers::dom;

/// Succeed when the assertion as written holds, otherwise `AssertionError`
pub fn verify(result: MatcherResult) -> ExpectlyResult<MatcherResult> {
    if result.succeeded() {
        Ok(result)
    } else {
        debug!(matcher = result.name(), negated = result.is_not(), "assertion failed");
        Err(ExpectlyError::AssertionError {
            message: result.message().to_string(),
        })
    }
}

/// Assertion builder for one actual value
#[derive(Debug, Clone)]
pub struct Expect<A> {
    actual: A,
    ctx: MatcherContext,
}

/// Start an assertion
#[must_use]
pub fn expect<A>(actual: A) -> Expect<A> {
    Expect {
        actual,
        ctx: MatcherContext::new(),
    }
}

/// Start a date assertion from a string
pub fn expect_date(input: &str) -> ExpectlyResult<Expect<Date>> {
    Ok(expect(parse_date(input)?))
}

impl<A> Expect<A> {
    /// Negate the assertion
    #[must_use]
    pub fn not(mut self) -> Self {
        self.ctx.is_not = !self.ctx.is_not;
        self
    }

    /// Use a specific configuration
    #[must_use]
    pub fn with_config(mut self, config: ExpectConfig) -> Self {
        self.ctx.config = config;
        self
    }

    /// Context passed to matchers
    #[must_use]
    pub const fn context(&self) -> &MatcherContext {
        &self.ctx
    }

    /// The value under test
    #[must_use]
    pub const fn actual(&self) -> &A {
        &self.actual
    }

    /// Run a custom matcher
    pub fn to_satisfy<F>(&self, matcher: F) -> ExpectlyResult<MatcherResult>
    where
        F: FnOnce(&MatcherContext, &A) -> ExpectlyResult<MatcherResult>,
    {
        verify(matcher(&self.ctx, &self.actual)?)
    }
}

// =============================================================================
// ANY VALUE
// =============================================================================

impl Expect<Value> {
    /// See [`any::to_be_one_of`]
    pub fn to_be_one_of(&self, options: &[Value]) -> ExpectlyResult<MatcherResult> {
        verify(any::to_be_one_of(&self.ctx, &self.actual, options)?)
    }

    /// See [`any::to_be_nil`]
    pub fn to_be_nil(&self) -> ExpectlyResult<MatcherResult> {
        verify(any::to_be_nil(&self.ctx, &self.actual)?)
    }

    /// See [`any::to_deep_equal`]
    pub fn to_deep_equal(&self, expected: impl Into<Value>) -> ExpectlyResult<MatcherResult> {
        verify(any::to_deep_equal(&self.ctx, &self.actual, &expected.into())?)
    }

    /// See [`any::to_match_partial`]
    pub fn to_match_partial(&self, shape: impl Into<Shape>) -> ExpectlyResult<MatcherResult> {
        verify(any::to_match_partial(&self.ctx, &self.actual, &shape.into())?)
    }
}

// =============================================================================
// STRINGS
// =============================================================================

impl Expect<&str> {
    /// See [`string::to_start_with`]
    pub fn to_start_with(&self, prefix: &str) -> ExpectlyResult<MatcherResult> {
        verify(string::to_start_with(&self.ctx, self.actual, prefix)?)
    }

    /// See [`string::to_end_with`]
    pub fn to_end_with(&self, suffix: &str) -> ExpectlyResult<MatcherResult> {
        verify(string::to_end_with(&self.ctx, self.actual, suffix)?)
    }

    /// See [`string::to_contain_ignoring_case`]
    pub fn to_contain_ignoring_case(&self, needle: &str) -> ExpectlyResult<MatcherResult> {
        verify(string::to_contain_ignoring_case(&self.ctx, self.actual, needle)?)
    }

    /// See [`string::to_be_blank`]
    pub fn to_be_blank(&self) -> ExpectlyResult<MatcherResult> {
        verify(string::to_be_blank(&self.ctx, self.actual)?)
    }

    /// See [`string::to_match_pattern`]
    pub fn to_match_pattern(&self, pattern: &str) -> ExpectlyResult<MatcherResult> {
        verify(string::to_match_pattern(&self.ctx, self.actual, pattern)?)
    }

    /// See [`string::to_have_length_between`]
    pub fn to_have_length_between(&self, min: usize, max: usize) -> ExpectlyResult<MatcherResult> {
        verify(string::to_have_length_between(&self.ctx, self.actual, min, max)?)
    }
}

// =============================================================================
// NUMBERS
// =============================================================================

impl Expect<&[f64]> {
    /// See [`numeric::to_have_sum`]
    pub fn to_have_sum(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_sum(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_average`]
    pub fn to_have_average(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_average(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_median`]
    pub fn to_have_median(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_median(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_min`]
    pub fn to_have_min(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_min(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_max`]
    pub fn to_have_max(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_max(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_range`]
    pub fn to_have_range(&self, expected: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_range(&self.ctx, self.actual, expected)?)
    }

    /// See [`numeric::to_have_all_within`]
    pub fn to_have_all_within(&self, min: f64, max: f64) -> ExpectlyResult<MatcherResult> {
        verify(numeric::to_have_all_within(&self.ctx, self.actual, min, max)?)
    }
}

// =============================================================================
// SEQUENCES
// =============================================================================

impl Expect<&[Value]> {
    /// See [`sequence::to_be_sorted_ascending`]
    pub fn to_be_sorted_ascending(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_sorted_ascending(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_be_sorted_descending`]
    pub fn to_be_sorted_descending(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_sorted_descending(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_be_strictly_ascending`]
    pub fn to_be_strictly_ascending(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_strictly_ascending(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_be_strictly_descending`]
    pub fn to_be_strictly_descending(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_strictly_descending(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_be_monotonic`]
    pub fn to_be_monotonic(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_monotonic(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_have_ascending_order`]
    pub fn to_have_ascending_order(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_have_ascending_order(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_have_descending_order`]
    pub fn to_have_descending_order(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_have_descending_order(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_have_unique_values`]
    pub fn to_have_unique_values(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_have_unique_values(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_have_unique_objects`]
    pub fn to_have_unique_objects(&self) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_have_unique_objects(&self.ctx, self.actual)?)
    }

    /// See [`sequence::to_be_sorted_by`]
    pub fn to_be_sorted_by(&self, property: &str, direction: Direction, strict: bool) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_be_sorted_by(&self.ctx, self.actual, property, direction, strict)?)
    }

    /// See [`sequence::to_contain_object_matching`]
    pub fn to_contain_object_matching(&self, shape: impl Into<Shape>) -> ExpectlyResult<MatcherResult> {
        verify(sequence::to_contain_object_matching(&self.ctx, self.actual, &shape.into())?)
    }
}

// =============================================================================
// DATES
// =============================================================================

impl Expect<Date> {
    /// See [`date::to_be_same_day`]
    pub fn to_be_same_day(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_same_day(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_same_month`]
    pub fn to_be_same_month(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_same_month(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_same_year`]
    pub fn to_be_same_year(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_same_year(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_same_weekday`]
    pub fn to_be_same_weekday(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_same_weekday(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_same_quarter`]
    pub fn to_be_same_quarter(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_same_quarter(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_before`]
    pub fn to_be_before(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_before(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_after`]
    pub fn to_be_after(&self, other: &Date) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_after(&self.ctx, &self.actual, other)?)
    }

    /// See [`date::to_be_close_to_date`]
    pub fn to_be_close_to_date(&self, expected: &Date, window: DeviationWindow) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_close_to_date(&self.ctx, &self.actual, expected, window)?)
    }

    /// See [`date::to_be_weekday`]
    pub fn to_be_weekday(&self) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_weekday(&self.ctx, &self.actual)?)
    }

    /// See [`date::to_be_weekend`]
    pub fn to_be_weekend(&self) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_weekend(&self.ctx, &self.actual)?)
    }

    /// See [`date::to_be_in_month`]
    pub fn to_be_in_month(&self, month: u32) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_in_month(&self.ctx, &self.actual, month)?)
    }

    /// See [`date::to_be_day_of_week`]
    pub fn to_be_day_of_week(&self, day: u32) -> ExpectlyResult<MatcherResult> {
        verify(date::to_be_day_of_week(&self.ctx, &self.actual, day)?)
    }

    /// See [`date::to_have_timezone_offset`]
    pub fn to_have_timezone_offset(&self, offset: &str) -> ExpectlyResult<MatcherResult> {
        verify(date::to_have_timezone_offset(&self.ctx, &self.actual, offset)?)
    }
}

impl Expect<&[Date]> {
    /// See [`date::to_have_consecutive_dates`]
    pub fn to_have_consecutive_dates(&self, unit: TimeUnit) -> ExpectlyResult<MatcherResult> {
        verify(date::to_have_consecutive_dates(&self.ctx, self.actual, unit)?)
    }

    /// See [`date::to_span_at_most`]
    pub fn to_span_at_most(&self, span: CalendarSpan) -> ExpectlyResult<MatcherResult> {
        verify(date::to_span_at_most(&self.ctx, self.actual, span)?)
    }

    /// See [`date::to_have_max_gap`]
    pub fn to_have_max_gap(&self, span: CalendarSpan) -> ExpectlyResult<MatcherResult> {
        verify(date::to_have_max_gap(&self.ctx, self.actual, span)?)
    }
}

// =============================================================================
// ELEMENTS
// =============================================================================

#[cfg(feature = "dom")]
impl<E: ElementHandle + ?Sized> Expect<&E> {
    /// See [`dom::to_have_attribute_value`]
    pub async fn to_have_attribute_value(
        &self,
        name: &str,
        expected: &str,
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_attribute_value(&self.ctx, self.actual, name, expected, options).await?)
    }

    /// See [`dom::to_have_attribute_containing`]
    pub async fn to_have_attribute_containing(
        &self,
        name: &str,
        needle: &str,
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_attribute_containing(&self.ctx, self.actual, name, needle, options).await?)
    }

    /// See [`dom::to_have_attributes`]
    pub async fn to_have_attributes(
        &self,
        expected: &[(&str, &str)],
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_attributes(&self.ctx, self.actual, expected, options).await?)
    }

    /// See [`dom::to_have_class`]
    pub async fn to_have_class(&self, class_name: &str, options: ElementOptions) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_class(&self.ctx, self.actual, class_name, options).await?)
    }

    /// See [`dom::to_have_data_attribute`]
    pub async fn to_have_data_attribute(
        &self,
        key: &str,
        expected: Option<&str>,
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_data_attribute(&self.ctx, self.actual, key, expected, options).await?)
    }

    /// See [`dom::to_have_trimmed_text`]
    pub async fn to_have_trimmed_text(&self, expected: &str, options: ElementOptions) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_trimmed_text(&self.ctx, self.actual, expected, options).await?)
    }

    /// See [`dom::to_have_text_matching`]
    pub async fn to_have_text_matching(&self, pattern: &str, options: ElementOptions) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_text_matching(&self.ctx, self.actual, pattern, options).await?)
    }

    /// See [`dom::to_have_stable_text`]
    pub async fn to_have_stable_text(&self, options: StabilityOptions) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_stable_text(&self.ctx, self.actual, options).await?)
    }

    /// See [`dom::to_have_size`]
    pub async fn to_have_size(&self, width: f64, height: f64, options: ElementOptions) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_size(&self.ctx, self.actual, width, height, options).await?)
    }

    /// See [`dom::to_have_min_size`]
    pub async fn to_have_min_size(
        &self,
        min_width: f64,
        min_height: f64,
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_min_size(&self.ctx, self.actual, min_width, min_height, options).await?)
    }

    /// See [`dom::to_have_inner_html_containing`]
    pub async fn to_have_inner_html_containing(
        &self,
        needle: &str,
        options: ElementOptions,
    ) -> ExpectlyResult<MatcherResult> {
        verify(dom::to_have_inner_html_containing(&self.ctx, self.actual, needle, options).await?)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Blocking retry of a sample until it yields an expected value
pub struct Poll<F> {
    sample: F,
    schedule: PollSchedule,
    is_not: bool,
}

/// Start a polling assertion with the default schedule
#[must_use]
pub fn poll<T, F>(sample: F) -> Poll<F>
where
    F: FnMut() -> T,
{
    Poll {
        sample,
        schedule: ExpectConfig::default().poll_schedule(None),
        is_not: false,
    }
}

impl<F> Poll<F> {
    /// Negate the assertion
    #[must_use]
    pub fn not(mut self) -> Self {
        self.is_not = !self.is_not;
        self
    }

    /// Set the overall budget
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.schedule.timeout = timeout;
        self
    }

    /// Set the interval schedule; the last interval repeats
    #[must_use]
    pub fn with_intervals(mut self, intervals: Vec<Duration>) -> Self {
        self.schedule = self.schedule.with_intervals(intervals);
        self
    }

    /// Keep probing until the value equals `expected` (or stops equalling it when negated)
    pub fn to_be<T>(mut self, expected: T) -> ExpectlyResult<()>
    where
        F: FnMut() -> T,
        T: PartialEq + Debug,
    {
        let is_not = self.is_not;
        let outcome = poll_blocking(&self.schedule, || Ok((self.sample)()), |value| (*value == expected) != is_not);
        if outcome.satisfied {
            return Ok(());
        }
        let negation = if is_not { "not " } else { "" };
        Err(ExpectlyError::AssertionError {
            message: format!(
                "poll: expected value {negation}to be {expected:?}, last value {:?} after {} attempt(s) in {}ms",
                outcome.value,
                outcome.attempts,
                outcome.elapsed.as_millis()
            ),
        })
    }
}

impl<F> Debug for Poll<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poll")
            .field("schedule", &self.schedule)
            .field("is_not", &self.is_not)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::value::values_from_json;
    use serde_json::json;
    use std::cell::Cell;

    mod facade {
        use super::*;

        #[test]
        fn test_pass_returns_result() {
            let result = expect("hello").to_start_with("he").unwrap();
            assert!(result.pass());
        }

        #[test]
        fn test_failure_is_assertion_error() {
            let err = expect("hello").to_end_with("x").unwrap_err();
            let ExpectlyError::AssertionError { message } = err else {
                panic!("expected assertion error");
            };
            assert!(message.starts_with("to_end_with: expected \"hello\" to end with \"x\""));
        }

        #[test]
        fn test_not_flips() {
            assert!(expect("hello").not().to_end_with("x").is_ok());
            assert!(expect("hello").not().not().to_end_with("o").is_ok());
            let err = expect("hello").not().to_end_with("o").unwrap_err();
            assert!(err.to_string().contains("not to end with"));
        }

        #[test]
        fn test_precondition_not_folded() {
            let err = expect("x").not().to_match_pattern("[").unwrap_err();
            assert!(matches!(err, ExpectlyError::InvalidArgument { .. }));
        }

        #[test]
        fn test_custom_matcher() {
            let result = expect(4).to_satisfy(|ctx, n| {
                let outcome = crate::matcher::Outcome::new(n % 2 == 0, n, "be even");
                Ok(MatcherResult::from_outcome("to_be_even", &outcome, ctx))
            });
            assert!(result.is_ok());
        }

        #[test]
        fn test_typed_groups() {
            let scores = [1.0, 2.0, 3.0];
            expect(&scores[..]).to_have_average(2.0).unwrap();
            let values = values_from_json(json!([3, 2, 1]));
            expect(&values[..]).to_be_strictly_descending().unwrap();
            expect(Value::from(json!({"a": 1, "b": 2}))).to_match_partial(json!({"a": 1})).unwrap();
            expect_date("2024-01-06").unwrap().to_be_weekend().unwrap();
            assert!(expect_date("not a date").is_err());
        }

        #[test]
        fn test_config_flows_through() {
            let config = ExpectConfig::default().with_epsilon(0.5);
            let values = [1.0, 2.0];
            expect(&values[..]).with_config(config).to_have_sum(3.4).unwrap();
        }
    }

    mod polling {
        use super::*;

        #[test]
        fn test_poll_until_value() {
            let counter = Cell::new(0);
            poll(|| {
                counter.set(counter.get() + 1);
                counter.get()
            })
            .with_intervals(vec![Duration::from_millis(1)])
            .to_be(3)
            .unwrap();
            assert_eq!(counter.get(), 3);
        }

        #[test]
        fn test_poll_timeout_message() {
            let err = poll(|| "pending")
                .with_timeout(Duration::from_millis(20))
                .with_intervals(vec![Duration::from_millis(5)])
                .to_be("done")
                .unwrap_err();
            assert!(err.to_string().contains("last value Some(\"pending\")"));
        }

        #[test]
        fn test_poll_negated() {
            poll(|| 1)
                .not()
                .with_timeout(Duration::from_millis(10))
                .to_be(2)
                .unwrap();
        }
    }
}
