//! Numeric-sequence matchers.
//!
//! Aggregates are compared with the configured epsilon. Empty input keeps
//! the conventions of [`crate::stats`]: sum, average and median are 0,
//! while min, max and range are NaN and therefore never match.

use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::stats;
use crate::value::format_number;

fn numbers(values: &[f64]) -> Vec<String> {
    values.iter().map(|n| format_number(*n)).collect()
}

fn aggregate(
    ctx: &MatcherContext,
    name: &'static str,
    label: &str,
    actual: &[f64],
    computed: f64,
    expected: f64,
) -> ExpectlyResult<MatcherResult> {
    let pass = stats::approx_eq(computed, expected, ctx.epsilon());
    let received = ctx.excerpt(&numbers(actual));
    let detail = format!("{label} is {}", format_number(computed));
    let outcome = Outcome::new(pass, received, format!("have {label} {}", format_number(expected)))
        .with_failure_detail(&detail)
        .with_pass_detail(&detail);
    Ok(MatcherResult::from_outcome(name, &outcome, ctx))
}

/// Sum equals `expected` within epsilon
pub fn to_have_sum(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_sum", "sum", actual, stats::sum(actual), expected)
}

/// Mean equals `expected` within epsilon
pub fn to_have_average(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_average", "average", actual, stats::average(actual), expected)
}

/// Median equals `expected` within epsilon
pub fn to_have_median(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_median", "median", actual, stats::median(actual), expected)
}

/// Minimum equals `expected` within epsilon
pub fn to_have_min(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_min", "min", actual, stats::min(actual), expected)
}

/// Maximum equals `expected` within epsilon
pub fn to_have_max(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_max", "max", actual, stats::max(actual), expected)
}

/// `max - min` equals `expected` within epsilon
pub fn to_have_range(ctx: &MatcherContext, actual: &[f64], expected: f64) -> ExpectlyResult<MatcherResult> {
    aggregate(ctx, "to_have_range", "range", actual, stats::range(actual), expected)
}

/// Every value within `min..=max`
pub fn to_have_all_within(ctx: &MatcherContext, actual: &[f64], min: f64, max: f64) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_all_within";
    if min.is_nan() || max.is_nan() || min > max {
        return Err(ExpectlyError::invalid_argument(
            NAME,
            format!("invalid bounds {}..={}", format_number(min), format_number(max)),
        ));
    }
    let outside = actual
        .iter()
        .enumerate()
        .find(|(_, v)| !(min..=max).contains(*v));
    let mut outcome = Outcome::new(
        outside.is_none(),
        ctx.excerpt(&numbers(actual)),
        format!("have all values within {}..={}", format_number(min), format_number(max)),
    );
    if let Some((index, value)) = outside {
        outcome = outcome.with_failure_detail(format!("index {index} is {}", format_number(*value)));
    }
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ExpectConfig;

    fn ctx() -> MatcherContext {
        MatcherContext::new()
    }

    mod aggregates {
        use super::*;

        #[test]
        fn test_sum_tolerates_rounding() {
            assert!(to_have_sum(&ctx(), &[0.1, 0.2], 0.3).unwrap().pass());
        }

        #[test]
        fn test_average_and_median() {
            assert!(to_have_average(&ctx(), &[2.0, 4.0, 9.0], 5.0).unwrap().pass());
            assert!(to_have_median(&ctx(), &[1.0, 2.0, 3.0, 4.0], 2.5).unwrap().pass());
            assert!(to_have_median(&ctx(), &[], 0.0).unwrap().pass());
        }

        #[test]
        fn test_min_max_range() {
            let values = [4.0, -2.0, 7.5];
            assert!(to_have_min(&ctx(), &values, -2.0).unwrap().pass());
            assert!(to_have_max(&ctx(), &values, 7.5).unwrap().pass());
            assert!(to_have_range(&ctx(), &values, 9.5).unwrap().pass());
        }

        #[test]
        fn test_empty_min_fails_with_nan() {
            let result = to_have_min(&ctx(), &[], 0.0).unwrap();
            assert!(!result.pass());
            assert!(result.message().contains("min is NaN"));
        }

        #[test]
        fn test_failure_message_shows_value() {
            let result = to_have_sum(&ctx(), &[1.0, 2.0], 4.0).unwrap();
            assert_eq!(
                result.message(),
                "to_have_sum: expected [1, 2] to have sum 4, but it does not: sum is 3"
            );
        }

        #[test]
        fn test_configured_epsilon() {
            let loose = MatcherContext::new().with_config(ExpectConfig::default().with_epsilon(0.01));
            assert!(to_have_average(&loose, &[1.0, 1.005], 1.0).unwrap().pass());
            assert!(!to_have_average(&ctx(), &[1.0, 1.005], 1.0).unwrap().pass());
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn test_all_within() {
            assert!(to_have_all_within(&ctx(), &[1.0, 5.0, 10.0], 1.0, 10.0).unwrap().pass());
            let result = to_have_all_within(&ctx(), &[1.0, 11.0], 1.0, 10.0).unwrap();
            assert!(!result.pass());
            assert!(result.message().ends_with("index 1 is 11"));
        }

        #[test]
        fn test_empty_is_vacuously_within() {
            assert!(to_have_all_within(&ctx(), &[], 0.0, 1.0).unwrap().pass());
        }

        #[test]
        fn test_bad_bounds() {
            assert!(to_have_all_within(&ctx(), &[1.0], 5.0, 1.0).is_err());
            assert!(to_have_all_within(&ctx(), &[1.0], f64::NAN, 1.0).is_err());
        }
    }
}
