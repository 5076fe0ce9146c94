//! String matchers.

use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::value::quote;
use regex::Regex;

/// Starts with `prefix`
pub fn to_start_with(ctx: &MatcherContext, actual: &str, prefix: &str) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(
        actual.starts_with(prefix),
        quote(actual),
        format!("start with {}", quote(prefix)),
    );
    Ok(MatcherResult::from_outcome("to_start_with", &outcome, ctx))
}

/// Ends with `suffix`
pub fn to_end_with(ctx: &MatcherContext, actual: &str, suffix: &str) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(
        actual.ends_with(suffix),
        quote(actual),
        format!("end with {}", quote(suffix)),
    );
    Ok(MatcherResult::from_outcome("to_end_with", &outcome, ctx))
}

/// Contains `needle`, compared case-insensitively
pub fn to_contain_ignoring_case(ctx: &MatcherContext, actual: &str, needle: &str) -> ExpectlyResult<MatcherResult> {
    let pass = actual.to_lowercase().contains(&needle.to_lowercase());
    let outcome = Outcome::new(pass, quote(actual), format!("contain {} (ignoring case)", quote(needle)));
    Ok(MatcherResult::from_outcome("to_contain_ignoring_case", &outcome, ctx))
}

/// Empty or whitespace only
pub fn to_be_blank(ctx: &MatcherContext, actual: &str) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(actual.trim().is_empty(), quote(actual), "be blank");
    Ok(MatcherResult::from_outcome("to_be_blank", &outcome, ctx))
}

/// Matches the regular expression `pattern` anywhere in the string
pub fn to_match_pattern(ctx: &MatcherContext, actual: &str, pattern: &str) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_match_pattern";
    let regex = Regex::new(pattern)
        .map_err(|e| ExpectlyError::invalid_argument(NAME, format!("invalid pattern /{pattern}/: {e}")))?;
    let outcome = Outcome::new(regex.is_match(actual), quote(actual), format!("match /{pattern}/"));
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Character count within `min..=max`
pub fn to_have_length_between(
    ctx: &MatcherContext,
    actual: &str,
    min: usize,
    max: usize,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_length_between";
    if min > max {
        return Err(ExpectlyError::invalid_argument(
            NAME,
            format!("min ({min}) must not exceed max ({max})"),
        ));
    }
    let length = actual.chars().count();
    let outcome = Outcome::new(
        (min..=max).contains(&length),
        quote(actual),
        format!("have length between {min} and {max}"),
    )
    .with_failure_detail(format!("length is {length}"))
    .with_pass_detail(format!("length is {length}"));
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ctx() -> MatcherContext {
        MatcherContext::new()
    }

    mod affixes {
        use super::*;

        #[test]
        fn test_start_and_end() {
            assert!(to_start_with(&ctx(), "https://x", "https://").unwrap().pass());
            assert!(!to_start_with(&ctx(), "http://x", "https://").unwrap().pass());
            assert!(to_end_with(&ctx(), "report.pdf", ".pdf").unwrap().pass());
        }

        #[test]
        fn test_negated_message() {
            let result = to_start_with(&MatcherContext::negated(), "abc", "a").unwrap();
            assert!(!result.succeeded());
            assert_eq!(
                result.message(),
                "to_start_with: expected \"abc\" not to start with \"a\", but it does"
            );
        }

        #[test]
        fn test_case_insensitive_contains() {
            assert!(to_contain_ignoring_case(&ctx(), "Hello World", "WORLD").unwrap().pass());
            assert!(!to_contain_ignoring_case(&ctx(), "Hello", "bye").unwrap().pass());
        }
    }

    mod content {
        use super::*;

        #[test]
        fn test_blank() {
            assert!(to_be_blank(&ctx(), "").unwrap().pass());
            assert!(to_be_blank(&ctx(), " \t\n").unwrap().pass());
            assert!(!to_be_blank(&ctx(), " x ").unwrap().pass());
        }

        #[test]
        fn test_pattern() {
            assert!(to_match_pattern(&ctx(), "order-1234", r"^order-\d+$").unwrap().pass());
            assert!(!to_match_pattern(&ctx(), "order-x", r"^order-\d+$").unwrap().pass());
        }

        #[test]
        fn test_invalid_pattern_is_error() {
            let err = to_match_pattern(&ctx(), "x", "(").unwrap_err();
            assert!(matches!(err, ExpectlyError::InvalidArgument { matcher: "to_match_pattern", .. }));
        }

        #[test]
        fn test_length_counts_chars() {
            assert!(to_have_length_between(&ctx(), "héllo", 5, 5).unwrap().pass());
            let result = to_have_length_between(&ctx(), "hi", 3, 10).unwrap();
            assert!(result.message().ends_with("length is 2"));
        }

        #[test]
        fn test_length_bounds_checked() {
            assert!(to_have_length_between(&ctx(), "x", 4, 2).is_err());
        }
    }
}
