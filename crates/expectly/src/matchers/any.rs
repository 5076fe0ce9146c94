//! Matchers for any dynamic value.

use crate::canonical::{deep_equal, values_equal};
use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::shape::{extract_matching_shape, shape_matches, shape_mismatches, Shape};
use crate::value::Value;

/// Value equals one of `options` (structural for containers, value equality otherwise)
pub fn to_be_one_of(ctx: &MatcherContext, actual: &Value, options: &[Value]) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_be_one_of";
    if options.is_empty() {
        return Err(ExpectlyError::EmptyInput {
            matcher: NAME,
            what: "list of options",
        });
    }
    let pass = options.iter().any(|option| values_equal(actual, option));
    let outcome = Outcome::new(pass, actual, format!("be one of {}", ctx.excerpt(options)));
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Value is `null` or `undefined`
pub fn to_be_nil(ctx: &MatcherContext, actual: &Value) -> ExpectlyResult<MatcherResult> {
    let outcome = Outcome::new(actual.is_nullish(), actual, "be null or undefined");
    Ok(MatcherResult::from_outcome("to_be_nil", &outcome, ctx))
}

/// Full structural equality
pub fn to_deep_equal(ctx: &MatcherContext, actual: &Value, expected: &Value) -> ExpectlyResult<MatcherResult> {
    let pass = deep_equal(actual, expected);
    let mut outcome = Outcome::new(pass, actual, format!("deeply equal {expected}"));
    if !pass {
        let shape = Shape::from(expected.clone());
        let diffs = shape_mismatches(actual, &shape);
        if !diffs.is_empty() {
            let rendered: Vec<String> = diffs.iter().map(ToString::to_string).collect();
            outcome = outcome.with_failure_detail(ctx.excerpt(&rendered));
        }
    }
    Ok(MatcherResult::from_outcome("to_deep_equal", &outcome, ctx))
}

/// Fields and elements named by `shape` match; everything else is ignored
pub fn to_match_partial(ctx: &MatcherContext, actual: &Value, shape: &Shape) -> ExpectlyResult<MatcherResult> {
    let projected = extract_matching_shape(actual, shape);
    let pass = shape_matches(&projected, shape);
    let mut outcome = Outcome::new(pass, &projected, format!("match {shape}"));
    if !pass {
        let rendered: Vec<String> = shape_mismatches(&projected, shape)
            .iter()
            .map(ToString::to_string)
            .collect();
        outcome = outcome.with_failure_detail(ctx.excerpt(&rendered));
    }
    Ok(MatcherResult::from_outcome("to_match_partial", &outcome, ctx))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> MatcherContext {
        MatcherContext::new()
    }

    #[test]
    fn test_one_of() {
        let options = vec![Value::from("draft"), Value::from("published")];
        assert!(to_be_one_of(&ctx(), &Value::from("draft"), &options).unwrap().pass());
        let miss = to_be_one_of(&ctx(), &Value::from("deleted"), &options).unwrap();
        assert!(!miss.pass());
        assert!(miss.message().contains("[\"draft\", \"published\"]"));
    }

    #[test]
    fn test_one_of_structural() {
        let options = vec![Value::from(json!({"a": 1}))];
        assert!(to_be_one_of(&ctx(), &Value::from(json!({"a": 1})), &options).unwrap().pass());
    }

    #[test]
    fn test_one_of_empty_is_error() {
        let err = to_be_one_of(&ctx(), &Value::Null, &[]).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_nil() {
        assert!(to_be_nil(&ctx(), &Value::Null).unwrap().pass());
        assert!(to_be_nil(&ctx(), &Value::Undefined).unwrap().pass());
        assert!(!to_be_nil(&ctx(), &Value::from(0)).unwrap().pass());
    }

    #[test]
    fn test_deep_equal_reports_path() {
        let actual = Value::from(json!({"user": {"name": "Bob"}}));
        let expected = Value::from(json!({"user": {"name": "Alice"}}));
        let result = to_deep_equal(&ctx(), &actual, &expected).unwrap();
        assert!(!result.pass());
        assert!(result.message().contains("$.user.name"));
    }

    #[test]
    fn test_deep_equal_key_order_irrelevant() {
        let a = Value::from(json!({"x": 1, "y": [1, 2]}));
        let b = Value::from(json!({"y": [1, 2], "x": 1}));
        assert!(to_deep_equal(&ctx(), &a, &b).unwrap().pass());
    }

    #[test]
    fn test_partial_ignores_extra_fields() {
        let actual = Value::from(json!({"id": 1, "name": "Alice", "extra": "x"}));
        let result = to_match_partial(&ctx(), &actual, &Shape::from(json!({"name": "Alice"}))).unwrap();
        assert!(result.pass());
        assert!(!result.message().contains("extra"));
    }

    #[test]
    fn test_partial_failure_names_missing_key() {
        let actual = Value::from(json!({"id": 1}));
        let result = to_match_partial(&ctx(), &actual, &Shape::from(json!({"name": "Alice"}))).unwrap();
        assert!(!result.pass());
        assert!(result.message().contains("$.name: expected \"Alice\", received undefined"));
    }

    #[test]
    fn test_partial_negated() {
        let actual = Value::from(json!({"role": "admin"}));
        let ctx = MatcherContext::negated();
        let result = to_match_partial(&ctx, &actual, &Shape::from(json!({"role": "admin"}))).unwrap();
        assert!(!result.succeeded());
        assert!(result.message().contains("not to match"));
    }
}
