//! Ordering and uniqueness matchers over value sequences.
//!
//! Mixed element kinds (numbers next to strings, say) are an argument error,
//! not a failed ordering. Empty and single-element sequences are ordered.

use crate::canonical::CanonicalCache;
use crate::duplicates::{find_duplicate_objects_with_cache, find_duplicate_primitives};
use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::ordering::{self, check_sorted_by, sorted_expected, Direction};
use crate::result::ExpectlyResult;
use crate::shape::{matches_partial, Shape};
use crate::value::{quote, Value};

fn order_check(
    ctx: &MatcherContext,
    name: &'static str,
    actual: &[Value],
    direction: Direction,
    strict: bool,
) -> ExpectlyResult<MatcherResult> {
    let violation = match direction {
        Direction::Ascending => ordering::first_ascending_violation(actual, strict)?,
        Direction::Descending => ordering::first_descending_violation(actual, strict)?,
    };
    let expectation = if strict {
        format!("be strictly {direction}")
    } else {
        format!("be sorted {direction}")
    };
    let mut outcome = Outcome::new(violation.is_none(), ctx.excerpt(actual), expectation);
    if let Some(i) = violation {
        outcome = outcome.with_failure_detail(format!(
            "index {i} ({}) and index {} ({}) break the order",
            actual[i],
            i + 1,
            actual[i + 1]
        ));
    }
    Ok(MatcherResult::from_outcome(name, &outcome, ctx))
}

/// Non-decreasing
pub fn to_be_sorted_ascending(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    order_check(ctx, "to_be_sorted_ascending", actual, Direction::Ascending, false)
}

/// Non-increasing
pub fn to_be_sorted_descending(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    order_check(ctx, "to_be_sorted_descending", actual, Direction::Descending, false)
}

/// Strictly increasing, no equal neighbours
pub fn to_be_strictly_ascending(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    order_check(ctx, "to_be_strictly_ascending", actual, Direction::Ascending, true)
}

/// Strictly decreasing, no equal neighbours
pub fn to_be_strictly_descending(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    order_check(ctx, "to_be_strictly_descending", actual, Direction::Descending, true)
}

/// Entirely non-decreasing or entirely non-increasing
pub fn to_be_monotonic(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    let pass = ordering::is_monotonic(actual)?;
    let outcome = Outcome::new(pass, ctx.excerpt(actual), "be monotonic");
    Ok(MatcherResult::from_outcome("to_be_monotonic", &outcome, ctx))
}

fn whole_order(
    ctx: &MatcherContext,
    name: &'static str,
    actual: &[Value],
    direction: Direction,
) -> ExpectlyResult<MatcherResult> {
    let expected = sorted_expected(actual, direction)?;
    let pass = actual.iter().zip(expected.iter()).all(|(a, e)| a == e);
    let outcome = Outcome::new(pass, ctx.excerpt(actual), format!("be in {direction} order"))
        .with_failure_detail(format!("expected order {}", ctx.excerpt(&expected)));
    Ok(MatcherResult::from_outcome(name, &outcome, ctx))
}

/// Equals its own ascending sort; failures show the whole expected order
pub fn to_have_ascending_order(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    whole_order(ctx, "to_have_ascending_order", actual, Direction::Ascending)
}

/// Equals its own descending sort; failures show the whole expected order
pub fn to_have_descending_order(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    whole_order(ctx, "to_have_descending_order", actual, Direction::Descending)
}

/// No scalar repeats; containers count as repeats only when the same reference appears twice
pub fn to_have_unique_values(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    let duplicates = find_duplicate_primitives(actual);
    let outcome = Outcome::new(duplicates.is_empty(), ctx.excerpt(actual), "have unique values")
        .with_failure_detail(format!("duplicates {}", ctx.excerpt(&duplicates)));
    Ok(MatcherResult::from_outcome("to_have_unique_values", &outcome, ctx))
}

/// No two elements are deeply equal
pub fn to_have_unique_objects(ctx: &MatcherContext, actual: &[Value]) -> ExpectlyResult<MatcherResult> {
    let mut cache = CanonicalCache::new();
    to_have_unique_objects_with_cache(ctx, actual, &mut cache)
}

/// [`to_have_unique_objects`] reusing a caller-owned canonical key cache
pub fn to_have_unique_objects_with_cache(
    ctx: &MatcherContext,
    actual: &[Value],
    cache: &mut CanonicalCache,
) -> ExpectlyResult<MatcherResult> {
    let duplicates = find_duplicate_objects_with_cache(actual, cache);
    let outcome = Outcome::new(duplicates.is_empty(), ctx.excerpt(actual), "have unique objects")
        .with_failure_detail(format!("duplicates {}", ctx.excerpt(&duplicates)));
    Ok(MatcherResult::from_outcome("to_have_unique_objects", &outcome, ctx))
}

/// Records ordered by `property`
pub fn to_be_sorted_by(
    ctx: &MatcherContext,
    actual: &[Value],
    property: &str,
    direction: Direction,
    strict: bool,
) -> ExpectlyResult<MatcherResult> {
    let violation = check_sorted_by(actual, property, direction, strict)?;
    let order = if strict { "strictly " } else { "" };
    let mut outcome = Outcome::new(
        violation.is_none(),
        ctx.excerpt(actual),
        format!("be sorted {order}{direction} by {}", quote(property)),
    );
    if let Some(violation) = violation {
        outcome = outcome.with_failure_detail(violation);
    }
    Ok(MatcherResult::from_outcome("to_be_sorted_by", &outcome, ctx))
}

/// At least one element matches `shape` partially
pub fn to_contain_object_matching(
    ctx: &MatcherContext,
    actual: &[Value],
    shape: &Shape,
) -> ExpectlyResult<MatcherResult> {
    let found = actual.iter().position(|item| matches_partial(item, shape));
    let mut outcome = Outcome::new(
        found.is_some(),
        ctx.excerpt(actual),
        format!("contain an object matching {shape}"),
    );
    if let Some(index) = found {
        outcome = outcome.with_pass_detail(format!("index {index} matches"));
    }
    Ok(MatcherResult::from_outcome("to_contain_object_matching", &outcome, ctx))
}
