//! Element-resolving matchers.
//!
//! Each matcher polls the element until the assertion as written would
//! succeed (`pass != is_not`) or the wait budget runs out, then judges the
//! last observation. A negated assertion therefore stops as soon as the
//! condition is false. When the element could not be read, the failure
//! message carries the collaborator error.

use crate::config::{ElementOptions, StabilityOptions};
use crate::element::{BoundingBox, ElementHandle};
use crate::matcher::{MatcherContext, MatcherResult, Outcome};
use crate::poll::{attempt_budget, bounded_attempt, poll_async};
use crate::result::{ExpectlyError, ExpectlyResult};
use crate::stats::approx_eq;
use crate::value::{format_number, quote};
use futures::future::try_join_all;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Poll `read` until `holds` matches the assertion direction; last value or the error to surface
async fn observe<T, F, Fut, H>(
    ctx: &MatcherContext,
    options: ElementOptions,
    read: F,
    holds: H,
) -> Result<T, ExpectlyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ExpectlyResult<T>>,
    H: Fn(&T) -> bool,
{
    let schedule = ctx.config.poll_schedule(options.timeout);
    let is_not = ctx.is_not;
    let outcome = poll_async(&schedule, read, |value| holds(value) != is_not).await;
    match (outcome.last_error, outcome.value) {
        (Some(error), _) => Err(error),
        (None, Some(value)) => Ok(value),
        (None, None) => Err(ExpectlyError::Timeout {
            ms: schedule.timeout.as_millis() as u64,
        }),
    }
}

fn describe_attribute(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("element with {name}={}", quote(v)),
        None => format!("element without {name}"),
    }
}

/// Attribute `name` equals `expected`
pub async fn to_have_attribute_value<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    name: &str,
    expected: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_attribute_value";
    let holds = |value: &Option<String>| value.as_deref() == Some(expected);
    let value = match observe(ctx, options, || element.get_attribute(name), holds).await {
        Ok(value) => value,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&value),
        describe_attribute(name, value.as_deref()),
        format!("have {name}={}", quote(expected)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Attribute `name` is present and contains `needle`
pub async fn to_have_attribute_containing<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    name: &str,
    needle: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_attribute_containing";
    let holds = |value: &Option<String>| value.as_deref().is_some_and(|v| v.contains(needle));
    let value = match observe(ctx, options, || element.get_attribute(name), holds).await {
        Ok(value) => value,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&value),
        describe_attribute(name, value.as_deref()),
        format!("have {name} containing {}", quote(needle)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Every `(name, value)` pair matches exactly
pub async fn to_have_attributes<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    expected: &[(&str, &str)],
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_attributes";
    if expected.is_empty() {
        return Err(ExpectlyError::EmptyInput {
            matcher: NAME,
            what: "set of attributes",
        });
    }
    let read_all = move || try_join_all(expected.iter().map(move |(name, _)| element.get_attribute(name)));
    let holds = |observed: &Vec<Option<String>>| {
        expected
            .iter()
            .zip(observed.iter())
            .all(|((_, want), got)| got.as_deref() == Some(*want))
    };
    let observed = match observe(ctx, options, read_all, holds).await {
        Ok(observed) => observed,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let received: Vec<String> = expected
        .iter()
        .zip(observed.iter())
        .map(|((name, _), got)| match got {
            Some(v) => format!("{name}={}", quote(v)),
            None => format!("{name} absent"),
        })
        .collect();
    let wanted: Vec<String> = expected
        .iter()
        .map(|(name, want)| format!("{name}={}", quote(want)))
        .collect();
    let outcome = Outcome::new(
        holds(&observed),
        format!("element with {}", ctx.excerpt(&received)),
        format!("have attributes {}", ctx.excerpt(&wanted)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// `class` attribute lists `class_name` as one of its tokens
pub async fn to_have_class<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    class_name: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_class";
    if class_name.trim().is_empty() || class_name.contains(char::is_whitespace) {
        return Err(ExpectlyError::invalid_argument(
            NAME,
            format!("class name {} must be a single non-empty token", quote(class_name)),
        ));
    }
    let holds = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    };
    let value = match observe(ctx, options, || element.get_attribute("class"), holds).await {
        Ok(value) => value,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&value),
        describe_attribute("class", value.as_deref()),
        format!("have class {}", quote(class_name)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// `data-<key>` is present, and equals `expected` when given
pub async fn to_have_data_attribute<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    key: &str,
    expected: Option<&str>,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_data_attribute";
    let name = format!("data-{key}");
    let holds = |value: &Option<String>| match (value.as_deref(), expected) {
        (Some(got), Some(want)) => got == want,
        (Some(_), None) => true,
        (None, _) => false,
    };
    let value = match observe(ctx, options, || element.get_attribute(&name), holds).await {
        Ok(value) => value,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let expectation = match expected {
        Some(want) => format!("have {name}={}", quote(want)),
        None => format!("have {name}"),
    };
    let outcome = Outcome::new(holds(&value), describe_attribute(&name, value.as_deref()), expectation);
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Rendered text equals `expected` after trimming both
pub async fn to_have_trimmed_text<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    expected: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_trimmed_text";
    let want = expected.trim();
    let holds = |text: &String| text.trim() == want;
    let text = match observe(ctx, options, || element.inner_text(), holds).await {
        Ok(text) => text,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&text),
        format!("element text {}", quote(text.trim())),
        format!("equal {}", quote(want)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Rendered text matches the regular expression `pattern`
pub async fn to_have_text_matching<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    pattern: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_text_matching";
    let regex = Regex::new(pattern)
        .map_err(|e| ExpectlyError::invalid_argument(NAME, format!("invalid pattern /{pattern}/: {e}")))?;
    let holds = |text: &String| regex.is_match(text);
    let text = match observe(ctx, options, || element.inner_text(), holds).await {
        Ok(text) => text,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&text),
        format!("element text {}", quote(&text)),
        format!("match /{pattern}/"),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Rendered text stays unchanged for `min_stable` within `timeout`.
///
/// Options are validated before the first read. Each read runs under the
/// configured attempt timeout, capped at what is left of `timeout`. A failed
/// or timed-out read resets the stable window.
pub async fn to_have_stable_text<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    options: StabilityOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_stable_text";
    options.validate()?;

    let attempt_timeout = Duration::from_millis(ctx.config.attempt_timeout_ms);
    let start = Instant::now();
    let mut snapshot: Option<(String, Instant)> = None;
    let mut last_error: Option<ExpectlyError> = None;
    let mut changes = 0usize;
    let stable = loop {
        let budget = attempt_budget(attempt_timeout, options.timeout.saturating_sub(start.elapsed()));
        match bounded_attempt(budget, element.inner_text()).await {
            Ok(text) => {
                last_error = None;
                match &snapshot {
                    Some((previous, since)) if *previous == text => {
                        if since.elapsed() >= options.min_stable {
                            break true;
                        }
                    }
                    Some(_) => {
                        changes += 1;
                        trace!(changes, "text changed");
                        snapshot = Some((text, Instant::now()));
                    }
                    None => snapshot = Some((text, Instant::now())),
                }
            }
            Err(e) => {
                debug!(error = %e, "stability read failed");
                snapshot = None;
                last_error = Some(e);
            }
        }
        let Some(remaining) = options.timeout.checked_sub(start.elapsed()).filter(|r| !r.is_zero()) else {
            break false;
        };
        tokio::time::sleep(options.interval.min(remaining)).await;
    };

    let Some((text, _)) = snapshot else {
        let error = last_error.unwrap_or(ExpectlyError::Timeout {
            ms: options.timeout.as_millis() as u64,
        });
        return Ok(MatcherResult::collaborator_failure(NAME, ctx, &error));
    };
    let detail = format!("text changed {changes} time(s)");
    let outcome = Outcome::new(
        stable,
        format!("element text {}", quote(&text)),
        format!(
            "stay unchanged for {}ms within {}ms",
            options.min_stable.as_millis(),
            options.timeout.as_millis()
        ),
    )
    .with_failure_detail(&detail)
    .with_pass_detail(&detail);
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

fn describe_box(bounding_box: Option<&BoundingBox>) -> String {
    match bounding_box {
        Some(b) => format!("element of size {}x{}", format_number(b.width), format_number(b.height)),
        None => "element without a bounding box".to_string(),
    }
}

/// Rendered width and height equal the given values within epsilon
pub async fn to_have_size<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    width: f64,
    height: f64,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_size";
    let epsilon = ctx.epsilon();
    let holds = |b: &Option<BoundingBox>| {
        b.is_some_and(|b| approx_eq(b.width, width, epsilon) && approx_eq(b.height, height, epsilon))
    };
    let observed = match observe(ctx, options, || element.bounding_box(), holds).await {
        Ok(observed) => observed,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&observed),
        describe_box(observed.as_ref()),
        format!("have size {}x{}", format_number(width), format_number(height)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Rendered width and height are at least the given values
pub async fn to_have_min_size<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    min_width: f64,
    min_height: f64,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_min_size";
    let holds = |b: &Option<BoundingBox>| b.is_some_and(|b| b.width >= min_width && b.height >= min_height);
    let observed = match observe(ctx, options, || element.bounding_box(), holds).await {
        Ok(observed) => observed,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&observed),
        describe_box(observed.as_ref()),
        format!(
            "be at least {}x{}",
            format_number(min_width),
            format_number(min_height)
        ),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}

/// Serialized inner markup contains `needle`
pub async fn to_have_inner_html_containing<E: ElementHandle + ?Sized>(
    ctx: &MatcherContext,
    element: &E,
    needle: &str,
    options: ElementOptions,
) -> ExpectlyResult<MatcherResult> {
    const NAME: &str = "to_have_inner_html_containing";
    let holds = |html: &String| html.contains(needle);
    let html = match observe(ctx, options, || element.inner_html(), holds).await {
        Ok(html) => html,
        Err(e) => return Ok(MatcherResult::collaborator_failure(NAME, ctx, &e)),
    };
    let outcome = Outcome::new(
        holds(&html),
        format!("element markup {}", quote(&html)),
        format!("contain {}", quote(needle)),
    );
    Ok(MatcherResult::from_outcome(NAME, &outcome, ctx))
}
