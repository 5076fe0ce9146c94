//! Statistical aggregation over numeric sequences.
//!
//! Empty input never panics: `sum`, `average` and `median` return 0, while
//! `min`, `max` and `range` return NaN so an assertion against them fails
//! with a visible NaN instead of an error.

/// Sum of all values (0 when empty)
#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

/// Arithmetic mean (0 when empty)
#[must_use]
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Median of a sorted copy (0 when empty)
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Smallest value (NaN when empty)
#[must_use]
pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Largest value (NaN when empty)
#[must_use]
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

/// `max - min` (NaN when empty)
#[must_use]
pub fn range(values: &[f64]) -> f64 {
    max(values) - min(values)
}

/// Epsilon-bounded equality, relative for large magnitudes.
///
/// NaN never equals anything, including NaN.
#[must_use]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= epsilon * scale
}
