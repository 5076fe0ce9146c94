//! Ordering and monotonicity checks.
//!
//! The element kind of a sequence is resolved once (numbers, strings or
//! dates) and dispatched to one comparator. Mixed or unorderable
//! sequences are precondition violations, never a quiet `false`.
//!
//! Violation indices name the left element of the offending adjacent
//! pair: index `i` means the pair `(i, i + 1)`.

use crate::result::{ExpectlyError, ExpectlyResult};
use crate::value::{Value, ValueKind};
use std::cmp::Ordering;
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl Direction {
    /// Lowercase name used in messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    /// Whether `ord` (left vs right) respects this direction
    #[must_use]
    pub fn accepts(&self, ord: Ordering, strict: bool) -> bool {
        match (self, ord) {
            (_, Ordering::Equal) => !strict,
            (Self::Ascending, Ordering::Less) | (Self::Descending, Ordering::Greater) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// COMPARATORS
// =============================================================================

/// Total order over one element kind
pub trait Comparator {
    /// Compare two values of this comparator's kind
    fn compare(&self, a: &Value, b: &Value) -> Ordering;
}

/// Orders numbers by the sign of their difference
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericComparator;

/// Orders strings by code point
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicographicComparator;

/// Orders dates by instant
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalComparator;

impl Comparator for NumericComparator {
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let diff = a.as_f64().unwrap_or_default() - b.as_f64().unwrap_or_default();
        if diff < 0.0 {
            Ordering::Less
        } else if diff > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl Comparator for LexicographicComparator {
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        a.as_str().unwrap_or_default().cmp(b.as_str().unwrap_or_default())
    }
}

impl Comparator for TemporalComparator {
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.as_date(), b.as_date()) {
            (Some(x), Some(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
            _ => Ordering::Equal,
        }
    }
}

/// Orderable element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Numbers
    Number,
    /// Strings
    Text,
    /// Dates
    Date,
}

impl ElementKind {
    /// Kind of a single value, if orderable
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if !n.is_nan() => Some(Self::Number),
            Value::String(_) => Some(Self::Text),
            Value::Date(_) => Some(Self::Date),
            _ => None,
        }
    }

    /// Resolve the single kind shared by every element; `None` when empty
    pub fn resolve(items: &[Value]) -> ExpectlyResult<Option<Self>> {
        let mut resolved: Option<Self> = None;
        for (index, item) in items.iter().enumerate() {
            let Some(kind) = Self::of(item) else {
                return Err(ExpectlyError::invalid_argument(
                    "ordering",
                    format!("element at index {index} ({item}) is not an orderable number, string or date"),
                ));
            };
            match resolved {
                None => resolved = Some(kind),
                Some(first) if first != kind => {
                    return Err(ExpectlyError::IncomparableElements {
                        left: 0,
                        left_kind: items[0].kind().to_string(),
                        right: index,
                        right_kind: item.kind().to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(resolved)
    }

    /// Comparator for this kind
    #[must_use]
    pub fn comparator(&self) -> &'static dyn Comparator {
        match self {
            Self::Number => &NumericComparator,
            Self::Text => &LexicographicComparator,
            Self::Date => &TemporalComparator,
        }
    }
}

// =============================================================================
// SEQUENCE CHECKS
// =============================================================================

/// First adjacent pair breaking `direction`, using a caller-supplied order
pub fn first_violation_by<T, F>(items: &[T], direction: Direction, strict: bool, compare: F) -> Option<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    items
        .windows(2)
        .position(|pair| !direction.accepts(compare(&pair[0], &pair[1]), strict))
}

fn first_violation(items: &[Value], direction: Direction, strict: bool) -> ExpectlyResult<Option<usize>> {
    let Some(kind) = ElementKind::resolve(items)? else {
        return Ok(None);
    };
    let comparator = kind.comparator();
    Ok(first_violation_by(items, direction, strict, |a, b| {
        comparator.compare(a, b)
    }))
}

/// Index of the first pair that is not ascending
pub fn first_ascending_violation(items: &[Value], strict: bool) -> ExpectlyResult<Option<usize>> {
    first_violation(items, Direction::Ascending, strict)
}

/// Index of the first pair that is not descending
pub fn first_descending_violation(items: &[Value], strict: bool) -> ExpectlyResult<Option<usize>> {
    first_violation(items, Direction::Descending, strict)
}

/// Whether the sequence is ascending
pub fn is_ascending(items: &[Value], strict: bool) -> ExpectlyResult<bool> {
    Ok(first_ascending_violation(items, strict)?.is_none())
}

/// Whether the sequence is descending
pub fn is_descending(items: &[Value], strict: bool) -> ExpectlyResult<bool> {
    Ok(first_descending_violation(items, strict)?.is_none())
}

/// Non-decreasing or non-increasing end to end
pub fn is_monotonic(items: &[Value]) -> ExpectlyResult<bool> {
    Ok(is_ascending(items, false)? || is_descending(items, false)?)
}

/// Sorted copy used as the expected sequence for whole-sequence order checks
pub fn sorted_expected(items: &[Value], direction: Direction) -> ExpectlyResult<Vec<Value>> {
    let mut sorted = items.to_vec();
    if let Some(kind) = ElementKind::resolve(items)? {
        let comparator = kind.comparator();
        sorted.sort_by(|a, b| match direction {
            Direction::Ascending => comparator.compare(a, b),
            Direction::Descending => comparator.compare(b, a),
        });
    }
    Ok(sorted)
}

// =============================================================================
// PROPERTY-KEYED ORDER
// =============================================================================

/// Why a record sequence is not ordered by a property
#[derive(Debug, Clone, PartialEq)]
pub enum SortViolation {
    /// A record lacks the property
    PropertyMissing {
        /// Left index of the pair
        left: usize,
        /// Right index of the pair
        right: usize,
        /// Index of the record without the property
        missing_at: usize,
    },
    /// The property is null or undefined
    NullOrUndefined {
        /// Left index of the pair
        left: usize,
        /// Right index of the pair
        right: usize,
        /// Index of the nullish record
        nullish_at: usize,
    },
    /// The two property values have different types
    TypeMismatch {
        /// Left index of the pair
        left: usize,
        /// Right index of the pair
        right: usize,
        /// Kind of the left value
        left_kind: ValueKind,
        /// Kind of the right value
        right_kind: ValueKind,
    },
    /// The pair is in the wrong order
    OutOfOrder {
        /// Left index of the pair
        left: usize,
        /// Right index of the pair
        right: usize,
        /// Left value
        left_value: Value,
        /// Right value
        right_value: Value,
    },
    /// Equal values where strict order was required
    NotStrict {
        /// Left index of the pair
        left: usize,
        /// Right index of the pair
        right: usize,
        /// Shared value
        value: Value,
    },
}

impl SortViolation {
    /// Short reason tag
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::PropertyMissing { .. } => "property missing",
            Self::NullOrUndefined { .. } => "null or undefined",
            Self::TypeMismatch { .. } => "type mismatch",
            Self::OutOfOrder { .. } => "out of order",
            Self::NotStrict { .. } => "equal values",
        }
    }

    /// Indices of the offending pair
    #[must_use]
    pub const fn pair(&self) -> (usize, usize) {
        match self {
            Self::PropertyMissing { left, right, .. }
            | Self::NullOrUndefined { left, right, .. }
            | Self::TypeMismatch { left, right, .. }
            | Self::OutOfOrder { left, right, .. }
            | Self::NotStrict { left, right, .. } => (*left, *right),
        }
    }
}

impl fmt::Display for SortViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropertyMissing { left, right, missing_at } => write!(
                f,
                "property missing on record at index {missing_at} (comparing indices {left} and {right})"
            ),
            Self::NullOrUndefined { left, right, nullish_at } => write!(
                f,
                "property is null or undefined on record at index {nullish_at} (comparing indices {left} and {right})"
            ),
            Self::TypeMismatch { left, right, left_kind, right_kind } => write!(
                f,
                "type mismatch between index {left} ({left_kind}) and index {right} ({right_kind})"
            ),
            Self::OutOfOrder { left, right, left_value, right_value } => write!(
                f,
                "index {left} ({left_value}) and index {right} ({right_value}) are out of order"
            ),
            Self::NotStrict { left, right, value } => write!(
                f,
                "index {left} and index {right} are both {value}"
            ),
        }
    }
}

/// Check that records are ordered by `property`; `Ok(None)` when they are
pub fn check_sorted_by(
    records: &[Value],
    property: &str,
    direction: Direction,
    strict: bool,
) -> ExpectlyResult<Option<SortViolation>> {
    if let Some((index, record)) = records.iter().enumerate().find(|(_, r)| r.kind() != ValueKind::Object) {
        return Err(ExpectlyError::invalid_argument(
            "to_be_sorted_by",
            format!("record at index {index} is a {}, not an object", record.kind()),
        ));
    }

    for left in 0..records.len().saturating_sub(1) {
        let right = left + 1;
        let (Some(a), Some(b)) = (records[left].get(property), records[right].get(property)) else {
            let missing_at = if records[left].has_key(property) { right } else { left };
            return Ok(Some(SortViolation::PropertyMissing { left, right, missing_at }));
        };
        if a.is_nullish() || b.is_nullish() {
            let nullish_at = if a.is_nullish() { left } else { right };
            return Ok(Some(SortViolation::NullOrUndefined { left, right, nullish_at }));
        }
        if a.kind() != b.kind() {
            return Ok(Some(SortViolation::TypeMismatch {
                left,
                right,
                left_kind: a.kind(),
                right_kind: b.kind(),
            }));
        }
        let Some(kind) = ElementKind::of(&a) else {
            return Err(ExpectlyError::invalid_argument(
                "to_be_sorted_by",
                format!("property '{property}' holds {} values, which have no order", a.kind()),
            ));
        };
        let ord = kind.comparator().compare(&a, &b);
        if ord == Ordering::Equal && strict {
            return Ok(Some(SortViolation::NotStrict { left, right, value: a }));
        }
        if !direction.accepts(ord, strict) {
            return Ok(Some(SortViolation::OutOfOrder {
                left,
                right,
                left_value: a,
                right_value: b,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::values_from_json;
    use proptest::prelude::*;
    use serde_json::json;

    fn nums(items: &[f64]) -> Vec<Value> {
        items.iter().copied().map(Value::from).collect()
    }

    mod kinds {
        use super::*;

        #[test]
        fn test_resolve() {
            assert_eq!(ElementKind::resolve(&nums(&[1.0, 2.0])).unwrap(), Some(ElementKind::Number));
            assert_eq!(ElementKind::resolve(&[]).unwrap(), None);
            let texts = values_from_json(json!(["a", "b"]));
            assert_eq!(ElementKind::resolve(&texts).unwrap(), Some(ElementKind::Text));
        }

        #[test]
        fn test_resolve_mixed() {
            let mixed = values_from_json(json!([1, "2"]));
            let err = ElementKind::resolve(&mixed).unwrap_err();
            assert!(matches!(err, ExpectlyError::IncomparableElements { right: 1, .. }));
        }

        #[test]
        fn test_resolve_unorderable() {
            assert!(ElementKind::resolve(&values_from_json(json!([null]))).is_err());
            assert!(ElementKind::resolve(&[Value::Number(f64::NAN)]).is_err());
        }

        #[test]
        fn test_numeric_handles_negative_fractions() {
            let c = NumericComparator;
            assert_eq!(c.compare(&Value::from(-0.5), &Value::from(-0.25)), Ordering::Less);
        }
    }

    mod sequences {
        use super::*;

        #[test]
        fn test_scenario_with_tie() {
            let items = nums(&[1.0, 2.0, 2.0, 3.0]);
            assert!(is_ascending(&items, false).unwrap());
            assert_eq!(first_ascending_violation(&items, true).unwrap(), Some(1));
            assert!(is_monotonic(&items).unwrap());
        }

        #[test]
        fn test_descending() {
            let items = nums(&[5.0, 3.0, 4.0]);
            assert_eq!(first_descending_violation(&items, false).unwrap(), Some(1));
            assert!(!is_monotonic(&items).unwrap());
        }

        #[test]
        fn test_vacuous() {
            for items in [vec![], nums(&[7.0])] {
                assert!(is_ascending(&items, true).unwrap());
                assert!(is_descending(&items, true).unwrap());
                assert!(is_monotonic(&items).unwrap());
            }
        }

        #[test]
        fn test_constant_is_both() {
            let items = nums(&[2.0, 2.0]);
            assert!(is_ascending(&items, false).unwrap());
            assert!(is_descending(&items, false).unwrap());
        }

        #[test]
        fn test_strings_and_dates() {
            let words = values_from_json(json!(["apple", "banana", "cherry"]));
            assert!(is_ascending(&words, true).unwrap());
            let dates: Vec<Value> = ["2024-03-01", "2024-01-01"]
                .iter()
                .map(|s| Value::from(crate::temporal::parse_date(s).unwrap()))
                .collect();
            assert!(is_descending(&dates, true).unwrap());
        }

        #[test]
        fn test_sorted_expected() {
            let items = nums(&[3.0, 1.0, 2.0]);
            assert_eq!(sorted_expected(&items, Direction::Ascending).unwrap(), nums(&[1.0, 2.0, 3.0]));
            assert_eq!(sorted_expected(&items, Direction::Descending).unwrap(), nums(&[3.0, 2.0, 1.0]));
            // Input untouched
            assert_eq!(items, nums(&[3.0, 1.0, 2.0]));
        }

        #[test]
        fn test_first_violation_by_typed() {
            let idx = first_violation_by(&[1, 3, 2], Direction::Ascending, false, |a, b| a.cmp(b));
            assert_eq!(idx, Some(1));
        }
    }

    mod sorted_by {
        use super::*;

        fn records(json: serde_json::Value) -> Vec<Value> {
            values_from_json(json)
        }

        #[test]
        fn test_ordered() {
            let items = records(json!([{"id": 1}, {"id": 2}, {"id": 2}]));
            assert_eq!(check_sorted_by(&items, "id", Direction::Ascending, false).unwrap(), None);
        }

        #[test]
        fn test_type_mismatch() {
            let items = records(json!([{"id": 1}, {"id": "2"}]));
            let violation = check_sorted_by(&items, "id", Direction::Ascending, false)
                .unwrap()
                .unwrap();
            assert_eq!(violation.reason(), "type mismatch");
            assert_eq!(violation.pair(), (0, 1));
            assert!(violation.to_string().contains("index 0 (number) and index 1 (string)"));
        }

        #[test]
        fn test_missing() {
            let items = records(json!([{"id": 1}, {"name": "x"}]));
            let violation = check_sorted_by(&items, "id", Direction::Ascending, false)
                .unwrap()
                .unwrap();
            assert!(matches!(violation, SortViolation::PropertyMissing { missing_at: 1, .. }));
        }

        #[test]
        fn test_nullish() {
            let items = records(json!([{"id": null}, {"id": 1}]));
            let violation = check_sorted_by(&items, "id", Direction::Ascending, false)
                .unwrap()
                .unwrap();
            assert!(matches!(violation, SortViolation::NullOrUndefined { nullish_at: 0, .. }));
        }

        #[test]
        fn test_strict_and_order() {
            let items = records(json!([{"n": "b"}, {"n": "b"}]));
            let violation = check_sorted_by(&items, "n", Direction::Descending, true)
                .unwrap()
                .unwrap();
            assert_eq!(violation.reason(), "equal values");

            let items = records(json!([{"n": 1}, {"n": 2}]));
            let violation = check_sorted_by(&items, "n", Direction::Descending, false)
                .unwrap()
                .unwrap();
            assert_eq!(violation.reason(), "out of order");
        }

        #[test]
        fn test_non_object_record_is_error() {
            let items = records(json!([{"n": 1}, 2]));
            assert!(check_sorted_by(&items, "n", Direction::Ascending, false).is_err());
        }

        #[test]
        fn test_unorderable_property_is_error() {
            let items = records(json!([{"n": [1]}, {"n": [2]}]));
            assert!(check_sorted_by(&items, "n", Direction::Ascending, false).is_err());
        }
    }

    proptest! {
        #[test]
        fn prop_ascending_is_reversed_descending(items in prop::collection::vec(-100i32..100, 0..20), strict in any::<bool>()) {
            let seq: Vec<Value> = items.iter().copied().map(Value::from).collect();
            let mut reversed = seq.clone();
            reversed.reverse();
            prop_assert_eq!(is_ascending(&seq, strict).unwrap(), is_descending(&reversed, strict).unwrap());
        }

        #[test]
        fn prop_short_sequences_monotonic(items in prop::collection::vec(-100i32..100, 0..2)) {
            let seq: Vec<Value> = items.iter().copied().map(Value::from).collect();
            prop_assert!(is_monotonic(&seq).unwrap());
        }

        #[test]
        fn prop_sorted_expected_reverses(items in prop::collection::hash_set(-100i32..100, 0..20)) {
            let seq: Vec<Value> = items.iter().copied().map(Value::from).collect();
            let mut asc = sorted_expected(&seq, Direction::Ascending).unwrap();
            asc.reverse();
            prop_assert_eq!(asc, sorted_expected(&seq, Direction::Descending).unwrap());
        }

        #[test]
        fn prop_sorted_expected_is_ascending(items in prop::collection::vec(-1000.0f64..1000.0, 0..20)) {
            let seq: Vec<Value> = items.iter().copied().map(Value::from).collect();
            let asc = sorted_expected(&seq, Direction::Ascending).unwrap();
            prop_assert!(is_ascending(&asc, false).unwrap());
        }
    }
}
