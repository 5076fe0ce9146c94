//! Partial-structure matching.
//!
//! A [`Shape`] describes only the parts of a value that must match. The
//! matcher first projects the actual value onto the shape with
//! [`extract_matching_shape`], then compares the projection to the shape
//! with [`shape_matches`]. Keys that only exist on the actual value never
//! reach the comparison, so mismatch reports stay focused.
//!
//! Array shapes match order-independently: each expected element takes the
//! first actual element that matches it. Elements are not removed from the
//! candidate pool, so one actual element may satisfy several expected ones.

use crate::canonical::deep_equal;
use crate::value::{Value, ValueKind};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Predicate node standing in for "any value that satisfies ..."
#[derive(Clone)]
pub struct Placeholder {
    description: String,
    predicate: Rc<dyn Fn(&Value) -> bool>,
}

impl Placeholder {
    /// Create a placeholder from a description and predicate
    pub fn new(description: impl Into<String>, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            description: description.into(),
            predicate: Rc::new(predicate),
        }
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate the predicate
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placeholder")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Expected structure for partial matching
#[derive(Debug, Clone)]
pub enum Shape {
    /// Compare with full deep equality
    Literal(Value),
    /// Compare only the listed keys
    Nested(BTreeMap<String, Shape>),
    /// Each element must match some actual element
    ArrayOf(Vec<Shape>),
    /// Delegate to a predicate
    Placeholder(Placeholder),
}

impl Shape {
    /// Nested shape from key/shape pairs
    pub fn nested<K, S, I>(entries: I) -> Self
    where
        K: Into<String>,
        S: Into<Shape>,
        I: IntoIterator<Item = (K, S)>,
    {
        Self::Nested(entries.into_iter().map(|(k, s)| (k.into(), s.into())).collect())
    }

    /// Array shape from element shapes
    pub fn array_of<S, I>(items: I) -> Self
    where
        S: Into<Shape>,
        I: IntoIterator<Item = S>,
    {
        Self::ArrayOf(items.into_iter().map(Into::into).collect())
    }

    /// Matches every value, including null and undefined
    #[must_use]
    pub fn anything() -> Self {
        Self::Placeholder(Placeholder::new("anything", |_| true))
    }

    /// Matches any value except null and undefined
    #[must_use]
    pub fn any() -> Self {
        Self::Placeholder(Placeholder::new("any non-null value", |v| !v.is_nullish()))
    }

    /// Matches values of one kind
    #[must_use]
    pub fn any_of_kind(kind: ValueKind) -> Self {
        Self::Placeholder(Placeholder::new(format!("any {kind}"), move |v| v.kind() == kind))
    }

    /// Matches strings containing `needle`
    #[must_use]
    pub fn string_containing(needle: &str) -> Self {
        let needle = needle.to_string();
        Self::Placeholder(Placeholder::new(
            format!("string containing {needle:?}"),
            move |v| v.as_str().is_some_and(|s| s.contains(&needle)),
        ))
    }

    /// Matches strings matching a regex
    #[must_use]
    pub fn string_matching(pattern: Regex) -> Self {
        Self::Placeholder(Placeholder::new(
            format!("string matching /{}/", pattern.as_str()),
            move |v| v.as_str().is_some_and(|s| pattern.is_match(s)),
        ))
    }

    /// Matches numbers within `epsilon` of `expected`
    #[must_use]
    pub fn close_to(expected: f64, epsilon: f64) -> Self {
        Self::Placeholder(Placeholder::new(
            format!("number close to {expected} (±{epsilon})"),
            move |v| v.as_f64().is_some_and(|n| (n - expected).abs() <= epsilon),
        ))
    }

    /// Matches values accepted by a custom predicate
    pub fn predicate(description: impl Into<String>, f: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::Placeholder(Placeholder::new(description, f))
    }

    fn from_value_with(value: &Value, path: &mut HashSet<usize>) -> Self {
        let Some(ptr) = value.ptr_id().filter(|_| value.is_container()) else {
            return Self::Literal(value.clone());
        };
        // A cyclic expected value cannot be unrolled; compare that node literally
        if !path.insert(ptr) {
            return Self::Literal(value.clone());
        }
        let shape = match value {
            Value::Array(_) => Self::ArrayOf(
                value
                    .elements()
                    .unwrap_or_default()
                    .iter()
                    .map(|item| Self::from_value_with(item, path))
                    .collect(),
            ),
            _ => Self::Nested(
                value
                    .entries()
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_value_with(&v, path)))
                    .collect(),
            ),
        };
        path.remove(&ptr);
        shape
    }
}

impl From<Value> for Shape {
    fn from(value: Value) -> Self {
        Self::from_value_with(&value, &mut HashSet::new())
    }
}

impl From<serde_json::Value> for Shape {
    fn from(json: serde_json::Value) -> Self {
        Self::from(Value::from(json))
    }
}

impl From<&str> for Shape {
    fn from(s: &str) -> Self {
        Self::Literal(Value::from(s))
    }
}

impl From<f64> for Shape {
    fn from(n: f64) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<i32> for Shape {
    fn from(n: i32) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<bool> for Shape {
    fn from(b: bool) -> Self {
        Self::Literal(Value::from(b))
    }
}

impl From<Placeholder> for Shape {
    fn from(p: Placeholder) -> Self {
        Self::Placeholder(p)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Placeholder(p) => write!(f, "<{}>", p.description()),
            Self::Nested(map) => {
                f.write_str("{")?;
                for (i, (key, shape)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {shape}")?;
                }
                f.write_str("}")
            }
            Self::ArrayOf(items) => {
                f.write_str("[")?;
                for (i, shape) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{shape}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// =============================================================================
// EXTRACTION AND COMPARISON
// =============================================================================

/// Project `actual` onto `shape`.
///
/// The result has the nesting of `shape`. Missing keys and unmatched array
/// elements become `undefined` so the following comparison reports them.
///
/// Each array slot first tries the actual element at the same index, then
/// the first element in order that matches. Elements are never removed from
/// the candidate pool. Projecting a projection returns it unchanged.
pub fn extract_matching_shape(actual: &Value, shape: &Shape) -> Value {
    match shape {
        Shape::Literal(_) | Shape::Placeholder(_) => actual.clone(),
        Shape::ArrayOf(expected) => {
            let Some(candidates) = actual.elements() else {
                return actual.clone();
            };
            let slots: Vec<Value> = expected
                .iter()
                .enumerate()
                .map(|(index, item_shape)| {
                    candidates
                        .get(index)
                        .into_iter()
                        .chain(candidates.iter())
                        .map(|candidate| extract_matching_shape(candidate, item_shape))
                        .find(|projected| shape_matches(projected, item_shape))
                        .unwrap_or(Value::Undefined)
                })
                .collect();
            Value::array(slots)
        }
        Shape::Nested(fields) => {
            if actual.kind() != ValueKind::Object {
                return actual.clone();
            }
            let projected = Value::object();
            for (key, field_shape) in fields {
                let value = actual
                    .get(key)
                    .map_or(Value::Undefined, |v| extract_matching_shape(&v, field_shape));
                projected.set(key.clone(), value);
            }
            projected
        }
    }
}

/// Full comparison of a value against a shape
pub fn shape_matches(value: &Value, shape: &Shape) -> bool {
    match shape {
        Shape::Literal(expected) => deep_equal(value, expected),
        Shape::Placeholder(p) => p.accepts(value),
        Shape::Nested(fields) => {
            value.kind() == ValueKind::Object
                && value.keys().iter().all(|k| fields.contains_key(k))
                && fields.iter().all(|(key, field_shape)| {
                    shape_matches(&value.get(key).unwrap_or_default(), field_shape)
                })
        }
        Shape::ArrayOf(items) => value.elements().is_some_and(|elements| {
            elements.len() == items.len()
                && elements
                    .iter()
                    .zip(items.iter())
                    .all(|(element, item_shape)| shape_matches(element, item_shape))
        }),
    }
}

/// Whether `actual` satisfies `shape` after projection
pub fn matches_partial(actual: &Value, shape: &Shape) -> bool {
    shape_matches(&extract_matching_shape(actual, shape), shape)
}

/// One difference between a projected value and its shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Path from the root (`$`)
    pub path: String,
    /// Expected description
    pub expected: String,
    /// Actual rendering
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, received {}", self.path, self.expected, self.actual)
    }
}

/// Every difference between `projected` and `shape`
pub fn shape_mismatches(projected: &Value, shape: &Shape) -> Vec<Mismatch> {
    let mut out = Vec::new();
    collect_mismatches(projected, shape, "$", &mut out);
    out
}

fn collect_mismatches(value: &Value, shape: &Shape, path: &str, out: &mut Vec<Mismatch>) {
    let mismatch = |out: &mut Vec<Mismatch>| {
        out.push(Mismatch {
            path: path.to_string(),
            expected: shape.to_string(),
            actual: value.to_string(),
        });
    };
    match shape {
        Shape::Literal(_) | Shape::Placeholder(_) => {
            if !shape_matches(value, shape) {
                mismatch(out);
            }
        }
        Shape::Nested(fields) => {
            if value.kind() != ValueKind::Object {
                mismatch(out);
                return;
            }
            for (key, field_shape) in fields {
                let child = value.get(key).unwrap_or_default();
                collect_mismatches(&child, field_shape, &format!("{path}.{key}"), out);
            }
        }
        Shape::ArrayOf(items) => match value.elements() {
            Some(elements) if elements.len() == items.len() => {
                for (i, (element, item_shape)) in elements.iter().zip(items.iter()).enumerate() {
                    collect_mismatches(element, item_shape, &format!("{path}[{i}]"), out);
                }
            }
            _ => mismatch(out),
        },
    }
}
