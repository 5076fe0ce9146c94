//! Canonical keys and deep equality.
//!
//! A canonical key is a key-sorted serialization of a value's content: two
//! deeply equal values always produce the same key, whatever their node
//! identity. A node reached again while it is still being serialized is
//! written as `[Circular:<id>]`, where `<id>` is the order in which that
//! node was first seen during the current pass. Ids never leak between
//! passes.

use crate::value::{format_number, quote, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Why a value has no canonical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// The value holds something with no content encoding
    Unserializable {
        /// Path to the offending node (`$` is the root)
        path: String,
        /// What was found there
        reason: String,
    },
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unserializable { path, reason } => write!(f, "{reason} at {path}"),
        }
    }
}

impl std::error::Error for CanonicalError {}

struct Canonicalizer {
    ids: HashMap<usize, usize>,
    path: HashSet<usize>,
}

impl Canonicalizer {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            path: HashSet::new(),
        }
    }

    fn write(&mut self, value: &Value, at: &str, out: &mut String) -> Result<(), CanonicalError> {
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::String(s) => out.push_str(&quote(s)),
            Value::Date(d) => {
                out.push_str(&format!("Date({}.{:09})", d.timestamp(), d.timestamp_subsec_nanos()));
            }
            Value::Function(func) => {
                return Err(CanonicalError::Unserializable {
                    path: at.to_string(),
                    reason: format!("function '{}' cannot be serialized", func.name()),
                });
            }
            Value::Array(node) => {
                let Some(id) = self.enter(value, out) else {
                    return Ok(());
                };
                out.push('[');
                for (i, item) in node.items().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write(item, &format!("{at}[{i}]"), out)?;
                }
                out.push(']');
                self.path.remove(&id);
            }
            Value::Object(node) => {
                let Some(id) = self.enter(value, out) else {
                    return Ok(());
                };
                out.push('{');
                for (i, (key, item)) in node.fields().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&quote(key));
                    out.push(':');
                    self.write(item, &format!("{at}.{key}"), out)?;
                }
                out.push('}');
                self.path.remove(&id);
            }
        }
        Ok(())
    }

    /// Registers a container; writes the circular marker and returns `None` on re-entry
    fn enter(&mut self, value: &Value, out: &mut String) -> Option<usize> {
        let ptr = value.ptr_id()?;
        let next = self.ids.len();
        let id = *self.ids.entry(ptr).or_insert(next);
        if !self.path.insert(ptr) {
            out.push_str(&format!("[Circular:{id}]"));
            return None;
        }
        Some(ptr)
    }
}

/// Canonical key of a value
pub fn canonical_key(value: &Value) -> Result<String, CanonicalError> {
    let mut out = String::new();
    Canonicalizer::new().write(value, "$", &mut out)?;
    Ok(out)
}

/// Canonical key, or a deterministic `[Unserializable:...]` tag
pub fn canonical_key_or_fallback(value: &Value) -> String {
    match canonical_key(value) {
        Ok(key) => key,
        Err(err) => {
            debug!(error = %err, "canonical key fell back to placeholder");
            format!("[Unserializable:{err}]")
        }
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Memoizes top-level canonical keys by node identity.
///
/// A cached key reflects the node's content when it was first computed.
/// Callers that mutate a node between lookups must [`invalidate`] it or
/// [`clear`] the cache. The cache holds a handle to every cached node, so an
/// identity cannot be reused by a different node while it is cached.
///
/// [`invalidate`]: CanonicalCache::invalidate
/// [`clear`]: CanonicalCache::clear
#[derive(Debug, Default)]
pub struct CanonicalCache {
    entries: HashMap<usize, (Value, String)>,
    hits: usize,
}

impl CanonicalCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key (with fallback) for a value, memoized for containers
    pub fn key(&mut self, value: &Value) -> String {
        if !value.is_container() {
            return canonical_key_or_fallback(value);
        }
        let ptr = value.ptr_id().unwrap_or_default();
        if let Some((_, key)) = self.entries.get(&ptr) {
            self.hits += 1;
            return key.clone();
        }
        let key = canonical_key_or_fallback(value);
        self.entries.insert(ptr, (value.clone(), key.clone()));
        key
    }

    /// Drop the cached key of one node
    pub fn invalidate(&mut self, value: &Value) -> bool {
        value
            .ptr_id()
            .is_some_and(|ptr| self.entries.remove(&ptr).is_some())
    }

    /// Drop every cached key
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }

    /// Number of cached nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }
}

// =============================================================================
// EQUALITY
// =============================================================================

/// Structural equality: arrays element-wise, objects by own keys.
///
/// Cycles are handled co-inductively: a pair of nodes already under
/// comparison is assumed equal. `NaN` equals `NaN`; functions compare by
/// identity; dates compare by instant.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut seen = HashSet::new();
    deep_equal_with(a, b, &mut seen)
}

fn deep_equal_with(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            if a.same_ref(b) {
                return true;
            }
            let pair = (a.ptr_id().unwrap_or_default(), b.ptr_id().unwrap_or_default());
            if !seen.insert(pair) {
                return true;
            }
            let (x, y) = (x.items(), y.items());
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|(l, r)| deep_equal_with(l, r, seen))
        }
        (Value::Object(x), Value::Object(y)) => {
            if a.same_ref(b) {
                return true;
            }
            let pair = (a.ptr_id().unwrap_or_default(), b.ptr_id().unwrap_or_default());
            if !seen.insert(pair) {
                return true;
            }
            let (x, y) = (x.fields(), y.fields());
            x.len() == y.len()
                && x.iter().all(|(key, l)| {
                    y.get(key)
                        .is_some_and(|r| deep_equal_with(l, r, seen))
                })
        }
        _ => scalar_equal(a, b),
    }
}

fn scalar_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Function(_), Value::Function(_)) => a.same_ref(b),
        _ => false,
    }
}

/// Equality used by membership matchers.
///
/// Structural comparison runs only when both sides are containers; any
/// other pairing is decided by scalar or reference equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_container() && b.is_container() {
        deep_equal(a, b)
    } else {
        scalar_equal(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    mod keys {
        use super::*;

        #[test]
        fn test_key_sorts_object_keys() {
            let a = Value::from(json!({"b": 1, "a": [1, "x"]}));
            assert_eq!(canonical_key(&a).unwrap(), r#"{"a":[1,"x"],"b":1}"#);
        }

        #[test]
        fn test_distinct_types_distinct_keys() {
            let num = canonical_key(&Value::from(1)).unwrap();
            let text = canonical_key(&Value::from("1")).unwrap();
            assert_ne!(num, text);
            assert_ne!(
                canonical_key(&Value::Null).unwrap(),
                canonical_key(&Value::Undefined).unwrap()
            );
        }

        #[test]
        fn test_equal_dates_with_different_offsets() {
            let a = crate::temporal::parse_date("2024-01-01T10:00:00+02:00").unwrap();
            let b = crate::temporal::parse_date("2024-01-01T08:00:00Z").unwrap();
            assert_eq!(
                canonical_key(&Value::from(a)).unwrap(),
                canonical_key(&Value::from(b)).unwrap()
            );
        }

        #[test]
        fn test_sub_millisecond_dates_differ() {
            let a = Value::from(crate::temporal::parse_date("2024-01-01T00:00:00.000100Z").unwrap());
            let b = Value::from(crate::temporal::parse_date("2024-01-01T00:00:00.000900Z").unwrap());
            assert!(!deep_equal(&a, &b));
            assert_ne!(canonical_key(&a).unwrap(), canonical_key(&b).unwrap());
            assert_eq!(canonical_key(&a).unwrap(), "Date(1704067200.000100000)");
        }

        #[test]
        fn test_pre_epoch_date_key() {
            let a = Value::from(crate::temporal::parse_date("1969-12-31T23:59:59.5Z").unwrap());
            assert_eq!(canonical_key(&a).unwrap(), "Date(-1.500000000)");
        }

        #[test]
        fn test_self_reference() {
            let obj = Value::object_from([("name", "root")]);
            obj.set("self", obj.clone());
            let key = canonical_key(&obj).unwrap();
            assert_eq!(key, r#"{"name":"root","self":[Circular:0]}"#);
            assert_eq!(canonical_key(&obj).unwrap(), key);
        }

        #[test]
        fn test_transitive_cycle_ids_follow_first_seen_order() {
            let outer = Value::object();
            let inner = Value::array(vec![1]);
            outer.set("list", inner.clone());
            inner.push(outer.clone());
            let key = canonical_key(&outer).unwrap();
            assert_eq!(key, r#"{"list":[1,[Circular:0]]}"#);
            // Starting from the inner node renumbers from zero
            let key = canonical_key(&inner).unwrap();
            assert_eq!(key, r#"[1,{"list":[Circular:0]}]"#);
        }

        #[test]
        fn test_shared_node_is_not_circular() {
            let shared = Value::array(vec![1]);
            let outer = Value::array(vec![shared.clone(), shared]);
            assert_eq!(canonical_key(&outer).unwrap(), "[[1],[1]]");
        }

        #[test]
        fn test_function_is_unserializable() {
            let obj = Value::object_from([("cb", Value::function("onClick"))]);
            let err = canonical_key(&obj).unwrap_err();
            assert_eq!(err.to_string(), "function 'onClick' cannot be serialized at $.cb");
            let fallback = canonical_key_or_fallback(&obj);
            assert!(fallback.starts_with("[Unserializable:"));
            assert_eq!(fallback, canonical_key_or_fallback(&obj));
        }
    }

    mod cache {
        use super::*;

        #[test]
        fn test_memoizes_by_identity() {
            let mut cache = CanonicalCache::new();
            let obj = Value::from(json!({"a": 1}));
            let first = cache.key(&obj);
            let second = cache.key(&obj.clone());
            assert_eq!(first, second);
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.hits(), 1);
        }

        #[test]
        fn test_stale_until_invalidated() {
            let mut cache = CanonicalCache::new();
            let obj = Value::from(json!({"a": 1}));
            let before = cache.key(&obj);
            obj.set("a", 2);
            assert_eq!(cache.key(&obj), before);
            assert!(cache.invalidate(&obj));
            assert_ne!(cache.key(&obj), before);
        }

        #[test]
        fn test_scalars_not_cached() {
            let mut cache = CanonicalCache::new();
            let _ = cache.key(&Value::from(3));
            assert!(cache.is_empty());
            cache.clear();
            assert_eq!(cache.hits(), 0);
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn test_deep_equal_nested() {
            let a = Value::from(json!({"a": [1, {"b": null}]}));
            let b = Value::from(json!({"a": [1, {"b": null}]}));
            let c = Value::from(json!({"a": [1, {"b": 0}]}));
            assert!(deep_equal(&a, &b));
            assert!(!deep_equal(&a, &c));
        }

        #[test]
        fn test_deep_equal_cycles_terminate() {
            let a = Value::object();
            a.set("me", a.clone());
            let b = Value::object();
            b.set("me", b.clone());
            assert!(deep_equal(&a, &b));
        }

        #[test]
        fn test_nan_and_functions() {
            assert!(deep_equal(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
            let f = Value::function("f");
            assert!(deep_equal(&f, &f.clone()));
            assert!(!deep_equal(&f, &Value::function("f")));
        }

        #[test]
        fn test_values_equal_mixed_kinds() {
            let arr = Value::array(vec![1]);
            assert!(!values_equal(&arr, &Value::from(1)));
            assert!(values_equal(&Value::from("x"), &Value::from("x")));
            assert!(values_equal(&arr, &Value::array(vec![1])));
        }
    }

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            (-1000i64..1000).prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                    .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_key_stable_under_deep_clone(json in arb_json()) {
            let value = Value::from(json);
            let copy = value.deep_clone();
            prop_assert_eq!(canonical_key(&value).unwrap(), canonical_key(&copy).unwrap());
            prop_assert!(deep_equal(&value, &copy));
        }

        #[test]
        fn prop_equal_keys_iff_deep_equal(a in arb_json(), b in arb_json()) {
            let (a, b) = (Value::from(a), Value::from(b));
            let same_key = canonical_key(&a).unwrap() == canonical_key(&b).unwrap();
            prop_assert_eq!(same_key, deep_equal(&a, &b));
        }
    }
}
