//! Duplicate detection.
//!
//! Primitive duplicates are found in one pass and reported in the order
//! they first repeat. Structured duplicates are grouped by canonical key and
//! reported once each, in original order, using the first occurrence.

use crate::canonical::{canonical_key_or_fallback, CanonicalCache};
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Values that occur more than once, in first-repeat order
pub fn find_duplicates<T>(items: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        if !seen.insert(item) && reported.insert(item) {
            duplicates.push(item.clone());
        }
    }
    duplicates
}

/// Set-style duplicates over dynamic values.
///
/// Scalars compare by content; arrays, objects and functions compare by
/// identity, so two equal-but-distinct objects are not duplicates here.
pub fn find_duplicate_primitives(items: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        let key = match item.ptr_id() {
            Some(ptr) => format!("[Ref:{ptr}]"),
            None => canonical_key_or_fallback(item),
        };
        if !seen.insert(key.clone()) && reported.insert(key) {
            duplicates.push(item.clone());
        }
    }
    duplicates
}

/// Deep-equality duplicates, one entry per duplicated value.
pub fn find_duplicate_objects(items: &[Value]) -> Vec<Value> {
    let mut cache = CanonicalCache::new();
    find_duplicate_objects_with_cache(items, &mut cache)
}

/// [`find_duplicate_objects`] with a caller-owned key cache
pub fn find_duplicate_objects_with_cache(items: &[Value], cache: &mut CanonicalCache) -> Vec<Value> {
    let keys: Vec<String> = items.iter().map(|item| cache.key(item)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in &keys {
        *counts.entry(key.as_str()).or_default() += 1;
    }

    let mut emitted = HashSet::new();
    items
        .iter()
        .zip(keys.iter())
        .filter(|&(_, key)| counts.get(key.as_str()).copied().unwrap_or(0) > 1)
        .filter(|&(_, key)| emitted.insert(key.as_str()))
        .map(|(item, _)| item.clone())
        .collect()
}
