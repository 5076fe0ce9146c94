//! Expectly: custom assertion matchers for UI and data tests
//!
//! Each matcher performs one self-contained comparison (string affixes,
//! numeric statistics, calendar arithmetic, sequence ordering and
//! uniqueness, partial structure, element attributes and text) and returns
//! a verdict with a message phrased for the assertion as written, negated
//! or not.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      EXPECTLY Layers                           │
//! ├───────────────────────────────────────────────────────────────┤
//! │  expect(actual)  ──►  matchers::*  ──►  MatcherResult          │
//! │                            │                                   │
//! │        ┌───────────┬───────┼────────┬──────────┐               │
//! │        ▼           ▼       ▼        ▼          ▼               │
//! │   duplicates   ordering  shape    stats    temporal            │
//! │        │                                                       │
//! │        ▼                    poll ──► ElementHandle (async)     │
//! │    canonical                                                   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engines below `matchers` are synchronous and side-effect free.
//! Only the element matchers suspend, polling an [`ElementHandle`] with a
//! bounded [`PollSchedule`].

#![warn(missing_docs)]

mod result;

pub mod canonical;
pub mod config;
pub mod duplicates;
#[cfg(feature = "dom")]
pub mod element;
pub mod expect;
pub mod logging;
pub mod matcher;
pub mod matchers;
pub mod ordering;
pub mod poll;
pub mod shape;
pub mod stats;
pub mod temporal;
pub mod value;

pub use canonical::{
    canonical_key, canonical_key_or_fallback, deep_equal, values_equal, CanonicalCache,
    CanonicalError,
};
pub use config::{
    ElementOptions, ExpectConfig, StabilityOptions, DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_EPSILON,
    DEFAULT_MAX_EXCERPT_ITEMS, DEFAULT_POLL_INTERVALS_MS, DEFAULT_TIMEOUT_MS,
};
pub use duplicates::{
    find_duplicate_objects, find_duplicate_objects_with_cache, find_duplicate_primitives,
    find_duplicates,
};
#[cfg(feature = "dom")]
pub use element::{BoundingBox, ElementHandle, StaticElement};
pub use expect::{expect, expect_date, poll, verify, Expect, Poll};
pub use logging::{init_logging, init_test_logging, LogFormat};
pub use matcher::{excerpt, MatcherContext, MatcherResult, Outcome};
pub use ordering::{
    check_sorted_by, first_ascending_violation, first_descending_violation, is_ascending,
    is_descending, is_monotonic, sorted_expected, Comparator, Direction, ElementKind,
    LexicographicComparator, NumericComparator, SortViolation, TemporalComparator,
};
#[cfg(feature = "dom")]
pub use poll::{bounded_attempt, poll_async};
pub use poll::{attempt_budget, poll_blocking, Backoff, PollOutcome, PollSchedule};
pub use result::{ExpectlyError, ExpectlyResult};
pub use shape::{
    extract_matching_shape, matches_partial, shape_matches, shape_mismatches, Mismatch,
    Placeholder, Shape,
};
pub use temporal::{
    parse_date, parse_dates, parse_offset, CalendarSpan, ConsecutiveViolation, Date,
    DeviationWindow, Gap, TimeUnit,
};
pub use value::{values_from_json, Value, ValueKind};
