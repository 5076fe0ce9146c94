//! Matchers grouped by the type of value they assert on.
//!
//! Each matcher takes a [`MatcherContext`](crate::matcher::MatcherContext),
//! the actual value and its arguments, and returns a
//! [`MatcherResult`](crate::matcher::MatcherResult). Invalid arguments are
//! returned as `Err` before any comparison runs; they never become a
//! failing result.

pub mod any;
pub mod date;
#[cfg(feature = "dom")]
pub mod dom;
pub mod numeric;
pub mod sequence;
pub mod string;
