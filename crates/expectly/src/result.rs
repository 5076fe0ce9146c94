//! Result and error types for Expectly.
//!
//! Failing assertions are not errors: matchers report them through
//! [`MatcherResult`](crate::MatcherResult). The variants here are either
//! precondition violations (the caller passed something unusable) or
//! errors raised by the [`expect`](crate::expect()) host once a verdict
//! disagrees with the requested negation.

use thiserror::Error;

/// Result type for Expectly operations
pub type ExpectlyResult<T> = Result<T, ExpectlyError>;

/// Errors that can occur in Expectly
#[derive(Debug, Error)]
pub enum ExpectlyError {
    /// Date value is not a real instant
    #[error("Invalid date '{input}': {message}")]
    InvalidDate {
        /// Offending input
        input: String,
        /// Parser message
        message: String,
    },

    /// Timezone offset string could not be parsed
    #[error("Invalid timezone offset '{input}': expected 'Z', '+HH:MM', '+HHMM' or '+HH'")]
    InvalidTimezoneOffset {
        /// Offending input
        input: String,
    },

    /// Matcher requires at least one element
    #[error("{matcher}: expected a non-empty {what}")]
    EmptyInput {
        /// Matcher name
        matcher: &'static str,
        /// Description of the input
        what: &'static str,
    },

    /// Argument outside its valid range
    #[error("{matcher}: {name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Matcher name
        matcher: &'static str,
        /// Argument name
        name: &'static str,
        /// Lower bound
        min: i64,
        /// Upper bound
        max: i64,
        /// Supplied value
        value: i64,
    },

    /// Argument has the wrong shape
    #[error("{matcher}: {message}")]
    InvalidArgument {
        /// Matcher name
        matcher: &'static str,
        /// Error message
        message: String,
    },

    /// Sequence elements cannot be totally ordered
    #[error("Elements at index {left} ({left_kind}) and {right} ({right_kind}) are not comparable")]
    IncomparableElements {
        /// First index
        left: usize,
        /// Kind at first index
        left_kind: String,
        /// Second index
        right: usize,
        /// Kind at second index
        right_kind: String,
    },

    /// Configuration rejected before polling started
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Assertion error (from `expect()`)
    #[error("Assertion error: {message}")]
    AssertionError {
        /// Error message
        message: String,
    },

    /// Element handle call failed
    #[error("Element error: {message}")]
    Collaborator {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExpectlyError {
    /// Build an `InvalidArgument` error
    pub fn invalid_argument(matcher: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            matcher,
            message: message.into(),
        }
    }

    /// Build a `Collaborator` error
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Whether this error is a caller mistake rather than an assertion outcome
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate { .. }
                | Self::InvalidTimezoneOffset { .. }
                | Self::EmptyInput { .. }
                | Self::OutOfRange { .. }
                | Self::InvalidArgument { .. }
                | Self::IncomparableElements { .. }
                | Self::InvalidConfig { .. }
        )
    }
}
