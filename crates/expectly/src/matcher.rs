//! Matcher results and negation-aware messages.
//!
//! Every matcher computes a `pass` flag and an [`Outcome`] carrying four
//! phrasings, one for each combination of `pass` and negation. The
//! [`MatcherContext`] picks the phrasing that fits the assertion actually
//! being made, so a failing `.not` assertion never reuses the positive-case
//! message.

use crate::config::ExpectConfig;
use crate::result::ExpectlyError;
use std::fmt::{self, Display};

/// Negation flag and active config for one matcher call
#[derive(Debug, Clone, Default)]
pub struct MatcherContext {
    /// `true` for `.not` assertions
    pub is_not: bool,
    /// Active configuration
    pub config: ExpectConfig,
}

impl MatcherContext {
    /// Positive context with default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Negated context with default config
    #[must_use]
    pub fn negated() -> Self {
        Self {
            is_not: true,
            ..Self::default()
        }
    }

    /// Set the negation flag
    #[must_use]
    pub const fn with_not(mut self, is_not: bool) -> Self {
        self.is_not = is_not;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ExpectConfig) -> Self {
        self.config = config;
        self
    }

    /// Float tolerance from the config
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    /// Bounded rendering of a sequence using the configured excerpt size
    #[must_use]
    pub fn excerpt<T: Display>(&self, items: &[T]) -> String {
        excerpt(items, self.config.max_excerpt_items)
    }
}

/// The four phrasings of a matcher verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pass: bool,
    passed: String,
    passed_negated: String,
    failed: String,
    failed_negated: String,
}

impl Outcome {
    /// Standard phrasings: `expected <received> [not ]to <expectation>`.
    ///
    /// `expectation` reads as a verb phrase, e.g. `start with "ab"`.
    #[must_use]
    pub fn new(pass: bool, received: impl Display, expectation: impl Display) -> Self {
        let subject = format!("expected {received}");
        Self {
            pass,
            passed: format!("{subject} to {expectation}, and it does"),
            passed_negated: format!("{subject} not to {expectation}, but it does"),
            failed: format!("{subject} to {expectation}, but it does not"),
            failed_negated: format!("{subject} not to {expectation}, and it does not"),
        }
    }

    /// Fully custom phrasings
    #[must_use]
    pub fn custom(
        pass: bool,
        passed: impl Into<String>,
        passed_negated: impl Into<String>,
        failed: impl Into<String>,
        failed_negated: impl Into<String>,
    ) -> Self {
        Self {
            pass,
            passed: passed.into(),
            passed_negated: passed_negated.into(),
            failed: failed.into(),
            failed_negated: failed_negated.into(),
        }
    }

    /// Append detail to the message shown when a positive assertion fails
    #[must_use]
    pub fn with_failure_detail(mut self, detail: impl Display) -> Self {
        self.failed = format!("{}: {detail}", self.failed);
        self
    }

    /// Append detail to the message shown when a negated assertion fails
    #[must_use]
    pub fn with_pass_detail(mut self, detail: impl Display) -> Self {
        self.passed_negated = format!("{}: {detail}", self.passed_negated);
        self
    }

    /// Whether the condition held
    #[must_use]
    pub const fn pass(&self) -> bool {
        self.pass
    }

    /// Phrasing for the given negation flag
    #[must_use]
    pub fn message(&self, is_not: bool) -> &str {
        match (self.pass, is_not) {
            (true, false) => &self.passed,
            (true, true) => &self.passed_negated,
            (false, false) => &self.failed,
            (false, true) => &self.failed_negated,
        }
    }
}

/// Verdict of one matcher call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherResult {
    name: &'static str,
    pass: bool,
    is_not: bool,
    message: String,
}

impl MatcherResult {
    /// Resolve an outcome against the context's negation flag
    #[must_use]
    pub fn from_outcome(name: &'static str, outcome: &Outcome, ctx: &MatcherContext) -> Self {
        Self {
            name,
            pass: outcome.pass(),
            is_not: ctx.is_not,
            message: format!("{name}: {}", outcome.message(ctx.is_not)),
        }
    }

    /// Failing result carrying a collaborator error.
    ///
    /// `pass` is set to the negation flag, so the assertion fails whether or
    /// not it was negated.
    #[must_use]
    pub fn collaborator_failure(name: &'static str, ctx: &MatcherContext, error: &ExpectlyError) -> Self {
        Self {
            name,
            pass: ctx.is_not,
            is_not: ctx.is_not,
            message: format!("{name}: could not read element: {error}"),
        }
    }

    /// Matcher name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the condition held
    #[must_use]
    pub const fn pass(&self) -> bool {
        self.pass
    }

    /// Whether the assertion was negated
    #[must_use]
    pub const fn is_not(&self) -> bool {
        self.is_not
    }

    /// Whether the assertion as written succeeded (`pass != is_not`)
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.pass != self.is_not
    }

    /// Diagnostic message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MatcherResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// `[a, b, c, … (N more)]` showing at most `max_items` elements
pub fn excerpt<T: Display>(items: &[T], max_items: usize) -> String {
    let shown: Vec<String> = items.iter().take(max_items).map(ToString::to_string).collect();
    let hidden = items.len().saturating_sub(max_items);
    if hidden == 0 {
        format!("[{}]", shown.join(", "))
    } else if shown.is_empty() {
        format!("[… ({hidden} more)]")
    } else {
        format!("[{}, … ({hidden} more)]", shown.join(", "))
    }
}
