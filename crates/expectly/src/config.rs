//! Matcher Configuration
//!
//! Defaults for wait budgets, poll schedules, float tolerance and message
//! excerpts. Loadable from YAML and overridable from the environment.

use crate::poll::PollSchedule;
use crate::result::{ExpectlyError, ExpectlyResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default wait budget for element-resolving matchers (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default per-attempt budget for a single element call
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 1_000;

/// Default poll schedule; the last interval repeats
pub const DEFAULT_POLL_INTERVALS_MS: [u64; 4] = [100, 250, 500, 1_000];

/// Default float tolerance for statistical comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Default number of sequence items shown in messages
pub const DEFAULT_MAX_EXCERPT_ITEMS: usize = 10;

/// Environment variable overriding `timeout_ms`
pub const ENV_TIMEOUT_MS: &str = "EXPECTLY_TIMEOUT_MS";

/// Environment variable overriding `attempt_timeout_ms`
pub const ENV_ATTEMPT_TIMEOUT_MS: &str = "EXPECTLY_ATTEMPT_TIMEOUT_MS";

/// Environment variable overriding `epsilon`
pub const ENV_EPSILON: &str = "EXPECTLY_EPSILON";

// =============================================================================
// EXPECT CONFIG
// =============================================================================

/// Configuration shared by every matcher call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectConfig {
    /// Overall wait budget in milliseconds
    pub timeout_ms: u64,
    /// Poll intervals in milliseconds (last one repeats)
    pub poll_intervals_ms: Vec<u64>,
    /// Budget for one collaborator call in milliseconds
    pub attempt_timeout_ms: u64,
    /// Tolerance for float comparisons
    pub epsilon: f64,
    /// Items shown before a sequence excerpt is truncated
    pub max_excerpt_items: usize,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_intervals_ms: DEFAULT_POLL_INTERVALS_MS.to_vec(),
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            epsilon: DEFAULT_EPSILON,
            max_excerpt_items: DEFAULT_MAX_EXCERPT_ITEMS,
        }
    }
}

impl ExpectConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the per-attempt timeout in milliseconds
    #[must_use]
    pub const fn with_attempt_timeout(mut self, attempt_timeout_ms: u64) -> Self {
        self.attempt_timeout_ms = attempt_timeout_ms;
        self
    }

    /// Set the poll intervals in milliseconds
    #[must_use]
    pub fn with_poll_intervals(mut self, intervals_ms: &[u64]) -> Self {
        self.poll_intervals_ms = intervals_ms.to_vec();
        self
    }

    /// Set the float tolerance
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the excerpt size for sequence messages
    #[must_use]
    pub const fn with_max_excerpt_items(mut self, items: usize) -> Self {
        self.max_excerpt_items = items;
        self
    }

    /// Overall timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll schedule derived from this config, optionally with a timeout override
    #[must_use]
    pub fn poll_schedule(&self, timeout_override: Option<Duration>) -> PollSchedule {
        PollSchedule::new(timeout_override.unwrap_or_else(|| self.timeout()))
            .with_intervals(
                self.poll_intervals_ms
                    .iter()
                    .map(|ms| Duration::from_millis(*ms))
                    .collect(),
            )
            .with_attempt_timeout(Duration::from_millis(self.attempt_timeout_ms))
    }

    /// Parse a config from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ExpectlyResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to YAML
    pub fn to_yaml(&self) -> ExpectlyResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Defaults with `EXPECTLY_*` environment overrides applied
    pub fn from_env() -> ExpectlyResult<Self> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment or test map)
    pub fn apply_overrides<F>(mut self, lookup: F) -> ExpectlyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_env(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ATTEMPT_TIMEOUT_MS) {
            self.attempt_timeout_ms = parse_env(ENV_ATTEMPT_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EPSILON) {
            self.epsilon = parse_env(ENV_EPSILON, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject unusable settings
    pub fn validate(&self) -> ExpectlyResult<()> {
        if self.poll_intervals_ms.is_empty() {
            return Err(ExpectlyError::InvalidConfig {
                message: "poll_intervals_ms must not be empty".to_string(),
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ExpectlyError::InvalidConfig {
                message: format!("epsilon must be a finite non-negative number, got {}", self.epsilon),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> ExpectlyResult<T> {
    raw.trim().parse().map_err(|_| ExpectlyError::InvalidConfig {
        message: format!("{key} has unparseable value '{raw}'"),
    })
}

// =============================================================================
// PER-CALL OPTIONS
// =============================================================================

/// Options recognised by element-resolving matchers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOptions {
    /// Overrides the configured wait budget
    pub timeout: Option<Duration>,
}

impl ElementOptions {
    /// Options with no overrides
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Override the wait budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Options for the text-stability matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityOptions {
    /// Overall budget
    pub timeout: Duration,
    /// How long the text must stay unchanged
    pub min_stable: Duration,
    /// Delay between snapshots
    pub interval: Duration,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            min_stable: Duration::from_millis(500),
            interval: Duration::from_millis(100),
        }
    }
}

impl StabilityOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the required stable duration
    #[must_use]
    pub const fn with_min_stable(mut self, min_stable: Duration) -> Self {
        self.min_stable = min_stable;
        self
    }

    /// Set the snapshot interval
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Check the options can ever succeed
    pub fn validate(&self) -> ExpectlyResult<()> {
        if self.interval.is_zero() {
            return Err(ExpectlyError::InvalidConfig {
                message: "stability interval must be greater than zero".to_string(),
            });
        }
        if self.min_stable > self.timeout {
            return Err(ExpectlyError::InvalidConfig {
                message: format!(
                    "min_stable ({}ms) cannot be reached within timeout ({}ms)",
                    self.min_stable.as_millis(),
                    self.timeout.as_millis()
                ),
            });
        }
        if self.interval > self.min_stable {
            return Err(ExpectlyError::InvalidConfig {
                message: format!(
                    "interval ({}ms) is longer than min_stable ({}ms)",
                    self.interval.as_millis(),
                    self.min_stable.as_millis()
                ),
            });
        }
        Ok(())
    }
}
