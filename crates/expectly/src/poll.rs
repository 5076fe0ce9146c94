//! Bounded retry loops.
//!
//! A [`PollSchedule`] is an overall deadline plus an interval list whose
//! last entry repeats. The same schedule drives [`poll_blocking`] (thread
//! sleeps) and [`poll_async`] (tokio timers with a per-attempt sub-timeout).
//!
//! Every loop makes at least one attempt, keeps the last observed value and
//! the last error, and reports them in a [`PollOutcome`]. Running out of
//! time is not an error; the caller decides what an unsatisfied outcome
//! means.

use crate::config::{DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_POLL_INTERVALS_MS};
use crate::result::{ExpectlyError, ExpectlyResult};
use std::time::{Duration, Instant};
use tracing::debug;

/// Deadline and interval schedule for one poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    /// Overall budget
    pub timeout: Duration,
    /// Sleep between attempts; the last one repeats
    pub intervals: Vec<Duration>,
    /// Budget for a single attempt, capped at the remaining overall budget
    pub attempt_timeout: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS))
    }
}

impl PollSchedule {
    /// Schedule with default intervals and attempt timeout
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            intervals: DEFAULT_POLL_INTERVALS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            attempt_timeout: Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS),
        }
    }

    /// Replace the interval list; an empty list keeps the current one
    #[must_use]
    pub fn with_intervals(mut self, intervals: Vec<Duration>) -> Self {
        if !intervals.is_empty() {
            self.intervals = intervals;
        }
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub const fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Interval iterator for this schedule
    #[must_use]
    pub fn backoff(&self) -> Backoff<'_> {
        Backoff {
            intervals: &self.intervals,
            index: 0,
        }
    }
}

/// Endless iterator over a schedule's intervals, repeating the last one
#[derive(Debug, Clone)]
pub struct Backoff<'a> {
    intervals: &'a [Duration],
    index: usize,
}

impl Iterator for Backoff<'_> {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let last = self.intervals.len().checked_sub(1)?;
        let interval = self.intervals[self.index.min(last)];
        self.index = self.index.saturating_add(1);
        Some(interval)
    }
}

/// Result of a poll loop
#[derive(Debug)]
pub struct PollOutcome<T> {
    /// Last successfully observed value
    pub value: Option<T>,
    /// Error from the most recent failed attempt, cleared by a later success
    pub last_error: Option<ExpectlyError>,
    /// Whether the predicate held on the last observed value
    pub satisfied: bool,
    /// Attempts made
    pub attempts: usize,
    /// Wall time spent
    pub elapsed: Duration,
}

impl<T> PollOutcome<T> {
    fn new() -> Self {
        Self {
            value: None,
            last_error: None,
            satisfied: false,
            attempts: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, observed: ExpectlyResult<T>, predicate: &impl Fn(&T) -> bool) {
        self.attempts += 1;
        match observed {
            Ok(value) => {
                self.satisfied = predicate(&value);
                self.value = Some(value);
                self.last_error = None;
            }
            Err(e) => {
                debug!(attempt = self.attempts, error = %e, "poll attempt failed");
                self.satisfied = false;
                self.last_error = Some(e);
            }
        }
    }
}

/// Poll `sample` on the current thread until `predicate` holds or time runs out
pub fn poll_blocking<T, F, P>(schedule: &PollSchedule, mut sample: F, predicate: P) -> PollOutcome<T>
where
    F: FnMut() -> ExpectlyResult<T>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut outcome = PollOutcome::new();
    let mut backoff = schedule.backoff();
    loop {
        outcome.record(sample(), &predicate);
        if outcome.satisfied {
            break;
        }
        let Some(remaining) = schedule.timeout.checked_sub(start.elapsed()).filter(|r| !r.is_zero()) else {
            break;
        };
        let pause = backoff.next().unwrap_or(remaining).min(remaining);
        std::thread::sleep(pause);
    }
    outcome.elapsed = start.elapsed();
    debug!(
        attempts = outcome.attempts,
        satisfied = outcome.satisfied,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "blocking poll finished"
    );
    outcome
}

/// Budget for one attempt: `attempt_timeout` capped at `remaining`, never zero
#[must_use]
pub fn attempt_budget(attempt_timeout: Duration, remaining: Duration) -> Duration {
    attempt_timeout.min(remaining).max(Duration::from_millis(1))
}

/// Run one async attempt under `budget`; running out becomes `Timeout`
#[cfg(feature = "dom")]
pub async fn bounded_attempt<T, Fut>(budget: Duration, attempt: Fut) -> ExpectlyResult<T>
where
    Fut: std::future::Future<Output = ExpectlyResult<T>>,
{
    match tokio::time::timeout(budget, attempt).await {
        Ok(observed) => observed,
        Err(_) => Err(ExpectlyError::Timeout {
            ms: budget.as_millis() as u64,
        }),
    }
}

/// Poll an async `sample` until `predicate` holds or time runs out.
///
/// Each attempt runs under `attempt_timeout`, capped at what is left of the
/// overall budget. A timed-out attempt counts as a failed attempt. Time is
/// read from the tokio clock.
#[cfg(feature = "dom")]
pub async fn poll_async<T, F, Fut, P>(schedule: &PollSchedule, mut sample: F, predicate: P) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ExpectlyResult<T>>,
    P: Fn(&T) -> bool,
{
    let start = tokio::time::Instant::now();
    let mut outcome = PollOutcome::new();
    let mut backoff = schedule.backoff();
    loop {
        let budget = attempt_budget(schedule.attempt_timeout, schedule.timeout.saturating_sub(start.elapsed()));
        let observed = bounded_attempt(budget, sample()).await;
        outcome.record(observed, &predicate);
        if outcome.satisfied {
            break;
        }
        let Some(remaining) = schedule.timeout.checked_sub(start.elapsed()).filter(|r| !r.is_zero()) else {
            break;
        };
        let pause = backoff.next().unwrap_or(remaining).min(remaining);
        tokio::time::sleep(pause).await;
    }
    outcome.elapsed = start.elapsed();
    debug!(
        attempts = outcome.attempts,
        satisfied = outcome.satisfied,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "async poll finished"
    );
    outcome
}
