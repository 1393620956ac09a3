//! Poll policy
//!
//! Tunables for a single poll session: how often to fetch, how long to keep
//! trying, and how chatty to be while doing it.

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors raised by [`PollPolicy::validate`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("poll interval must be greater than 0")]
    ZeroInterval,
}

/// Poll session parameters
///
/// Immutable once built; the `with_*` methods consume and return the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_duration: Option<Duration>,
    show_progress: bool,
    debug: bool,
}

impl PollPolicy {
    /// Creates a policy that polls every `interval` with no time limit
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_duration: None,
            show_progress: false,
            debug: false,
        }
    }

    /// Sets the total time budget measured from session start
    ///
    /// A zero duration means no limit.
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = (!max_duration.is_zero()).then_some(max_duration);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Delay between fetch attempts after the first
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time budget, `None` when polling may continue indefinitely
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Absolute deadline for a session that started at `start`
    ///
    /// A budget too large to represent is treated as no deadline.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.max_duration.and_then(|max| start.checked_add(max))
    }

    /// Validates the policy
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.interval.is_zero() {
            return Err(PolicyError::ZeroInterval);
        }

        Ok(())
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval(), Duration::from_secs(5));
        assert_eq!(policy.max_duration(), None);
        assert!(!policy.show_progress());
        assert!(!policy.debug());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_max_duration_means_no_deadline() {
        let policy = PollPolicy::default().with_max_duration(Duration::ZERO);
        assert_eq!(policy.max_duration(), None);
        assert_eq!(policy.deadline_from(Instant::now()), None);
    }

    #[test]
    fn test_deadline_is_relative_to_start() {
        let start = Instant::now();
        let policy = PollPolicy::new(Duration::from_millis(10))
            .with_max_duration(Duration::from_millis(50));

        assert_eq!(
            policy.deadline_from(start),
            Some(start + Duration::from_millis(50))
        );
    }

    #[test]
    fn test_huge_max_duration_is_unbounded() {
        let policy = PollPolicy::default().with_max_duration(Duration::MAX);
        assert_eq!(policy.deadline_from(Instant::now()), None);
    }

    #[test]
    fn test_policy_validation() {
        assert_eq!(
            PollPolicy::new(Duration::ZERO).validate(),
            Err(PolicyError::ZeroInterval)
        );
        assert!(PollPolicy::new(Duration::from_millis(1)).validate().is_ok());
    }

    #[test]
    fn test_builder_flags() {
        let policy = PollPolicy::default().with_progress(true).with_debug(true);
        assert!(policy.show_progress());
        assert!(policy.debug());
    }
}
