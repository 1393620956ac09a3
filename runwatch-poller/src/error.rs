//! Error types for poll sessions

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::policy::PolicyError;
use crate::progress::format_elapsed;

/// Result type alias for poll sessions
pub type PollResult<S> = std::result::Result<S, PollError<S>>;

/// Ways a poll session can end without a terminal snapshot
///
/// Fetch failures after the first attempt never show up here; the session
/// retries them on the next tick.
#[derive(Debug, Error)]
pub enum PollError<S: fmt::Debug> {
    /// The policy was rejected before anything was fetched
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(#[from] PolicyError),

    /// The initial fetch failed
    ///
    /// An immediate failure usually means a wrong address, id or credential,
    /// so it is not retried.
    #[error("initial status check failed: {0:#}")]
    HardFailure(anyhow::Error),

    /// The policy's maximum duration elapsed before a terminal status
    #[error("timed out after {}", format_elapsed(*.elapsed))]
    Timeout {
        /// Time since the session was created
        elapsed: Duration,
    },

    /// Cancellation was requested while waiting for the next fetch
    #[error("interrupted while waiting for a terminal status")]
    Interrupted {
        /// Most recent snapshot delivered to the update callback
        last: S,
    },
}

impl<S: fmt::Debug> PollError<S> {
    /// Last known snapshot, only present for [`PollError::Interrupted`]
    pub fn last_snapshot(&self) -> Option<&S> {
        match self {
            Self::Interrupted { last } => Some(last),
            _ => None,
        }
    }

    /// Consumes the error, returning the last known snapshot if any
    pub fn into_last_snapshot(self) -> Option<S> {
        match self {
            Self::Interrupted { last } => Some(last),
            _ => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_invalid_policy(&self) -> bool {
        matches!(self, Self::InvalidPolicy(_))
    }

    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::HardFailure(_))
    }
}
