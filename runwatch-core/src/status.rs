//! Run status classification
//!
//! The run service reports status as a free-form string. Only a fixed set of
//! values ends a run; everything else, including values this client has never
//! seen before, keeps the poller going.

/// Run finished successfully
pub const DONE: &str = "Done";
/// Run finished with an error
pub const FAILED: &str = "Failed";
/// Run was cancelled before finishing
pub const CANCELLED: &str = "Cancelled";
/// Alternate spelling of [`CANCELLED`] emitted by some service versions
pub const CANCELED: &str = "Canceled";
/// Run is waiting for capacity
pub const QUEUED: &str = "Queued";
/// Run is executing
pub const RUNNING: &str = "Running";

/// Every status value after which a run no longer changes
pub const TERMINAL_STATUSES: [&str; 4] = [DONE, FAILED, CANCELLED, CANCELED];

/// Result of classifying a status string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// No further state changes are expected
    Terminal,
    /// The run may still change state
    NonTerminal,
}

/// Classify a reported status
///
/// Matching is exact and case-sensitive. Unknown and empty values are
/// `NonTerminal` so that polling continues rather than reporting a result
/// the service never gave.
pub fn classify(status: &str) -> StatusClass {
    match status {
        DONE | FAILED | CANCELLED | CANCELED => StatusClass::Terminal,
        _ => StatusClass::NonTerminal,
    }
}

/// Returns true if `status` is one of [`TERMINAL_STATUSES`]
pub fn is_terminal(status: &str) -> bool {
    classify(status) == StatusClass::Terminal
}

/// Returns true if `status` is either spelling of cancellation
pub fn is_cancellation(status: &str) -> bool {
    matches!(status, CANCELLED | CANCELED)
}

/// Returns true only for a successfully finished run
pub fn is_success(status: &str) -> bool {
    status == DONE
}

/// Anything the poller can track to completion
///
/// The poller only ever looks at the status; every other field of the
/// implementing type is passed through to update callbacks untouched.
pub trait Snapshot {
    /// Status string as reported by the service
    fn status(&self) -> &str;

    /// Classification of [`Snapshot::status`]
    fn class(&self) -> StatusClass {
        classify(self.status())
    }

    fn is_terminal(&self) -> bool {
        self.class() == StatusClass::Terminal
    }
}
