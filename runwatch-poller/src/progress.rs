//! Progress reporting
//!
//! Human-readable progress lines and the sink they are written to. Reporting
//! is advisory: a session behaves identically whether or not anything is
//! printed.

use std::time::Duration;

/// Formats an elapsed duration in the largest sensible unit
///
/// Milliseconds below one second, then seconds, minutes and hours with one
/// decimal place.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        return format!("{}ms", elapsed.as_millis());
    }

    // The unit is picked from the rounded value, so 59.96s reads "1.0m"
    let in_tenths = |unit: f64| (secs / unit * 10.0).round() / 10.0;

    let seconds = in_tenths(1.0);
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }

    let minutes = in_tenths(60.0);
    if minutes < 60.0 {
        format!("{:.1}m", minutes)
    } else {
        format!("{:.1}h", in_tenths(3600.0))
    }
}

/// Formats one progress line for a successful fetch
pub fn format_progress(elapsed: Duration, status: &str) -> String {
    format!("[{}] status: {}", format_elapsed(elapsed), status)
}

/// Destination for progress lines and transient-error diagnostics
pub trait Reporter: Send {
    /// Called after each successful non-terminal fetch when progress is enabled
    fn progress(&mut self, line: &str);

    /// Called for every failed fetch after the first when debug is enabled
    fn transient_error(&mut self, attempt: u32, error: &anyhow::Error);
}

/// Writes progress and diagnostics to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn progress(&mut self, line: &str) {
        eprintln!("{}", line);
    }

    fn transient_error(&mut self, attempt: u32, error: &anyhow::Error) {
        eprintln!("fetch attempt {} failed, retrying: {:#}", attempt, error);
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn progress(&mut self, _line: &str) {}

    fn transient_error(&mut self, _attempt: u32, _error: &anyhow::Error) {}
}
