// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The result of executing a single test case.

use casework_metadata::OutcomeSummary;
use chrono::{DateTime, Local};
use std::{borrow::Cow, fmt, time::Duration};

/// How a test case finished.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OutcomeKind {
    /// The test body and its hooks completed without failing.
    Passed,

    /// The test body violated an assertion.
    Failed,

    /// The test body or one of its hooks raised an unexpected error, or panicked.
    Errored,
}

impl OutcomeKind {
    /// Returns true if this outcome counts as a success.
    pub fn is_success(self) -> bool {
        match self {
            OutcomeKind::Passed => true,
            OutcomeKind::Failed | OutcomeKind::Errored => false,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutcomeKind::Passed => f.pad("PASS"),
            OutcomeKind::Failed => f.pad("FAIL"),
            OutcomeKind::Errored => f.pad("ERROR"),
        }
    }
}

impl From<OutcomeKind> for OutcomeSummary {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Passed => OutcomeSummary::Passed,
            OutcomeKind::Failed => OutcomeSummary::Failed,
            OutcomeKind::Errored => OutcomeSummary::Errored,
        }
    }
}

/// Output captured from a test case while it ran.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct CapturedOutput {
    buf: Vec<u8>,
}

impl CapturedOutput {
    pub(crate) fn new(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// Returns the raw bytes that were captured.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the captured output as a string, replacing invalid UTF-8 sequences.
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Debug for CapturedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedOutput")
            .field(&self.as_str_lossy())
            .finish()
    }
}

/// The recorded result of executing a test case.
///
/// An outcome is written exactly once, by the suite executing the test case, and is immutable
/// afterwards.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    kind: OutcomeKind,
    reason: String,
    start_time: DateTime<Local>,
    duration: Duration,
    stdout: CapturedOutput,
    stderr: CapturedOutput,
}

impl TestOutcome {
    pub(crate) fn new(
        kind: OutcomeKind,
        reason: String,
        start_time: DateTime<Local>,
        duration: Duration,
        stdout: CapturedOutput,
        stderr: CapturedOutput,
    ) -> Self {
        debug_assert!(
            kind.is_success() == reason.is_empty(),
            "a reason is given if and only if the test did not pass"
        );
        Self {
            kind,
            reason,
            start_time,
            duration,
            stdout,
            stderr,
        }
    }

    /// How the test finished.
    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    /// Returns true if the test passed.
    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }

    /// A human-readable description of why the test did not pass. Empty for passing tests.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The time at which the test started executing, including its before-each hook.
    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// The time taken to execute the test and its hooks.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Standard output captured while the test ran.
    pub fn stdout(&self) -> &CapturedOutput {
        &self.stdout
    }

    /// Standard error captured while the test ran.
    pub fn stderr(&self) -> &CapturedOutput {
        &self.stderr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_kind_display_pads() {
        assert_eq!(format!("{:>6}", OutcomeKind::Passed), "  PASS");
        assert_eq!(format!("{:>6}", OutcomeKind::Errored), " ERROR");
    }

    #[test]
    fn captured_output_lossy() {
        let output = CapturedOutput::new(b"hello \xF0\x90\x80world".to_vec());
        assert_eq!(output.as_str_lossy(), "hello \u{FFFD}world");
        assert!(!output.is_empty());
        assert!(CapturedOutput::default().is_empty());
    }
}
