// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistics folded from finished test cases.
//!
//! Statistics hold no state of their own: they are recomputed from outcomes every time they are
//! requested, so they can never drift from the outcomes they describe.

use crate::outcome::{OutcomeKind, TestOutcome};
use std::time::Duration;

/// Aggregated statistics for a single suite.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SuiteStatistics {
    /// The number of test cases in the suite.
    pub tests: usize,

    /// The number of test cases that failed an assertion.
    pub failures: usize,

    /// The number of test cases that errored out.
    pub errors: usize,

    /// The sum of the durations of every test case.
    pub cumulative_time: Duration,

    /// Wall-clock time from the start of the suite until its last test case finished.
    ///
    /// For a parallel suite this is usually much smaller than `cumulative_time`.
    pub elapsed: Duration,
}

impl SuiteStatistics {
    /// Folds statistics over the given outcomes. `elapsed` is the wall-clock time of the suite.
    pub fn from_outcomes<'a>(
        outcomes: impl IntoIterator<Item = &'a TestOutcome>,
        elapsed: Duration,
    ) -> Self {
        outcomes.into_iter().fold(
            Self {
                elapsed,
                ..Self::default()
            },
            |mut stats, outcome| {
                stats.tests += 1;
                match outcome.kind() {
                    OutcomeKind::Passed => {}
                    OutcomeKind::Failed => stats.failures += 1,
                    OutcomeKind::Errored => stats.errors += 1,
                }
                stats.cumulative_time += outcome.duration();
                stats
            },
        )
    }

    /// The number of test cases that passed.
    pub fn passed(&self) -> usize {
        self.tests - self.failures - self.errors
    }

    /// Returns true if every test case passed.
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }
}

/// Aggregated statistics across every suite of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStatistics {
    /// The number of suites.
    pub suites: usize,

    /// The number of test cases across all suites.
    pub tests: usize,

    /// The number of test cases that failed an assertion.
    pub failures: usize,

    /// The number of test cases that errored out.
    pub errors: usize,

    /// The sum of the durations of every test case.
    pub cumulative_time: Duration,

    /// The wall-clock time spent running waves.
    ///
    /// Suites in the same wave may overlap, so this can be less than the sum of the suites'
    /// elapsed times.
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Folds statistics over per-suite statistics, for a run that took `elapsed`.
    pub fn from_suites<'a>(
        suites: impl IntoIterator<Item = &'a SuiteStatistics>,
        elapsed: Duration,
    ) -> Self {
        let initial = Self {
            elapsed,
            ..Self::default()
        };
        suites.into_iter().fold(initial, |mut stats, suite| {
            stats.suites += 1;
            stats.tests += suite.tests;
            stats.failures += suite.failures;
            stats.errors += suite.errors;
            stats.cumulative_time += suite.cumulative_time;
            stats
        })
    }

    /// The number of test cases that passed.
    pub fn passed(&self) -> usize {
        self.tests - self.failures - self.errors
    }

    /// The number of test cases that failed or errored. Zero means the run was successful.
    pub fn exit_signal(&self) -> usize {
        self.failures + self.errors
    }
}
