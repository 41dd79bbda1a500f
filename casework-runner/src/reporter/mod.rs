// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting of finished runs.
//!
//! A [`RunReport`] is a read-only view over a runner whose waves have all run. It can only be
//! obtained through [`Runner::report`](crate::runner::Runner::report), so reporters never observe a
//! half-executed tree. Reporters implement [`Reporter`] and render the view into some format.

mod displayer;
mod json;
mod junit;
mod markdown;

pub use displayer::*;
pub use json::*;
pub use junit::*;
pub use markdown::*;

use crate::{
    errors::{ReportError, UsageError},
    outcome::{CapturedOutput, OutcomeKind, TestOutcome},
    stats::{RunStatistics, SuiteStatistics},
    test_case::TestCase,
    test_suite::{ConcurrencyMode, TestSuite},
};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Renders a finished run.
pub trait Reporter {
    /// Writes a report for the given run.
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        (**self).report(run)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        (**self).report(run)
    }
}

/// A read-only view over a finished run.
#[derive(Clone, Debug)]
pub struct RunReport<'a> {
    start_time: DateTime<Local>,
    statistics: RunStatistics,
    suites: Vec<SuiteReport<'a>>,
}

impl<'a> RunReport<'a> {
    pub(crate) fn new(
        suites: &'a [TestSuite],
        start_time: DateTime<Local>,
        elapsed: Duration,
    ) -> Result<Self, UsageError> {
        let suites = suites
            .iter()
            .map(SuiteReport::new)
            .collect::<Result<Vec<_>, _>>()?;
        let statistics =
            RunStatistics::from_suites(suites.iter().map(|suite| &suite.statistics), elapsed);
        Ok(Self {
            start_time,
            statistics,
            suites,
        })
    }

    /// The time at which the first wave started.
    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// The total wall-clock time spent running waves.
    pub fn elapsed(&self) -> Duration {
        self.statistics.elapsed
    }

    /// Statistics across every suite.
    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    /// The suites of the run, in registration order.
    pub fn suites(&self) -> &[SuiteReport<'a>] {
        &self.suites
    }

    /// The number of test cases that failed or errored. Zero means success.
    pub fn exit_signal(&self) -> usize {
        self.statistics.exit_signal()
    }
}

/// A read-only view over a finished suite.
#[derive(Clone, Debug)]
pub struct SuiteReport<'a> {
    suite: &'a TestSuite,
    timestamp: DateTime<Local>,
    statistics: SuiteStatistics,
    test_cases: Vec<CaseReport<'a>>,
}

impl<'a> SuiteReport<'a> {
    fn new(suite: &'a TestSuite) -> Result<Self, UsageError> {
        let test_cases = suite
            .test_cases()
            .iter()
            .map(CaseReport::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            suite,
            timestamp: suite.timestamp()?,
            statistics: suite.statistics()?,
            test_cases,
        })
    }

    /// The name of the suite.
    pub fn name(&self) -> &'a str {
        self.suite.name()
    }

    /// The context label of the suite.
    pub fn context(&self) -> &'a str {
        self.suite.context()
    }

    /// How the suite executed its test cases.
    pub fn mode(&self) -> ConcurrencyMode {
        self.suite.mode()
    }

    /// The time at which the suite started running.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Statistics for the suite.
    pub fn statistics(&self) -> &SuiteStatistics {
        &self.statistics
    }

    /// The test cases of the suite, in declaration order.
    pub fn test_cases(&self) -> &[CaseReport<'a>] {
        &self.test_cases
    }
}

/// A read-only view over an executed test case.
#[derive(Clone, Copy, Debug)]
pub struct CaseReport<'a> {
    test_case: &'a TestCase,
    outcome: &'a TestOutcome,
}

impl<'a> CaseReport<'a> {
    fn new(test_case: &'a TestCase) -> Result<Self, UsageError> {
        Ok(Self {
            test_case,
            outcome: test_case.outcome()?,
        })
    }

    /// The name of the test case.
    pub fn name(&self) -> &'a str {
        self.test_case.name()
    }

    /// The name of the suite the test case belongs to.
    pub fn suite_name(&self) -> &'a str {
        self.test_case.suite_name()
    }

    /// The full outcome of the test case.
    pub fn outcome(&self) -> &'a TestOutcome {
        self.outcome
    }

    /// How the test case finished.
    pub fn kind(&self) -> OutcomeKind {
        self.outcome.kind()
    }

    /// Why the test case did not pass. Empty for passing test cases.
    pub fn reason(&self) -> &'a str {
        self.outcome.reason()
    }

    /// The time taken by the test case, including its hooks.
    pub fn duration(&self) -> Duration {
        self.outcome.duration()
    }

    /// Captured standard output.
    pub fn stdout(&self) -> &'a CapturedOutput {
        self.outcome.stdout()
    }

    /// Captured standard error.
    pub fn stderr(&self) -> &'a CapturedOutput {
        self.outcome.stderr()
    }
}


#[cfg(test)]
mod tests {
    use super::{test_helpers::finished_runner, *};

    #[test]
    fn report_views_finished_tree() {
        let runner = finished_runner();
        let report = runner.report().unwrap();

        assert_eq!(report.exit_signal(), 2);
        assert_eq!(report.statistics().suites, 2);
        assert_eq!(report.statistics().tests, 3);

        let names: Vec<_> = report.suites().iter().map(|suite| suite.name()).collect();
        assert_eq!(names, ["math", "io"]);

        let math = &report.suites()[0];
        assert_eq!(math.context(), "Calculator");
        assert_eq!(math.mode(), ConcurrencyMode::Parallel);
        let kinds: Vec<_> = math.test_cases().iter().map(|case| case.kind()).collect();
        assert_eq!(kinds, [OutcomeKind::Passed, OutcomeKind::Failed]);
        assert_eq!(math.test_cases()[1].stdout().as_str_lossy(), "subtracting\n");

        let io = &report.suites()[1];
        assert_eq!(io.test_cases()[0].kind(), OutcomeKind::Errored);
        assert_eq!(io.test_cases()[0].reason(), "file not found");
        assert!(io.timestamp() >= report.start_time());
    }
}
