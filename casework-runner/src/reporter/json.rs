// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CaseReport, Reporter, RunReport, SuiteReport};
use crate::{config::ReportSettings, errors::ReportError};
use casework_metadata::{RunSummary, SuiteSummary, TestCaseSummary};
use std::io::Write;

/// Writes a machine-readable JSON summary of the run.
///
/// The format is described by [`RunSummary`] in `casework-metadata`.
#[derive(Debug)]
pub struct JsonReporter<W> {
    writer: W,
    settings: ReportSettings,
}

impl<W: Write> JsonReporter<W> {
    /// Creates a new JSON reporter writing to `writer`.
    pub fn new(writer: W, settings: ReportSettings) -> Self {
        Self { writer, settings }
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        let summary = run.to_summary(&self.settings);
        serde_json::to_writer_pretty(&mut self.writer, &summary).map_err(ReportError::Json)?;
        writeln!(self.writer).map_err(ReportError::Write)?;
        self.writer.flush().map_err(ReportError::Write)
    }
}

impl RunReport<'_> {
    /// Converts this report into a serializable summary.
    ///
    /// Captured output is included according to `settings`.
    pub fn to_summary(&self, settings: &ReportSettings) -> RunSummary {
        let mut summary = RunSummary::new(self.elapsed());
        for suite in self.suites() {
            summary.add_suite(suite_summary(suite, settings));
        }
        summary
    }
}

fn suite_summary(suite: &SuiteReport<'_>, settings: &ReportSettings) -> SuiteSummary {
    let stats = suite.statistics();
    SuiteSummary {
        name: suite.name().to_owned(),
        context: suite.context().to_owned(),
        mode: suite.mode().into(),
        timestamp: suite.timestamp().fixed_offset(),
        tests: stats.tests,
        failures: stats.failures,
        errors: stats.errors,
        elapsed: stats.elapsed,
        test_cases: suite
            .test_cases()
            .iter()
            .map(|case| case_summary(case, settings))
            .collect(),
    }
}

fn case_summary(case: &CaseReport<'_>, settings: &ReportSettings) -> TestCaseSummary {
    let include_output = settings.include_output(case.outcome());
    let output = |captured: &crate::outcome::CapturedOutput| {
        (include_output && !captured.is_empty()).then(|| captured.as_str_lossy().into_owned())
    };

    TestCaseSummary {
        name: case.name().to_owned(),
        outcome: case.kind().into(),
        reason: (!case.reason().is_empty()).then(|| case.reason().to_owned()),
        elapsed: case.duration(),
        stdout: output(case.stdout()),
        stderr: output(case.stderr()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_helpers::finished_runner;
    use casework_metadata::{ConcurrencyModeSummary, OutcomeSummary};
    use pretty_assertions::assert_eq;

    #[test]
    fn json_report_parses_back() {
        let runner = finished_runner();
        let mut reporter = JsonReporter::new(Vec::new(), ReportSettings::default());
        reporter.report(&runner.report().unwrap()).unwrap();

        let json = String::from_utf8(reporter.into_inner()).unwrap();
        let summary = RunSummary::parse_json(&json).expect("valid JSON summary");

        assert_eq!(summary.tests, 3);
        assert_eq!(summary.exit_signal(), 2);
        assert_eq!(summary.suites[0].mode, ConcurrencyModeSummary::Parallel);
        assert_eq!(summary.suites[1].mode, ConcurrencyModeSummary::Sequential);

        let cases = &summary.suites[0].test_cases;
        assert_eq!(cases[0].outcome, OutcomeSummary::Passed);
        assert_eq!(cases[0].reason, None);
        assert_eq!(cases[0].stdout, None);
        assert_eq!(cases[1].outcome, OutcomeSummary::Failed);
        assert_eq!(cases[1].stdout.as_deref(), Some("subtracting\n"));

        let errored = &summary.suites[1].test_cases[0];
        assert_eq!(errored.outcome, OutcomeSummary::Errored);
        assert_eq!(errored.reason.as_deref(), Some("file not found"));
        assert_eq!(errored.stdout, None);
        assert_eq!(errored.stderr.as_deref(), Some("opening\n"));
    }
}
