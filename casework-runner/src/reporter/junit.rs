// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to generate JUnit XML reports from finished runs.

use super::{CaseReport, Reporter, RunReport, SuiteReport};
use crate::{
    config::ReportSettings,
    errors::ReportError,
    outcome::OutcomeKind,
};
use camino::Utf8Path;
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// Writes a JUnit XML report.
#[derive(Debug)]
pub struct JunitReporter<W> {
    writer: W,
    settings: ReportSettings,
}

impl<W: Write> JunitReporter<W> {
    /// Creates a new JUnit reporter writing to `writer`.
    pub fn new(writer: W, settings: ReportSettings) -> Self {
        Self { writer, settings }
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JunitReporter<BufWriter<File>> {
    /// Creates a JUnit reporter writing to the file at `path`, creating parent directories as
    /// needed.
    pub fn create(path: &Utf8Path, settings: ReportSettings) -> Result<Self, ReportError> {
        if let Some(junit_dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
            std::fs::create_dir_all(junit_dir).map_err(|error| ReportError::Fs {
                file: junit_dir.to_path_buf(),
                error,
            })?;
        }

        let f = File::create(path).map_err(|error| ReportError::Fs {
            file: path.to_path_buf(),
            error,
        })?;
        Ok(Self::new(BufWriter::new(f), settings))
    }
}

impl<W: Write> Reporter for JunitReporter<W> {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        let report = junit_report(run, &self.settings);
        report
            .serialize(&mut self.writer)
            .map_err(ReportError::Junit)?;
        self.writer.flush().map_err(ReportError::Write)
    }
}

/// Builds a JUnit report for a finished run.
///
/// Failed test cases are reported as failures and errored test cases as errors.
pub fn junit_report(run: &RunReport<'_>, settings: &ReportSettings) -> Report {
    let mut report = Report::new(settings.report_name.as_str());
    report
        .set_timestamp(run.start_time())
        .set_time(run.elapsed())
        .add_test_suites(run.suites().iter().map(|suite| junit_suite(suite, settings)));
    report
}

fn junit_suite(suite: &SuiteReport<'_>, settings: &ReportSettings) -> TestSuite {
    let mode = suite.mode().to_string();
    let mut test_suite = TestSuite::new(suite.name());
    test_suite
        .set_timestamp(suite.timestamp())
        .set_time(suite.statistics().elapsed)
        .add_property(("context", suite.context()))
        .add_property(("mode", mode.as_str()));
    for case in suite.test_cases() {
        test_suite.add_test_case(junit_case(case, suite.context(), settings));
    }
    test_suite
}

fn junit_case(case: &CaseReport<'_>, classname: &str, settings: &ReportSettings) -> TestCase {
    let status = match case.kind() {
        OutcomeKind::Passed => TestCaseStatus::success(),
        OutcomeKind::Failed => non_success(NonSuccessKind::Failure, "assertion failure", case),
        OutcomeKind::Errored => non_success(NonSuccessKind::Error, "unexpected error", case),
    };

    let mut testcase = TestCase::new(case.name(), status);
    testcase
        .set_classname(classname)
        .set_timestamp(case.outcome().start_time())
        .set_time(case.duration());
    if settings.include_output(case.outcome()) {
        if !case.stdout().is_empty() {
            testcase.set_system_out(case.stdout().as_str_lossy());
        }
        if !case.stderr().is_empty() {
            testcase.set_system_err(case.stderr().as_str_lossy());
        }
    }
    testcase
}

fn non_success(kind: NonSuccessKind, ty: &str, case: &CaseReport<'_>) -> TestCaseStatus {
    let mut status = TestCaseStatus::non_success(kind);
    status
        .set_type(ty)
        .set_message(short_message(case.reason()))
        .set_description(case.reason());
    status
}

// The message attribute is a single line; the full reason goes into the description.
fn short_message(reason: &str) -> &str {
    reason.lines().next().unwrap_or_default()
}
