// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable console output.

use super::{CaseReport, Reporter, RunReport, SuiteReport};
use crate::{
    config::ReportSettings,
    errors::ReportError,
    outcome::{CapturedOutput, OutcomeKind},
};
use owo_colors::{OwoColorize, Style};
use std::{fmt, io::Write, time::Duration};
use swrite::{SWrite, swrite};

/// Writes a human-readable report, one status line per test case followed by a summary.
///
/// ```text
///     Starting 3 tests across 2 suites
///        SUITE math (Calculator, parallel)
///         PASS [   0.001s] math adds
///         FAIL [   0.000s] math subtracts
/// ```
pub struct ConsoleReporter<W> {
    writer: W,
    settings: ReportSettings,
    styles: Box<Styles>,
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a new console reporter writing to `writer`.
    pub fn new(writer: W, settings: ReportSettings) -> Self {
        Self {
            writer,
            settings,
            styles: Box::default(),
        }
    }

    /// Uses ANSI colors in the output.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_run(&mut self, run: &RunReport<'_>) -> std::io::Result<()> {
        let stats = run.statistics();
        writeln!(
            self.writer,
            "{:>12} {} {} across {} {}",
            "Starting".style(self.styles.pass),
            stats.tests.style(self.styles.count),
            tests_str(stats.tests),
            stats.suites.style(self.styles.count),
            suites_str(stats.suites),
        )?;

        for suite in run.suites() {
            self.write_suite(suite)?;
        }

        let failing: Vec<_> = run
            .suites()
            .iter()
            .flat_map(|suite| suite.test_cases())
            .filter(|case| !case.outcome().is_success())
            .collect();

        writeln!(self.writer, "{}", "-".repeat(12))?;
        let summary_style = if failing.is_empty() {
            self.styles.pass
        } else {
            self.styles.fail
        };
        writeln!(
            self.writer,
            "{:>12} {}{} {} run: {}",
            "Summary".style(summary_style),
            DisplayBracketedDuration(run.elapsed()),
            stats.tests.style(self.styles.count),
            tests_str(stats.tests),
            summary_str(stats.passed(), stats.failures, stats.errors, &self.styles),
        )?;

        for case in failing {
            self.write_status_line(case)?;
        }

        Ok(())
    }

    fn write_suite(&mut self, suite: &SuiteReport<'_>) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{:>12} {} ({}, {})",
            "SUITE".style(self.styles.suite),
            suite.name().style(self.styles.suite),
            suite.context(),
            suite.mode(),
        )?;

        for case in suite.test_cases() {
            self.write_status_line(case)?;
            if !case.outcome().is_success() {
                writeln!(self.writer, "{:>12} {}", "", case.reason())?;
            }
            if self.settings.include_output(case.outcome()) {
                self.write_output("STDOUT", case, case.stdout())?;
                self.write_output("STDERR", case, case.stderr())?;
            }
        }

        let stats = suite.statistics();
        writeln!(
            self.writer,
            "{:>12} {}{} {} in {}: {}",
            "",
            DisplayBracketedDuration(stats.elapsed),
            stats.tests.style(self.styles.count),
            tests_str(stats.tests),
            suite.name().style(self.styles.suite),
            summary_str(stats.passed(), stats.failures, stats.errors, &self.styles),
        )?;
        Ok(())
    }

    fn write_status_line(&mut self, case: &CaseReport<'_>) -> std::io::Result<()> {
        let style = self.styles.for_kind(case.kind());
        writeln!(
            self.writer,
            "{:>12} {}{} {}",
            case.kind().style(style),
            DisplayBracketedDuration(case.duration()),
            case.suite_name().style(self.styles.suite),
            case.name(),
        )
    }

    fn write_output(
        &mut self,
        header: &str,
        case: &CaseReport<'_>,
        output: &CapturedOutput,
    ) -> std::io::Result<()> {
        if output.is_empty() {
            return Ok(());
        }

        let style = self.styles.for_kind(case.kind());
        let header = format!("--- {header}: {} {} ---", case.suite_name(), case.name());
        writeln!(self.writer, "{}", header.style(style))?;
        let output = output.as_str_lossy();
        write!(self.writer, "{output}")?;
        if !output.ends_with('\n') {
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        self.write_run(run).map_err(ReportError::Write)?;
        self.writer.flush().map_err(ReportError::Write)
    }
}

impl<W> fmt::Debug for ConsoleReporter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("settings", &self.settings)
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Styles {
    count: Style,
    pass: Style,
    fail: Style,
    error: Style,
    suite: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.error = Style::new().magenta().bold();
        self.suite = Style::new().blue().bold();
    }

    fn for_kind(&self, kind: OutcomeKind) -> Style {
        match kind {
            OutcomeKind::Passed => self.pass,
            OutcomeKind::Failed => self.fail,
            OutcomeKind::Errored => self.error,
        }
    }
}

struct DisplayBracketedDuration(Duration);

impl fmt::Display for DisplayBracketedDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // * > means right-align.
        // * 8 is the number of characters to pad to.
        // * .3 means print three digits after the decimal point.
        write!(f, "[{:>8.3?}s] ", self.0.as_secs_f64())
    }
}

fn summary_str(passed: usize, failed: usize, errored: usize, styles: &Styles) -> String {
    let mut out = String::new();
    swrite!(
        out,
        "{} {}",
        passed.style(styles.count),
        "passed".style(styles.pass)
    );
    if failed > 0 {
        swrite!(
            out,
            ", {} {}",
            failed.style(styles.count),
            "failed".style(styles.fail)
        );
    }
    if errored > 0 {
        swrite!(
            out,
            ", {} {}",
            errored.style(styles.count),
            "errored".style(styles.error)
        );
    }
    out
}

fn tests_str(count: usize) -> &'static str {
    if count == 1 { "test" } else { "tests" }
}

fn suites_str(count: usize) -> &'static str {
    if count == 1 { "suite" } else { "suites" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_helpers::finished_runner;
    use regex::Regex;

    fn render(settings: ReportSettings) -> String {
        let runner = finished_runner();
        let mut reporter = ConsoleReporter::new(Vec::new(), settings);
        reporter.report(&runner.report().unwrap()).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    // Durations vary from run to run.
    fn normalize(output: &str) -> String {
        let duration = Regex::new(r"\[ *[0-9.]+s\]").unwrap();
        duration.replace_all(output, "[DURATION]").into_owned()
    }

    #[test]
    fn console_report() {
        let output = normalize(&render(ReportSettings::default()));
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "    Starting 3 tests across 2 suites");
        assert_eq!(lines[1], "       SUITE math (Calculator, parallel)");
        assert_eq!(lines[2], "        PASS [DURATION] math adds");
        assert_eq!(lines[3], "        FAIL [DURATION] math subtracts");
        assert!(
            lines[4].starts_with("             Expected 2 to be equal to 1 at "),
            "line: {}",
            lines[4]
        );
        assert_eq!(lines[5], "--- STDOUT: math subtracts ---");
        assert_eq!(lines[6], "subtracting");
        assert_eq!(
            lines[7],
            "             [DURATION] 2 tests in math: 1 passed, 1 failed"
        );
        assert_eq!(lines[8], "       SUITE io (main, sequential)");
        assert_eq!(lines[9], "       ERROR [DURATION] io opens <file>");
        assert_eq!(lines[10], "             file not found");
        assert_eq!(lines[11], "--- STDERR: io opens <file> ---");
        assert_eq!(lines[12], "opening");

        let summary_index = lines
            .iter()
            .position(|line| line.starts_with("     Summary"))
            .expect("summary line present");
        assert_eq!(
            lines[summary_index],
            "     Summary [DURATION] 3 tests run: 1 passed, 1 failed, 1 errored"
        );
        assert_eq!(
            &lines[summary_index + 1..],
            [
                "        FAIL [DURATION] math subtracts",
                "       ERROR [DURATION] io opens <file>",
            ]
        );
    }

    #[test]
    fn capture_output_includes_passing_tests() {
        let mut settings = ReportSettings::default();
        settings.capture_output = true;
        let output = render(settings);
        assert!(output.contains("--- STDOUT: math adds ---\nadding\n"));
    }

    #[test]
    fn colorized_output_contains_ansi_codes() {
        let runner = finished_runner();
        let mut reporter = ConsoleReporter::new(Vec::new(), ReportSettings::default());
        reporter.colorize();
        reporter.report(&runner.report().unwrap()).unwrap();
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("\u{1b}["));
    }
}
