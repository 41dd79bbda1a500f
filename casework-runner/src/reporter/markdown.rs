// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown output, suitable for CI job summaries and pull request comments.

use super::{CaseReport, Reporter, RunReport, SuiteReport};
use crate::{config::ReportSettings, errors::ReportError, outcome::CapturedOutput};
use std::{borrow::Cow, io::Write, time::Duration};
use swrite::{SWrite, swrite};

/// Writes a Markdown report: a table of test cases per suite, followed by a summary line.
///
/// ```text
/// ## math (Calculator, parallel)
///
/// | Test | Outcome | Duration | Reason |
/// | --- | --- | ---: | --- |
/// | adds | PASS | 0.001s | |
/// | subtracts | FAIL | 0.000s | Expected 2 to be equal to 1 at src/math.rs:12 |
/// ```
#[derive(Debug)]
pub struct MarkdownReporter<W> {
    writer: W,
    settings: ReportSettings,
}

impl<W: Write> MarkdownReporter<W> {
    /// Creates a new Markdown reporter writing to `writer`.
    pub fn new(writer: W, settings: ReportSettings) -> Self {
        Self { writer, settings }
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_run(&mut self, run: &RunReport<'_>) -> std::io::Result<()> {
        writeln!(self.writer, "# {}", escape(&self.settings.report_name))?;
        for suite in run.suites() {
            writeln!(self.writer)?;
            self.write_suite(suite)?;
        }

        let stats = run.statistics();
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "**Summary:** {} {} run in {}: {}",
            stats.tests,
            if stats.tests == 1 { "test" } else { "tests" },
            DisplaySeconds(run.elapsed()),
            counts_str(stats.passed(), stats.failures, stats.errors),
        )
    }

    fn write_suite(&mut self, suite: &SuiteReport<'_>) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "## {} ({}, {})",
            escape(suite.name()),
            escape(suite.context()),
            suite.mode(),
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Test | Outcome | Duration | Reason |")?;
        writeln!(self.writer, "| --- | --- | ---: | --- |")?;
        for case in suite.test_cases() {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                escape(case.name()),
                case.kind(),
                DisplaySeconds(case.duration()),
                escape(case.reason()),
            )?;
        }

        let stats = suite.statistics();
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} {} in {}: {}",
            stats.tests,
            if stats.tests == 1 { "test" } else { "tests" },
            DisplaySeconds(stats.elapsed),
            counts_str(stats.passed(), stats.failures, stats.errors),
        )?;

        for case in suite.test_cases() {
            if self.settings.include_output(case.outcome()) {
                self.write_output("stdout", case, case.stdout())?;
                self.write_output("stderr", case, case.stderr())?;
            }
        }
        Ok(())
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

        let output = output.as_str_lossy();
        // The fence must be longer than any backtick run in the output.
        let fence = "`".repeat(longest_backtick_run(&output).max(2) + 1);
        writeln!(self.writer)?;
        writeln!(self.writer, "{header} of `{}`:", case.name().replace('`', "'"))?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{fence}text")?;
        write!(self.writer, "{output}")?;
        if !output.ends_with('\n') {
            writeln!(self.writer)?;
        }
        writeln!(self.writer, "{fence}")
    }
}

impl<W: Write> Reporter for MarkdownReporter<W> {
    fn report(&mut self, run: &RunReport<'_>) -> Result<(), ReportError> {
        self.write_run(run).map_err(ReportError::Write)?;
        self.writer.flush().map_err(ReportError::Write)
    }
}

struct DisplaySeconds(Duration);

impl std::fmt::Display for DisplaySeconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

fn counts_str(passed: usize, failed: usize, errored: usize) -> String {
    let mut out = format!("{passed} passed");
    if failed > 0 {
        swrite!(out, ", {failed} failed");
    }
    if errored > 0 {
        swrite!(out, ", {errored} errored");
    }
    out
}

/// Escapes text for use inside a table cell or heading.
///
/// Table cells cannot span lines, so line breaks become `<br>`.
fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['|', '<', '>', '&', '\n', '\r']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        for c in line.chars() {
            match c {
                '|' => out.push_str("\\|"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '&' => out.push_str("&amp;"),
                c => out.push(c),
            }
        }
        if lines.peek().is_some() {
            out.push_str("<br>");
        }
    }
    Cow::Owned(out)
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}
