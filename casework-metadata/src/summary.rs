// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root element for a serializable summary of a finished run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct RunSummary {
    /// The number of tests that were run.
    pub tests: usize,

    /// The number of tests that failed an assertion.
    pub failures: usize,

    /// The number of tests that errored out.
    pub errors: usize,

    /// The total wall-clock time spent executing suites.
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,

    /// The suites in this run, in registration order.
    pub suites: Vec<SuiteSummary>,
}

impl RunSummary {
    /// Creates a new run summary with no suites.
    pub fn new(elapsed: Duration) -> Self {
        Self {
            tests: 0,
            failures: 0,
            errors: 0,
            elapsed,
            suites: Vec::new(),
        }
    }

    /// Adds a suite to this summary, updating the run-wide counts.
    pub fn add_suite(&mut self, suite: SuiteSummary) -> &mut Self {
        self.tests += suite.tests;
        self.failures += suite.failures;
        self.errors += suite.errors;
        self.suites.push(suite);
        self
    }

    /// Parses a summary from JSON.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json.as_ref())
    }

    /// The number of tests that did not pass. A value of zero means the run was successful.
    pub fn exit_signal(&self) -> usize {
        self.failures + self.errors
    }
}

/// A serializable summary of a single suite.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuiteSummary {
    /// The name of the suite.
    pub name: String,

    /// The context under test, e.g. the name of a type.
    pub context: String,

    /// How the tests in this suite were executed.
    pub mode: ConcurrencyModeSummary,

    /// The time at which the suite started running.
    pub timestamp: DateTime<FixedOffset>,

    /// The number of tests in the suite.
    pub tests: usize,

    /// The number of tests that failed an assertion.
    pub failures: usize,

    /// The number of tests that errored out.
    pub errors: usize,

    /// Wall-clock time taken by the suite.
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,

    /// The tests in this suite, in declaration order.
    pub test_cases: Vec<TestCaseSummary>,
}

/// A serializable summary of a single test.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCaseSummary {
    /// The name of the test.
    pub name: String,

    /// The outcome of the test.
    pub outcome: OutcomeSummary,

    /// Why the test did not pass. `None` for passing tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Time taken by the test, including its hooks.
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,

    /// Captured standard output, if the harness was asked to keep it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    /// Captured standard error, if the harness was asked to keep it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// The outcome of a test, as serialized.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeSummary {
    /// The test passed.
    Passed,

    /// The test failed an assertion.
    Failed,

    /// The test, or one of its hooks, raised an unexpected error.
    Errored,
}

/// The concurrency mode of a suite, as serialized.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyModeSummary {
    /// Tests ran one after the other, in declaration order.
    Sequential,

    /// Tests ran concurrently.
    Parallel,
}
