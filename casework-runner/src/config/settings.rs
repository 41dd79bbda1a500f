// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{TestThreads, WaveOrder};
use crate::{assertion::DEFAULT_FLOAT_EPSILON, outcome::TestOutcome};
use camino::Utf8PathBuf;

/// Settings that control how suites are executed.
///
/// Usually obtained from a [`CaseworkProfile`](super::CaseworkProfile). The `Default`
/// implementation matches the built-in default profile.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ExecutionSettings {
    /// Which wave of suites runs first.
    pub wave_order: WaveOrder,

    /// How many threads a parallel suite uses.
    pub test_threads: TestThreads,

    /// Whether parallel suites in a wave run concurrently with each other.
    pub suite_concurrency: bool,

    /// Settings passed to test bodies through their context.
    pub compare: CompareSettings,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            wave_order: WaveOrder::default(),
            test_threads: TestThreads::default(),
            suite_concurrency: true,
            compare: CompareSettings::default(),
        }
    }
}

/// Settings available to assertions inside test bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct CompareSettings {
    /// Relative tolerance for floating-point equality.
    pub float_epsilon: f64,
}

impl CompareSettings {
    /// Creates compare settings with the given epsilon.
    pub fn new(float_epsilon: f64) -> Self {
        Self { float_epsilon }
    }
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self::new(DEFAULT_FLOAT_EPSILON)
    }
}

/// Settings consumed by reporters.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ReportSettings {
    /// Whether to include captured output for passing test cases.
    pub capture_output: bool,

    /// The name of the report, used as the top-level element of JUnit reports.
    pub report_name: String,

    /// Where to write a JUnit report, if anywhere.
    pub junit_path: Option<Utf8PathBuf>,
}

impl ReportSettings {
    /// Returns true if captured output should be reported for a test case with this outcome.
    ///
    /// Output of failed and errored test cases is always reported.
    pub fn include_output(&self, outcome: &TestOutcome) -> bool {
        self.capture_output || !outcome.is_success()
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            capture_output: false,
            report_name: "casework".to_owned(),
            junit_path: None,
        }
    }
}
