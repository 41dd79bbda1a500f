// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by casework.

use crate::{
    config::WaveOrder,
    runner::{ExecutionStatus, Wave},
};
use camino::Utf8PathBuf;
use config::ConfigError;
use std::{error, fmt, io};
use thiserror::Error;

/// A precondition of the core was violated by the caller.
///
/// Usage errors are programming mistakes: reading results before every suite has run, running a
/// suite or test case twice, or modifying the runner after execution has begun. They are never
/// produced by a test failing.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum UsageError {
    /// A test case was executed a second time.
    #[error("test case `{test_case}` has already been executed")]
    TestCaseAlreadyExecuted {
        /// The name of the test case.
        test_case: String,
    },

    /// The outcome of a test case was requested before it was executed.
    #[error("test case `{test_case}` has not been executed yet")]
    TestCaseNotExecuted {
        /// The name of the test case.
        test_case: String,
    },

    /// A suite was run a second time.
    #[error("test suite `{suite}` has already been run")]
    SuiteAlreadyRun {
        /// The name of the suite.
        suite: String,
    },

    /// Statistics for a suite were requested before it was run.
    #[error("test suite `{suite}` has not been run yet")]
    SuiteNotRun {
        /// The name of the suite.
        suite: String,
    },

    /// A wave of suites was run a second time.
    #[error("the {wave} wave has already been run")]
    WaveAlreadyRun {
        /// The wave that was requested.
        wave: Wave,
    },

    /// Every wave has already been run.
    #[error("all test suites have already been executed")]
    AllWavesRun,

    /// Results were requested before every suite was executed.
    #[error(
        "test suites not yet executed: results require execution status {}, but it is {status}",
        ExecutionStatus::All
    )]
    NotExecuted {
        /// The execution status at the time of the request.
        status: ExecutionStatus,
    },

    /// Suites were registered or filtered after execution began.
    #[error("test suites cannot be registered or filtered once execution has started")]
    ExecutionStarted,
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse casework config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error which indicates that a profile was requested but not known to casework.
#[derive(Clone, Debug, Error)]
#[error("profile `{profile}` not found (known profiles: {})", .all_profiles.join(", "))]
pub struct ProfileNotFound {
    profile: String,
    all_profiles: Vec<String>,
}

impl ProfileNotFound {
    pub(crate) fn new(
        profile: impl Into<String>,
        all_profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut all_profiles: Vec<_> = all_profiles.into_iter().map(|s| s.into()).collect();
        all_profiles.sort_unstable();
        Self {
            profile: profile.into(),
            all_profiles,
        }
    }
}

/// An error that occurs while parsing a
/// [`TestThreads`](crate::config::TestThreads) value from a string.
#[derive(Clone, Debug, Error)]
#[error("unrecognized value for test-threads: {input}\n(expected a positive integer or `per-test`)")]
pub struct TestThreadsParseError {
    input: String,
}

impl TestThreadsParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurs while parsing a [`WaveOrder`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for wave-order: {input}\n(known values: {})",
    WaveOrder::variants().join(", "),
)]
pub struct WaveOrderParseError {
    input: String,
}

impl WaveOrderParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurs while building a [`SuiteFilter`](crate::test_filter::SuiteFilter).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SuiteFilterParseError {
    /// A pattern could not be compiled.
    #[error("`{pattern}` is not a valid suite pattern")]
    InvalidPattern {
        /// The pattern as provided.
        pattern: String,

        /// The underlying error.
        #[source]
        err: regex::Error,
    },

    /// Both include and exclude patterns were specified.
    #[error("include and exclude patterns are mutually exclusive")]
    MixedModes,
}

/// An error that occurred while writing a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// An error occurred while writing to the output stream.
    #[error("error writing report output")]
    Write(#[source] io::Error),

    /// An error occurred while creating or writing a report file.
    #[error("error writing report to `{file}`")]
    Fs {
        /// The file being written.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An error occurred while serializing a JUnit report.
    #[error("error serializing JUnit report")]
    Junit(#[source] quick_junit::SerializeError),

    /// An error occurred while serializing a JSON summary.
    #[error("error serializing JSON summary")]
    Json(#[source] serde_json::Error),
}

/// Displays an error along with its chain of causes.
///
/// ```text
/// error writing report to `out/junit.xml`
///   caused by:
///   - permission denied
/// ```
#[derive(Clone, Debug)]
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain` for the given error.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        if source.is_some() {
            write!(f, "\n  caused by:")?;
        }
        while let Some(err) = source {
            write!(f, "\n  - {err}")?;
            source = err.source();
        }

        Ok(())
    }
}
