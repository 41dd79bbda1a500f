// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8Path;
use casework_metadata::CaseworkExitCode;
use casework_runner::errors::*;
use owo_colors::OwoColorize;
use std::{error::Error, io, path::PathBuf};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure of a harness run: bad input, failing tests or an unwritable report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine the current directory")]
    CurrentDirFailed {
        #[source]
        error: io::Error,
    },
    #[error("config root is not valid UTF-8")]
    RootInvalidUtf8 { path: PathBuf },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("profile not found")]
    ProfileNotFound {
        #[from]
        err: ProfileNotFound,
    },
    #[error("suite filter parse error")]
    SuiteFilterParseError {
        #[from]
        err: SuiteFilterParseError,
    },
    #[error("usage error")]
    UsageError {
        #[from]
        err: UsageError,
    },
    #[error("error writing report")]
    ReportError {
        #[from]
        err: ReportError,
    },
    #[error("test run failed")]
    TestRunFailed { failed: usize },
}

impl ExpectedError {
    pub(crate) fn root_invalid_utf8(path: PathBuf) -> Self {
        Self::RootInvalidUtf8 { path }
    }

    pub(crate) fn report_file(path: &Utf8Path, error: io::Error) -> Self {
        Self::ReportError {
            err: ReportError::Fs {
                file: path.to_owned(),
                error,
            },
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::RootInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::ProfileNotFound { .. }
            | Self::SuiteFilterParseError { .. } => CaseworkExitCode::SETUP_ERROR,
            Self::UsageError { .. } => CaseworkExitCode::USAGE_ERROR,
            Self::ReportError { .. } => CaseworkExitCode::WRITE_OUTPUT_ERROR,
            Self::TestRunFailed { .. } => CaseworkExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { error } => {
                error!("could not determine the current directory");
                Some(error as &dyn Error)
            }
            Self::RootInvalidUtf8 { path } => {
                error!(
                    "config root `{}` is not valid UTF-8",
                    path.display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse casework config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::ProfileNotFound { err } => {
                error!("{err}");
                err.source()
            }
            Self::SuiteFilterParseError { err } => {
                error!("{err}");
                err.source()
            }
            Self::UsageError { err } => {
                error!("harness used incorrectly: {err}");
                None
            }
            Self::ReportError { err } => {
                // Printed as a single event, including the cause chain.
                error!("{}", DisplayErrorChain::new(err));
                None
            }
            Self::TestRunFailed { failed } => {
                error!(
                    "test run failed: {} {} did not pass",
                    failed.style(styles.bold),
                    if *failed == 1 { "test" } else { "tests" },
                );
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {err}");
            next_error = err.source();
        }
    }
}
