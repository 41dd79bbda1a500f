// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line harness for casework.
//!
//! A program that authors [`TestSuite`](casework_runner::test_suite::TestSuite)s parses a
//! [`CaseworkApp`] from its arguments and hands the suites to [`CaseworkApp::exec`]. The harness
//! reads the casework config, applies suite filters, runs every wave, writes the requested report
//! and maps the result to a documented exit code (see
//! [`CaseworkExitCode`](casework_metadata::CaseworkExitCode)).

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use output::{Color, OutputContext, OutputWriter, StderrStyles};
