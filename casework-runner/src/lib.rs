// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for casework.
//!
//! The basic flow of operations is:
//!
//! 1. Test code is authored into [`TestSuite`](test_suite::TestSuite)s, each of which runs its
//!    [`TestCase`](test_case::TestCase)s either sequentially or concurrently.
//! 2. Suites are registered into a [`Runner`](runner::Runner), which executes them in two waves
//!    (parallel-mode suites and sequential-mode suites).
//! 3. Once every wave has run, the runner hands out a read-only
//!    [`RunReport`](reporter::RunReport) that [`Reporter`](reporter::Reporter)s render.

pub mod assertion;
pub mod capture;
pub mod config;
pub mod errors;
pub mod outcome;
pub mod reporter;
pub mod runner;
pub mod stats;
pub mod test_case;
pub mod test_filter;
pub mod test_suite;
mod time;
