// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for casework harness failures.
///
/// Harness runs may fail for a variety of reasons. This structure documents the exit codes that
/// may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum CaseworkExitCode {}

impl CaseworkExitCode {
    /// No errors occurred and every test passed.
    pub const OK: i32 = 0;

    /// One or more tests failed or errored.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// Writing the report produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up the run, such as an invalid config file or filter.
    pub const SETUP_ERROR: i32 = 96;

    /// The harness was used incorrectly by the program embedding it.
    pub const USAGE_ERROR: i32 = 97;
}
