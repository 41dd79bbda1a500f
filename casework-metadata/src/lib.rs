// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable output for casework.
//!
//! Casework harnesses can emit a JSON summary of a finished run. This crate contains the data
//! model for that summary, along with the documented exit codes.

mod exit_codes;
mod summary;

pub use exit_codes::*;
pub use summary::*;
