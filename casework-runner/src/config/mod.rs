// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for casework.
//!
//! Settings are read from an embedded default configuration, optionally layered under a user
//! configuration file. A [profile](CaseworkProfile) resolves to the plain
//! [`ExecutionSettings`] and [`ReportSettings`] values that the runner and reporters consume.

mod config_impl;
mod settings;
mod test_threads;
mod wave_order;

#[cfg(test)]
mod test_helpers;

pub use config_impl::*;
pub use settings::*;
pub use test_threads::*;
pub use wave_order::*;
