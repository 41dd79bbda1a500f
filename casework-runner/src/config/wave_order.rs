// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::WaveOrderParseError, runner::Wave};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// The order in which [`Runner::run_all`](crate::runner::Runner::run_all) runs the two waves of
/// suites.
///
/// Both orders reach the same final state.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum WaveOrder {
    /// Run parallel suites first, then sequential suites.
    #[default]
    ParallelFirst,

    /// Run sequential suites first, then parallel suites.
    SequentialFirst,
}

impl WaveOrder {
    /// Returns the string representations of all variants.
    pub fn variants() -> &'static [&'static str] {
        &["parallel-first", "sequential-first"]
    }

    /// Returns the waves in the order they should run.
    pub fn waves(self) -> [Wave; 2] {
        match self {
            WaveOrder::ParallelFirst => [Wave::Parallel, Wave::Sequential],
            WaveOrder::SequentialFirst => [Wave::Sequential, Wave::Parallel],
        }
    }
}

impl FromStr for WaveOrder {
    type Err = WaveOrderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallel-first" => Ok(WaveOrder::ParallelFirst),
            "sequential-first" => Ok(WaveOrder::SequentialFirst),
            other => Err(WaveOrderParseError::new(other)),
        }
    }
}

impl fmt::Display for WaveOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveOrder::ParallelFirst => write!(f, "parallel-first"),
            WaveOrder::SequentialFirst => write!(f, "sequential-first"),
        }
    }
}
