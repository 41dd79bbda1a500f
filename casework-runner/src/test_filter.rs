// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selecting suites by name.

use crate::errors::SuiteFilterParseError;
use regex::{Regex, RegexSet};
use std::fmt;

/// Whether matching suites are kept or dropped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterMode {
    /// Keep only the suites matching at least one pattern.
    Include,

    /// Drop the suites matching any pattern.
    Exclude,
}

/// A filter over suite names.
///
/// Patterns match the whole suite name. `*` matches any sequence of characters, and every other
/// character matches itself. A filter with no patterns accepts every suite.
#[derive(Clone)]
pub struct SuiteFilter {
    mode: FilterMode,
    patterns: Vec<String>,
    set: RegexSet,
}

impl SuiteFilter {
    /// Creates a filter from include and exclude patterns.
    ///
    /// Include and exclude patterns are mutually exclusive.
    pub fn new<I, E>(include: I, exclude: E) -> Result<Self, SuiteFilterParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include: Vec<String> = include.into_iter().map(|p| p.as_ref().to_owned()).collect();
        let exclude: Vec<String> = exclude.into_iter().map(|p| p.as_ref().to_owned()).collect();
        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => Err(SuiteFilterParseError::MixedModes),
            (false, true) => Self::from_patterns(FilterMode::Include, include),
            (true, _) => Self::from_patterns(FilterMode::Exclude, exclude),
        }
    }

    /// Creates a filter from patterns of a single mode.
    pub fn from_patterns(
        mode: FilterMode,
        patterns: Vec<String>,
    ) -> Result<Self, SuiteFilterParseError> {
        let regexes = patterns
            .iter()
            .map(|pattern| {
                let regex = pattern_to_regex(pattern);
                // Validate each pattern on its own so the error names the offending one.
                Regex::new(&regex).map_err(|err| SuiteFilterParseError::InvalidPattern {
                    pattern: pattern.clone(),
                    err,
                })?;
                Ok(regex)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let set = RegexSet::new(&regexes).map_err(|err| SuiteFilterParseError::InvalidPattern {
            pattern: patterns.join(", "),
            err,
        })?;

        Ok(Self {
            mode,
            patterns,
            set,
        })
    }

    /// The mode of this filter.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// The patterns of this filter, as given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the suite named `name` should run.
    pub fn is_match(&self, name: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        match self.mode {
            FilterMode::Include => self.set.is_match(name),
            FilterMode::Exclude => !self.set.is_match(name),
        }
    }
}

impl Default for SuiteFilter {
    fn default() -> Self {
        Self {
            mode: FilterMode::Exclude,
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }
}

impl fmt::Debug for SuiteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteFilter")
            .field("mode", &self.mode)
            .field("patterns", &self.patterns)
            .finish()
    }
}

fn pattern_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{body}$")
}
