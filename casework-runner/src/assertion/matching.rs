// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::comparator::{Comparator, impl_not};
use regex::Regex;
use std::borrow::Cow;

/// Checks that a string contains a substring.
#[derive(Clone, Copy, Debug, Default)]
pub struct Contains;

impl<A: AsRef<str> + ?Sized> Comparator<A, str> for Contains {
    fn holds(&self, actual: &A, expected: &str) -> bool {
        actual.as_ref().contains(expected)
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to not contain".into()
        } else {
            "to contain".into()
        }
    }
}

/// Checks that a regular expression matches the whole string.
#[derive(Clone, Copy, Debug, Default)]
pub struct Matches;

impl<A: AsRef<str> + ?Sized> Comparator<A, Regex> for Matches {
    fn holds(&self, actual: &A, expected: &Regex) -> bool {
        let actual = actual.as_ref();
        // Leftmost-first search can report a shorter match even when a full match exists, so
        // anchor the pattern instead of comparing match bounds.
        match Regex::new(&format!("^(?:{})$", expected.as_str())) {
            Ok(anchored) => anchored.is_match(actual),
            Err(_) => false,
        }
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to not match".into()
        } else {
            "to match".into()
        }
    }
}

/// Checks that a regular expression matches somewhere in the string.
#[derive(Clone, Copy, Debug, Default)]
pub struct Like;

impl<A: AsRef<str> + ?Sized> Comparator<A, Regex> for Like {
    fn holds(&self, actual: &A, expected: &Regex) -> bool {
        expected.is_match(actual.as_ref())
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to be not like".into()
        } else {
            "to be like".into()
        }
    }
}

impl_not!(Contains, Matches, Like);
