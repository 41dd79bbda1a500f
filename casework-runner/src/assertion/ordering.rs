// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::comparator::{Comparator, impl_not};
use std::{borrow::Cow, ops::RangeInclusive};

/// Checks that the actual value is strictly greater than the expected value.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreaterThan;

impl<A: PartialOrd<E> + ?Sized, E: ?Sized> Comparator<A, E> for GreaterThan {
    fn holds(&self, actual: &A, expected: &E) -> bool {
        actual > expected
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to be not greater than".into()
        } else {
            "to be greater than".into()
        }
    }
}

/// Checks that the actual value is strictly less than the expected value.
#[derive(Clone, Copy, Debug, Default)]
pub struct LessThan;

impl<A: PartialOrd<E> + ?Sized, E: ?Sized> Comparator<A, E> for LessThan {
    fn holds(&self, actual: &A, expected: &E) -> bool {
        actual < expected
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to be not less than".into()
        } else {
            "to be less than".into()
        }
    }
}

/// Checks that the actual value lies within an inclusive range.
#[derive(Clone, Copy, Debug, Default)]
pub struct InRange;

impl<T: PartialOrd> Comparator<T, RangeInclusive<T>> for InRange {
    fn holds(&self, actual: &T, expected: &RangeInclusive<T>) -> bool {
        expected.contains(actual)
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to be not in range".into()
        } else {
            "to be in range".into()
        }
    }
}

impl_not!(GreaterThan, LessThan, InRange);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::assert_that;

    #[test]
    fn ordering() {
        assert_that(&3, GreaterThan, &2).unwrap();
        assert_that(&2, !GreaterThan, &2).unwrap();
        assert_that(&1.5, LessThan, &2.0).unwrap();
        assert_that("abc", LessThan, "abd").unwrap();

        let failure = assert_that(&3, LessThan, &2).unwrap_err();
        assert_eq!(failure.message(), "Expected 3 to be less than 2");
    }

    #[test]
    fn in_range() {
        assert_that(&5, InRange, &(1..=5)).unwrap();
        assert_that(&0, !InRange, &(1..=5)).unwrap();

        let failure = assert_that(&6, InRange, &(1..=5)).unwrap_err();
        assert_eq!(failure.message(), "Expected 6 to be in range 1..=5");
    }
}
