// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{borrow::Cow, fmt, panic::Location};
use thiserror::Error;

/// A predicate over an actual and an expected value.
pub trait Comparator<A: ?Sized, E: ?Sized = A> {
    /// Returns true if the comparison holds.
    fn holds(&self, actual: &A, expected: &E) -> bool;

    /// Describes what was expected, e.g. `to be equal to`.
    ///
    /// `negated` is true if the comparison is wrapped in [`Not`].
    fn expectation(&self, negated: bool) -> Cow<'static, str>;
}

impl<A: ?Sized, E: ?Sized, C: Comparator<A, E> + ?Sized> Comparator<A, E> for &C {
    fn holds(&self, actual: &A, expected: &E) -> bool {
        (**self).holds(actual, expected)
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        (**self).expectation(negated)
    }
}

/// Negates a comparator.
///
/// Also available as `!comparator` for the comparators in this module.
#[derive(Clone, Copy, Debug, Default)]
pub struct Not<C>(pub C);

impl<C> Not<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self(inner)
    }

    /// Returns the wrapped comparator.
    pub fn into_inner(self) -> C {
        self.0
    }
}

impl<A: ?Sized, E: ?Sized, C: Comparator<A, E>> Comparator<A, E> for Not<C> {
    fn holds(&self, actual: &A, expected: &E) -> bool {
        !self.0.holds(actual, expected)
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        self.0.expectation(!negated)
    }
}

impl<C> std::ops::Not for Not<C> {
    type Output = C;

    fn not(self) -> C {
        self.0
    }
}

macro_rules! impl_not {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::ops::Not for $ty {
                type Output = $crate::assertion::Not<$ty>;

                fn not(self) -> $crate::assertion::Not<$ty> {
                    $crate::assertion::Not(self)
                }
            }
        )*
    };
}

pub(super) use impl_not;

/// A violated assertion.
///
/// This is the only error a test body can return that classifies the test as failed rather than
/// errored.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{message} at {file}:{line}")]
pub struct AssertionFailure {
    message: String,
    file: &'static str,
    line: u32,
}

impl AssertionFailure {
    /// Creates a new failure located at the caller.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message, Location::caller())
    }

    /// Creates a new failure at the given location.
    pub fn at(message: impl Into<String>, location: &'static Location<'static>) -> Self {
        Self {
            message: message.into(),
            file: location.file(),
            line: location.line(),
        }
    }

    /// The failure message, without location.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source file containing the assertion.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// The line of the assertion.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Asserts that `comparator` holds for `actual` and `expected`.
///
/// On failure the message reads `Expected <actual> <expectation> <expected>`, followed by the
/// location of the call.
#[track_caller]
pub fn assert_that<A, E, C>(actual: &A, comparator: C, expected: &E) -> Result<(), AssertionFailure>
where
    A: fmt::Debug + ?Sized,
    E: fmt::Debug + ?Sized,
    C: Comparator<A, E>,
{
    if comparator.holds(actual, expected) {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Expected {actual:?} {} {expected:?}",
            comparator.expectation(false)
        )))
    }
}
