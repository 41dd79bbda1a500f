// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{AssertionFailure, Equals, assert_that};
use crate::capture::catch_panic;
use std::{fmt, panic::Location, time::Duration};

/// Asserts that `actual == expected`.
#[track_caller]
pub fn assert_equals<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: PartialEq<E> + fmt::Debug + ?Sized,
    E: fmt::Debug + ?Sized,
{
    assert_that(actual, Equals, expected)
}

/// Asserts that `value` is true.
#[track_caller]
pub fn assert_true(value: bool) -> Result<(), AssertionFailure> {
    assert_that(&value, Equals, &true)
}

/// Asserts that `value` is false.
#[track_caller]
pub fn assert_false(value: bool) -> Result<(), AssertionFailure> {
    assert_that(&value, Equals, &false)
}

/// Asserts that `f` panics.
#[track_caller]
pub fn assert_panics<T>(f: impl FnOnce() -> T) -> Result<(), AssertionFailure> {
    let location = Location::caller();
    match catch_panic(f) {
        Ok(_) => Err(AssertionFailure::at("Expected a panic, but none occurred", location)),
        Err(_) => Ok(()),
    }
}

/// Asserts that `f` does not panic, returning its result.
#[track_caller]
pub fn assert_no_panic<T>(f: impl FnOnce() -> T) -> Result<T, AssertionFailure> {
    let location = Location::caller();
    catch_panic(f)
        .map_err(|panic| AssertionFailure::at(format!("Expected no panic, but {panic}"), location))
}

/// Asserts that `f` finishes within `max`, returning its result.
///
/// `f` is never interrupted: a slow closure runs to completion and only then is the assertion
/// failed.
#[track_caller]
pub fn assert_runtime<T>(max: Duration, f: impl FnOnce() -> T) -> Result<T, AssertionFailure> {
    let location = Location::caller();
    let start = std::time::Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    if elapsed > max {
        Err(AssertionFailure::at(
            format!("Expected a runtime of at most {max:?}, but it took {elapsed:?}"),
            location,
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_checks() {
        assert_true(true).unwrap();
        assert_false(false).unwrap();
        let failure = assert_true(false).unwrap_err();
        assert_eq!(failure.message(), "Expected false to be equal to true");
        assert_equals("abc", "abc").unwrap();
    }

    #[test]
    fn panic_checks() {
        assert_panics(|| panic!("expected")).unwrap();
        assert_eq!(assert_no_panic(|| 5).unwrap(), 5);

        let line = line!() + 1;
        let failure = assert_panics(|| ()).unwrap_err();
        assert_eq!(failure.message(), "Expected a panic, but none occurred");
        assert_eq!(failure.line(), line);

        let failure = assert_no_panic(|| panic!("oops")).unwrap_err();
        assert!(
            failure.message().starts_with("Expected no panic, but panicked at"),
            "message: {}",
            failure.message()
        );
        assert!(failure.message().ends_with(": oops"));
    }

    #[test]
    fn runtime_check() {
        assert_eq!(assert_runtime(Duration::from_secs(10), || 3).unwrap(), 3);

        let failure = assert_runtime(Duration::ZERO, || {
            std::thread::sleep(Duration::from_millis(5))
        })
        .unwrap_err();
        assert!(failure.message().starts_with("Expected a runtime of at most 0ns"));
    }
}
