// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assertions usable from test bodies.
//!
//! An assertion compares an actual value against an expected value using a [`Comparator`], and
//! produces either `Ok(())` or an [`AssertionFailure`]. Returning an `AssertionFailure` from a test
//! body (typically with `?`) marks the test as failed. Any other error, or a panic, marks it as
//! errored.
//!
//! Comparators are selected explicitly:
//!
//! ```
//! use casework_runner::assertion::{assert_that, Equals, GreaterThan, Not};
//!
//! assert_that(&(2 + 2), Equals, &4).unwrap();
//! assert_that(&3, !GreaterThan, &5).unwrap();
//! assert_that(&"abc", Not::new(Equals), &"abd").unwrap();
//! ```

mod checks;
mod comparator;
mod equality;
mod matching;
mod ordering;

pub use checks::*;
pub use comparator::*;
pub use equality::*;
pub use matching::*;
pub use ordering::*;
