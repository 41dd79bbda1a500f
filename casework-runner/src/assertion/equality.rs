// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::comparator::{Comparator, impl_not};
use std::borrow::Cow;

/// The default relative tolerance used by [`FloatEquals`].
pub const DEFAULT_FLOAT_EPSILON: f64 = 0.000001;

/// Compares values with `==`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Equals;

impl<A: PartialEq<E> + ?Sized, E: ?Sized> Comparator<A, E> for Equals {
    fn holds(&self, actual: &A, expected: &E) -> bool {
        actual == expected
    }

    fn expectation(&self, negated: bool) -> Cow<'static, str> {
        if negated {
            "to be not equal to".into()
        } else {
            "to be equal to".into()
        }
    }
}

/// Compares floating-point values within a relative tolerance.
///
/// `actual` and `expected` are considered equal if
/// `|actual - expected| <= max(|actual|, |expected|) * epsilon`.
#[derive(Clone, Copy, Debug)]
pub struct FloatEquals {
    epsilon: f64,
}

impl FloatEquals {
    /// Creates a comparator with the given tolerance.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// The relative tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for FloatEquals {
    fn default() -> Self {
        Self::new(DEFAULT_FLOAT_EPSILON)
    }
}

macro_rules! impl_float_equals {
    ($($float:ty),*) => {
        $(
            impl Comparator<$float> for FloatEquals {
                fn holds(&self, actual: &$float, expected: &$float) -> bool {
                    let epsilon = self.epsilon as $float;
                    (actual - expected).abs() <= actual.abs().max(expected.abs()) * epsilon
                }

                fn expectation(&self, negated: bool) -> Cow<'static, str> {
                    <Equals as Comparator<$float>>::expectation(&Equals, negated)
                }
            }
        )*
    };
}

impl_float_equals!(f32, f64);
impl_not!(Equals, FloatEquals);
