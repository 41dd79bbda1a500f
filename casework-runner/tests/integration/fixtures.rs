// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use casework_runner::{
    assertion::{Equals, assert_that},
    test_suite::{ConcurrencyMode, TestSuite},
};
use color_eyre::eyre::bail;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

/// A suite whose test cases all fail an assertion.
pub(crate) fn failing_suite(name: &str, count: usize) -> TestSuite {
    let mut suite = TestSuite::sequential(name);
    for i in 0..count {
        suite.test(format!("fails {i}"), move |_| {
            assert_that(&i, Equals, &(i + 1))?;
            Ok(())
        });
    }
    suite
}

/// A parallel suite whose test cases each sleep for `sleep`.
pub(crate) fn sleeping_suite(name: &str, count: usize, sleep: Duration) -> TestSuite {
    let mut suite = TestSuite::parallel(name);
    for i in 0..count {
        suite.test(format!("sleeps {i}"), move |_| {
            thread::sleep(sleep);
            Ok(())
        });
    }
    suite
}

/// A suite with one passing, one failing and one errored test case.
pub(crate) fn mixed_suite(name: &str, mode: ConcurrencyMode) -> TestSuite {
    let mut suite = TestSuite::new(name, "Mixed", mode);
    suite
        .test("passes", |_| Ok(()))
        .test("fails", |_| {
            assert_that(&"left", Equals, &"right")?;
            Ok(())
        })
        .test("errors", |_| bail!("something went wrong"));
    suite
}

/// A shared counter incremented from hooks or test bodies.
#[derive(Clone, Debug, Default)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
