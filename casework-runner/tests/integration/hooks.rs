// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use casework_runner::{
    assertion::{Equals, assert_that},
    outcome::OutcomeKind,
    runner::Runner,
    test_suite::TestSuite,
};
use color_eyre::eyre::bail;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn run_single(suite: TestSuite) -> Runner {
    let mut runner = Runner::default();
    runner.register(suite).unwrap();
    runner.run_all().unwrap();
    runner
}

fn kinds(runner: &Runner) -> Vec<OutcomeKind> {
    runner.suites().unwrap()[0]
        .test_cases()
        .iter()
        .map(|case| case.outcome().unwrap().kind())
        .collect()
}

#[test]
fn after_each_runs_once_per_failing_test() {
    let after = Counter::default();
    let mut suite = TestSuite::sequential("after");
    suite
        .after_each({
            let after = after.clone();
            move |_| {
                after.increment();
                Ok(())
            }
        })
        .test("fails", |_| {
            assert_that(&1, Equals, &2)?;
            Ok(())
        });

    let runner = run_single(suite);
    assert_eq!(after.get(), 1);
    assert_eq!(kinds(&runner), [OutcomeKind::Failed]);
}

#[test]
fn after_each_runs_when_before_each_fails() {
    let body = Counter::default();
    let after = Counter::default();
    let mut suite = TestSuite::sequential("before-fails");
    suite
        .before_each(|_| bail!("database unavailable"))
        .after_each({
            let after = after.clone();
            move |_| {
                after.increment();
                Ok(())
            }
        })
        .test("skipped body", {
            let body = body.clone();
            move |_| {
                body.increment();
                Ok(())
            }
        });

    let runner = run_single(suite);
    assert_eq!(body.get(), 0, "body is skipped");
    assert_eq!(after.get(), 1);

    let outcome = runner.suites().unwrap()[0].test_cases()[0]
        .outcome()
        .unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Errored);
    assert_eq!(
        outcome.reason(),
        "before-each hook failed: database unavailable"
    );
}

#[test]
fn hook_assertion_failure_is_an_error() {
    let mut suite = TestSuite::sequential("hook-assertion");
    suite
        .before_each(|cx| {
            assert_that(&cx.test_name().len(), Equals, &0)?;
            Ok(())
        })
        .test("named", |_| Ok(()));

    let runner = run_single(suite);
    assert_eq!(kinds(&runner), [OutcomeKind::Errored]);
}

#[test]
fn panics_are_errors() {
    let mut suite = TestSuite::parallel("panics");
    suite
        .test("body panics", |_| panic!("index out of bounds"))
        .test("after-each panics", |_| Ok(()))
        .after_each(|cx| {
            if cx.test_name() == "after-each panics" {
                panic!("teardown exploded");
            }
            Ok(())
        });

    let runner = run_single(suite);
    assert_eq!(kinds(&runner), [OutcomeKind::Errored, OutcomeKind::Errored]);

    let cases = runner.suites().unwrap()[0].test_cases();
    let body_reason = cases[0].outcome().unwrap().reason();
    assert!(
        body_reason.starts_with("panicked at ") && body_reason.ends_with("index out of bounds"),
        "reason: {body_reason}"
    );
    let hook_reason = cases[1].outcome().unwrap().reason();
    assert!(
        hook_reason.starts_with("after-each hook failed: panicked at "),
        "reason: {hook_reason}"
    );
}

#[test]
fn first_failure_wins() {
    let mut suite = TestSuite::sequential("first-wins");
    suite
        .after_each(|_| bail!("teardown failed"))
        .test("fails", |_| {
            assert_that(&"a", Equals, &"b")?;
            Ok(())
        });

    let runner = run_single(suite);
    let outcome = runner.suites().unwrap()[0].test_cases()[0]
        .outcome()
        .unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Failed);
    assert!(outcome.reason().starts_with("Expected \"a\" to be equal to \"b\""));
}

#[test]
fn hooks_share_fixture_across_parallel_tests() {
    #[derive(Debug, Default)]
    struct Fixture {
        set_up: usize,
        torn_down: usize,
    }

    let fixture = Arc::new(Mutex::new(Fixture::default()));
    let mut suite = TestSuite::parallel("fixture");
    suite
        .before_each({
            let fixture = fixture.clone();
            move |_| {
                fixture.lock().unwrap().set_up += 1;
                Ok(())
            }
        })
        .after_each({
            let fixture = fixture.clone();
            move |_| {
                fixture.lock().unwrap().torn_down += 1;
                Ok(())
            }
        });
    for i in 0..6 {
        suite.test(format!("uses fixture {i}"), |_| Ok(()));
    }

    let runner = run_single(suite);
    assert_eq!(runner.exit_signal().unwrap(), 0);
    let fixture = fixture.lock().unwrap();
    assert_eq!(fixture.set_up, 6);
    assert_eq!(fixture.torn_down, 6);
}
