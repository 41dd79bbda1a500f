// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use casework_runner::{
    config::{ExecutionSettings, TestThreads},
    errors::UsageError,
    outcome::OutcomeKind,
    runner::{ExecutionStatus, Runner, Wave},
    test_case::TestCase,
    test_filter::SuiteFilter,
    test_suite::{ConcurrencyMode, SuiteHooks, TestSuite},
};
use color_eyre::eyre::bail;
use pretty_assertions::assert_eq;
use std::{num::NonZeroUsize, time::Duration};
use test_case::test_case;

#[test]
fn sequential_failures_are_all_counted() {
    let mut runner = Runner::default();
    runner.register(failing_suite("failing", 3)).unwrap();
    runner.run_all().unwrap();

    let stats = runner.statistics().unwrap();
    assert_eq!(stats.tests, 3);
    assert_eq!(stats.failures, 3);
    assert_eq!(stats.errors, 0);
    assert_eq!(runner.exit_signal().unwrap(), 3);

    let suite = &runner.suites().unwrap()[0];
    for case in suite.test_cases() {
        let outcome = case.outcome().unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert!(
            outcome.reason().contains("to be equal to"),
            "reason: {}",
            outcome.reason()
        );
    }
}

#[test_case(ConcurrencyMode::Sequential ; "sequential")]
#[test_case(ConcurrencyMode::Parallel ; "parallel")]
fn statistics_total_matches_test_count(mode: ConcurrencyMode) {
    let mut runner = Runner::default();
    runner.register(mixed_suite("one", mode)).unwrap();
    runner.register(mixed_suite("two", mode)).unwrap();
    runner.run_all().unwrap();

    let stats = runner.statistics().unwrap();
    assert_eq!(stats.suites, 2);
    assert_eq!(stats.tests, 6);
    assert_eq!(stats.passed() + stats.failures + stats.errors, stats.tests);
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.errors, 2);
}

#[test]
fn run_elapsed_is_wave_wall_clock() {
    let sleep = Duration::from_millis(200);
    let mut settings = ExecutionSettings::default();
    settings.test_threads = TestThreads::Count(NonZeroUsize::new(2).unwrap());

    let mut runner = Runner::new(settings);
    runner
        .register(sleeping_suite("first", 2, sleep))
        .unwrap();
    runner
        .register(sleeping_suite("second", 2, sleep))
        .unwrap();
    runner.run_all().unwrap();

    let stats = runner.statistics().unwrap();
    let report = runner.report().unwrap();
    assert_eq!(stats.elapsed, report.elapsed());
    assert_eq!(&stats, report.statistics());

    let suite_sum: Duration = runner
        .suites()
        .unwrap()
        .iter()
        .map(|suite| suite.statistics().unwrap().elapsed)
        .sum();
    // Both suites run at once, so the run takes about as long as one of them.
    assert!(
        stats.elapsed < suite_sum,
        "run elapsed {:?} is less than the suites' sum {suite_sum:?}",
        stats.elapsed
    );
}

#[test_case(ConcurrencyMode::Sequential ; "sequential")]
#[test_case(ConcurrencyMode::Parallel ; "parallel")]
fn empty_error_message_is_recorded_as_errored(mode: ConcurrencyMode) {
    let mut suite = TestSuite::new("empty", "Empty messages", mode);
    suite
        .test("io", |_| Err(std::io::Error::other("").into()))
        .test("bailed", |_| bail!(""))
        .test("passes", |_| Ok(()));

    let mut runner = Runner::default();
    runner.register(suite).unwrap();
    runner.run_all().unwrap();

    let suite = &runner.suites().unwrap()[0];
    let reasons: Vec<_> = suite
        .test_cases()
        .iter()
        .map(|case| {
            let outcome = case.outcome().unwrap();
            (outcome.kind(), outcome.reason().to_owned())
        })
        .collect();
    assert_eq!(
        reasons,
        [
            (OutcomeKind::Errored, "error with no message".to_owned()),
            (OutcomeKind::Errored, "error with no message".to_owned()),
            (OutcomeKind::Passed, String::new()),
        ]
    );
    assert_eq!(runner.exit_signal().unwrap(), 2);
}

#[test]
fn statistics_are_idempotent() {
    let mut runner = Runner::default();
    runner
        .register(mixed_suite("mixed", ConcurrencyMode::Parallel))
        .unwrap();
    runner.run_all().unwrap();

    let first = runner.statistics().unwrap();
    let second = runner.statistics().unwrap();
    assert_eq!(first, second);

    let suite = &runner.suites().unwrap()[0];
    assert_eq!(suite.statistics().unwrap(), suite.statistics().unwrap());
}

#[test]
fn parallel_suite_overlaps_test_cases() {
    let sleep = Duration::from_millis(200);
    let mut settings = ExecutionSettings::default();
    settings.test_threads = TestThreads::Count(NonZeroUsize::new(4).unwrap());

    let mut runner = Runner::new(settings);
    runner
        .register(sleeping_suite("sleepy", 4, sleep))
        .unwrap();
    runner.run_all().unwrap();

    let suite = &runner.suites().unwrap()[0];
    let stats = suite.statistics().unwrap();
    assert_eq!(stats.tests, 4);
    assert!(
        stats.cumulative_time >= sleep * 4,
        "cumulative time {:?} includes every sleep",
        stats.cumulative_time
    );
    // Four sleeps in sequence would take 800ms.
    assert!(
        stats.elapsed < sleep * 3,
        "elapsed {:?} is closer to the longest test than to the sum",
        stats.elapsed
    );
}

#[test]
fn parallel_suite_keeps_declaration_order() {
    let mut runner = Runner::default();
    runner
        .register(sleeping_suite("ordered", 8, Duration::from_millis(5)))
        .unwrap();
    runner.run_all().unwrap();

    let names: Vec<_> = runner.suites().unwrap()[0]
        .test_cases()
        .iter()
        .map(|case| case.name().to_owned())
        .collect();
    let expected: Vec<_> = (0..8).map(|i| format!("sleeps {i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn results_require_every_wave() {
    let mut runner = Runner::default();
    runner.register(failing_suite("seq", 1)).unwrap();
    runner
        .register(sleeping_suite("par", 1, Duration::ZERO))
        .unwrap();

    assert_eq!(
        runner.suites().unwrap_err(),
        UsageError::NotExecuted {
            status: ExecutionStatus::None
        }
    );
    assert!(runner.statistics().is_err());
    assert!(runner.report().is_err());

    runner.run_sequential().unwrap();
    assert_eq!(runner.status(), ExecutionStatus::Partial);
    assert_eq!(
        runner.exit_signal().unwrap_err(),
        UsageError::NotExecuted {
            status: ExecutionStatus::Partial
        }
    );

    runner.run_parallel().unwrap();
    assert_eq!(runner.status(), ExecutionStatus::All);
    assert!(runner.is_wave_done(Wave::Parallel));
    assert_eq!(runner.exit_signal().unwrap(), 1);
}

#[test]
fn test_case_executes_once() {
    let mut case = TestCase::new("once", "standalone", |_| Ok(()));
    assert_eq!(
        case.outcome().unwrap_err(),
        UsageError::TestCaseNotExecuted {
            test_case: "once".to_owned()
        }
    );

    let settings = ExecutionSettings::default();
    let hooks = SuiteHooks::default();
    assert!(case.execute(&hooks, &settings).unwrap().is_success());
    assert_eq!(
        case.execute(&hooks, &settings).unwrap_err(),
        UsageError::TestCaseAlreadyExecuted {
            test_case: "once".to_owned()
        }
    );
    assert!(case.outcome().unwrap().is_success());
}

#[test]
fn suite_runs_once() {
    let settings = ExecutionSettings::default();
    let mut suite = failing_suite("twice", 2);
    assert!(suite.statistics().is_err());
    suite.run(&settings).unwrap();
    assert_eq!(
        suite.run(&settings).unwrap_err(),
        UsageError::SuiteAlreadyRun {
            suite: "twice".to_owned()
        }
    );
    assert_eq!(suite.statistics().unwrap().failures, 2);
}

#[test]
fn filtered_suites_are_not_run() {
    let mut runner = Runner::default();
    for name in ["unit_math", "unit_io", "integration_db"] {
        runner
            .register(TestSuite::sequential(name))
            .unwrap();
    }

    let filter = SuiteFilter::new(["unit_*"], Vec::<String>::new()).unwrap();
    assert_eq!(runner.retain_suites(&filter).unwrap(), 2);
    runner.run_all().unwrap();

    let names: Vec<_> = runner
        .suites()
        .unwrap()
        .iter()
        .map(|suite| suite.name())
        .collect();
    assert_eq!(names, ["unit_math", "unit_io"]);
}

#[test]
fn parallel_suites_without_suite_concurrency() {
    let mut settings = ExecutionSettings::default();
    settings.suite_concurrency = false;
    let mut runner = Runner::new(settings);
    runner
        .register(mixed_suite("first", ConcurrencyMode::Parallel))
        .unwrap();
    runner
        .register(mixed_suite("second", ConcurrencyMode::Parallel))
        .unwrap();
    runner.run_all().unwrap();

    let suites = runner.suites().unwrap();
    assert!(suites[0].timestamp().unwrap() <= suites[1].timestamp().unwrap());
    assert_eq!(runner.exit_signal().unwrap(), 4);
}
