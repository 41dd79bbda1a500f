// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino_tempfile::tempdir;
use casework_metadata::RunSummary;
use casework_runner::{
    config::{CaseworkConfig, TestThreads, WaveOrder},
    reporter::{JsonReporter, Reporter},
    runner::Runner,
    test_suite::TestSuite,
};
use indoc::indoc;
use std::{io::Write, num::NonZeroUsize};

#[test]
fn profile_drives_runner_and_reporter() {
    let dir = tempdir().unwrap();
    let config_dir = dir.path().join(".config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("casework.toml"),
        indoc! {r#"
            [profile.ci]
            wave-order = "sequential-first"
            test-threads = 2
            capture-output = true

            [profile.ci.junit]
            path = "target/casework/junit.xml"
        "#},
    )
    .unwrap();

    let config = CaseworkConfig::from_sources(dir.path(), None).unwrap();
    let profile = config.profile("ci").unwrap();
    assert_eq!(profile.wave_order(), WaveOrder::SequentialFirst);
    assert_eq!(
        profile.test_threads(),
        TestThreads::Count(NonZeroUsize::new(2).unwrap())
    );
    assert_eq!(
        profile.junit_path(),
        Some(dir.path().join("target/casework/junit.xml"))
    );

    let mut runner = Runner::new(profile.execution_settings());
    let mut suite = TestSuite::parallel("greetings");
    suite.test("says hello", |cx| {
        writeln!(cx.stdout(), "hello")?;
        Ok(())
    });
    runner.register(suite).unwrap();
    runner.run_all().unwrap();

    let mut reporter = JsonReporter::new(Vec::new(), profile.report_settings());
    reporter.report(&runner.report().unwrap()).unwrap();
    let json = String::from_utf8(reporter.into_inner()).unwrap();
    let summary = RunSummary::parse_json(json).unwrap();
    assert_eq!(summary.exit_signal(), 0);
    assert_eq!(
        summary.suites[0].test_cases[0].stdout.as_deref(),
        Some("hello\n"),
        "capture-output keeps passing output"
    );
}

#[test]
fn unknown_profile_is_reported() {
    let dir = tempdir().unwrap();
    let config = CaseworkConfig::from_sources(dir.path(), None).unwrap();
    let err = config.profile("missing").unwrap_err();
    assert_eq!(
        err.to_string(),
        "profile `missing` not found (known profiles: default)"
    );
}
