// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test suites: ordered groups of test cases sharing hooks and a concurrency mode.
//!
//! A suite is authored once, run once, and read afterwards. Authoring methods panic once the suite
//! has run, and [`TestSuite::run`] fails if called twice.
//!
//! Hooks are shared between all test cases of a suite. In a [parallel](ConcurrencyMode::Parallel)
//! suite they are called concurrently, so any fixture they mutate must synchronize itself (for
//! example through a `Mutex`). The suite takes no lock around hooks.

use crate::{
    capture::TestContext,
    config::ExecutionSettings,
    errors::UsageError,
    outcome::TestOutcome,
    stats::SuiteStatistics,
    test_case::{TestCase, TestResult},
    time::{StopwatchSnapshot, stopwatch},
};
use casework_metadata::ConcurrencyModeSummary;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

/// A hook run around every test case of a suite.
pub type Hook = Arc<dyn Fn(&mut TestContext) -> TestResult + Send + Sync + 'static>;

/// The context label given to suites created through [`TestSuite::sequential`] and
/// [`TestSuite::parallel`].
pub const DEFAULT_CONTEXT: &str = "main";

/// How the test cases of a suite are executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConcurrencyMode {
    /// Test cases run one after the other, in declaration order.
    Sequential,

    /// Every test case runs as an independent unit of work. Results are still presented in
    /// declaration order.
    Parallel,
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::Sequential => write!(f, "sequential"),
            ConcurrencyMode::Parallel => write!(f, "parallel"),
        }
    }
}

impl From<ConcurrencyMode> for ConcurrencyModeSummary {
    fn from(mode: ConcurrencyMode) -> Self {
        match mode {
            ConcurrencyMode::Sequential => ConcurrencyModeSummary::Sequential,
            ConcurrencyMode::Parallel => ConcurrencyModeSummary::Parallel,
        }
    }
}

/// The before-each and after-each hooks of a suite.
#[derive(Clone, Default)]
pub struct SuiteHooks {
    before_each: Option<Hook>,
    after_each: Option<Hook>,
}

impl SuiteHooks {
    /// Sets the hook run before every test case.
    pub fn with_before_each(
        mut self,
        hook: impl Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    ) -> Self {
        self.before_each = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run after every test case.
    pub fn with_after_each(
        mut self,
        hook: impl Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    ) -> Self {
        self.after_each = Some(Arc::new(hook));
        self
    }

    /// The hook run before every test case, if any.
    pub fn before_each(&self) -> Option<&Hook> {
        self.before_each.as_ref()
    }

    /// The hook run after every test case, if any.
    pub fn after_each(&self) -> Option<&Hook> {
        self.after_each.as_ref()
    }
}

impl fmt::Debug for SuiteHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteHooks")
            .field("before_each", &self.before_each.is_some())
            .field("after_each", &self.after_each.is_some())
            .finish()
    }
}

/// An ordered group of test cases.
#[derive(Debug)]
pub struct TestSuite {
    name: String,
    context: String,
    mode: ConcurrencyMode,
    hooks: SuiteHooks,
    test_cases: Vec<TestCase>,
    // Set once run() finishes.
    run: Option<StopwatchSnapshot>,
}

impl TestSuite {
    /// Creates a new, empty suite.
    pub fn new(name: impl Into<String>, context: impl Into<String>, mode: ConcurrencyMode) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            mode,
            hooks: SuiteHooks::default(),
            test_cases: Vec::new(),
            run: None,
        }
    }

    /// Creates a new sequential suite with the default context.
    pub fn sequential(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_CONTEXT, ConcurrencyMode::Sequential)
    }

    /// Creates a new parallel suite with the default context.
    pub fn parallel(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_CONTEXT, ConcurrencyMode::Parallel)
    }

    /// Adds a test case to the suite.
    ///
    /// # Panics
    ///
    /// Panics if the suite has already been run.
    pub fn test(
        &mut self,
        name: impl Into<String>,
        body: impl FnOnce(&mut TestContext) -> TestResult + Send + 'static,
    ) -> &mut Self {
        let name = name.into();
        self.assert_authoring(format_args!("test `{name}`"));
        self.test_cases.push(TestCase::new(name, &self.name, body));
        self
    }

    /// Sets the hook run before every test case, replacing any previous one.
    ///
    /// # Panics
    ///
    /// Panics if the suite has already been run.
    pub fn before_each(
        &mut self,
        hook: impl Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    ) -> &mut Self {
        self.assert_authoring("before-each hook");
        self.hooks = std::mem::take(&mut self.hooks).with_before_each(hook);
        self
    }

    /// Sets the hook run after every test case, replacing any previous one.
    ///
    /// # Panics
    ///
    /// Panics if the suite has already been run.
    pub fn after_each(
        &mut self,
        hook: impl Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    ) -> &mut Self {
        self.assert_authoring("after-each hook");
        self.hooks = std::mem::take(&mut self.hooks).with_after_each(hook);
        self
    }

    fn assert_authoring(&self, what: impl fmt::Display) {
        if self.run.is_some() {
            panic!(
                "cannot add {what} to test suite `{}`: the suite has already been run",
                self.name
            );
        }
    }

    /// The name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The context label of the suite, e.g. the type under test.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// How the suite executes its test cases.
    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// The hooks of the suite.
    pub fn hooks(&self) -> &SuiteHooks {
        &self.hooks
    }

    /// The test cases of the suite, in declaration order.
    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    /// Returns true once the suite has been run.
    pub fn is_run(&self) -> bool {
        self.run.is_some()
    }

    /// The time at which the suite started running.
    pub fn timestamp(&self) -> Result<DateTime<Local>, UsageError> {
        self.snapshot().map(|snapshot| snapshot.start_time)
    }

    /// Computes statistics over the outcomes of the suite's test cases.
    ///
    /// Statistics are recomputed on every call. Fails if the suite has not been run.
    pub fn statistics(&self) -> Result<SuiteStatistics, UsageError> {
        let snapshot = self.snapshot()?;
        let outcomes = self
            .test_cases
            .iter()
            .map(|test_case| test_case.outcome())
            .collect::<Result<Vec<&TestOutcome>, _>>()?;
        Ok(SuiteStatistics::from_outcomes(outcomes, snapshot.duration))
    }

    fn snapshot(&self) -> Result<StopwatchSnapshot, UsageError> {
        self.run.ok_or_else(|| UsageError::SuiteNotRun {
            suite: self.name.clone(),
        })
    }

    /// Runs every test case of the suite.
    ///
    /// Test failures and errors are recorded in the outcomes of the test cases and never abort the
    /// suite. Fails only if the suite has already been run.
    pub fn run(&mut self, settings: &ExecutionSettings) -> Result<(), UsageError> {
        if self.run.is_some() {
            return Err(UsageError::SuiteAlreadyRun {
                suite: self.name.clone(),
            });
        }

        debug!(
            suite = %self.name,
            mode = %self.mode,
            "running {} test cases",
            self.test_cases.len(),
        );
        let stopwatch = stopwatch();
        match self.mode {
            ConcurrencyMode::Sequential => self.run_sequential(settings)?,
            ConcurrencyMode::Parallel => self.run_parallel(settings)?,
        }
        let snapshot = stopwatch.snapshot();
        debug!(suite = %self.name, "suite finished in {:?}", snapshot.duration);

        self.run = Some(snapshot);
        Ok(())
    }

    fn run_sequential(&mut self, settings: &ExecutionSettings) -> Result<(), UsageError> {
        for test_case in &mut self.test_cases {
            test_case.execute(&self.hooks, settings)?;
        }
        Ok(())
    }

    fn run_parallel(&mut self, settings: &ExecutionSettings) -> Result<(), UsageError> {
        let num_threads = settings.test_threads.compute(self.test_cases.len());
        let suite_name = self.name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(move |index| format!("casework-{suite_name}-{index}"))
            .build();
        let pool = match pool {
            Ok(pool) => pool,
            Err(error) => {
                warn!(
                    suite = %self.name,
                    "failed to build a pool of {num_threads} threads ({error}), \
                     running test cases sequentially",
                );
                return self.run_sequential(settings);
            }
        };

        let hooks = &self.hooks;
        let test_cases = &mut self.test_cases;
        // Test cases are executed in place, so outcomes stay in declaration order regardless of
        // completion order.
        pool.install(|| {
            test_cases
                .par_iter_mut()
                .with_max_len(1)
                .try_for_each(|test_case| test_case.execute(hooks, settings).map(|_| ()))
        })
    }
}
