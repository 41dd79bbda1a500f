// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single named unit of test work.

use crate::{
    assertion::AssertionFailure,
    capture::{CaughtPanic, TestContext, catch_panic},
    config::ExecutionSettings,
    errors::UsageError,
    outcome::{OutcomeKind, TestOutcome},
    test_suite::SuiteHooks,
    time::stopwatch,
};
use color_eyre::eyre::Report;
use debug_ignore::DebugIgnore;
use std::fmt;
use tracing::trace;

/// The result returned by test bodies and hooks.
///
/// Returning an [`AssertionFailure`] (usually via `?`) marks the test as failed. Any other error
/// marks it as errored.
pub type TestResult = color_eyre::eyre::Result<()>;

/// A boxed test body.
pub type TestBody = Box<dyn FnOnce(&mut TestContext) -> TestResult + Send + 'static>;

/// A test case: a name, a body, and once executed, an outcome.
#[derive(Debug)]
pub struct TestCase {
    name: String,
    suite_name: String,
    body: Option<DebugIgnore<TestBody>>,
    outcome: Option<TestOutcome>,
}

impl TestCase {
    /// Creates a new test case belonging to the suite named `suite_name`.
    pub fn new(
        name: impl Into<String>,
        suite_name: impl Into<String>,
        body: impl FnOnce(&mut TestContext) -> TestResult + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            suite_name: suite_name.into(),
            body: Some(DebugIgnore(Box::new(body))),
            outcome: None,
        }
    }

    /// The name of the test case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the suite this test case belongs to.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Returns true once the test case has been executed.
    pub fn is_executed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the outcome of the test case.
    ///
    /// Fails if the test case has not been executed yet.
    pub fn outcome(&self) -> Result<&TestOutcome, UsageError> {
        self.outcome
            .as_ref()
            .ok_or_else(|| UsageError::TestCaseNotExecuted {
                test_case: self.name.clone(),
            })
    }

    /// Executes the test case, surrounded by the given hooks.
    ///
    /// The before-each hook runs first. If it fails, the body is skipped. The after-each hook
    /// always runs, even if the before-each hook or the body failed. The first failure determines
    /// the outcome.
    ///
    /// Fails if the test case was already executed: an outcome is written exactly once.
    pub fn execute(
        &mut self,
        hooks: &SuiteHooks,
        settings: &ExecutionSettings,
    ) -> Result<&TestOutcome, UsageError> {
        let body = match self.body.take() {
            Some(body) if self.outcome.is_none() => body.0,
            _ => {
                return Err(UsageError::TestCaseAlreadyExecuted {
                    test_case: self.name.clone(),
                });
            }
        };

        trace!(suite = %self.suite_name, test_case = %self.name, "executing test case");
        let stopwatch = stopwatch();
        let mut cx = TestContext::new(&self.name, &self.suite_name, settings.compare);

        let mut failure = hooks
            .before_each()
            .and_then(|hook| run_unit(|| hook(&mut cx)).map(|f| f.in_hook(HookKind::BeforeEach)));
        if failure.is_none() {
            failure = run_unit(|| body(&mut cx));
        }
        if let Some(hook) = hooks.after_each() {
            if let Some(after_failure) = run_unit(|| hook(&mut cx)) {
                failure.get_or_insert(after_failure.in_hook(HookKind::AfterEach));
            }
        }

        let snapshot = stopwatch.snapshot();
        let (kind, reason) = match failure {
            None => (OutcomeKind::Passed, String::new()),
            Some(failure) => (failure.kind(), failure.to_string()),
        };
        trace!(
            suite = %self.suite_name,
            test_case = %self.name,
            "test case finished: {kind} in {:?}",
            snapshot.duration,
        );

        let (stdout, stderr) = cx.into_output();
        let outcome = TestOutcome::new(
            kind,
            reason,
            snapshot.start_time,
            snapshot.duration,
            stdout,
            stderr,
        );
        Ok(self.outcome.insert(outcome))
    }
}

/// Runs one unit of work (a hook or the body), returning how it failed, if it did.
fn run_unit(f: impl FnOnce() -> TestResult) -> Option<UnitFailure> {
    match catch_panic(f) {
        Ok(Ok(())) => None,
        Ok(Err(report)) => Some(UnitFailure::from_report(report)),
        Err(panic) => Some(UnitFailure::Panicked(panic)),
    }
}

#[derive(Clone, Copy, Debug)]
enum HookKind {
    BeforeEach,
    AfterEach,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::BeforeEach => write!(f, "before-each"),
            HookKind::AfterEach => write!(f, "after-each"),
        }
    }
}

/// The reason recorded for an error whose message is empty.
const EMPTY_ERROR_REASON: &str = "error with no message";

#[derive(Debug)]
enum UnitFailure {
    Assertion(AssertionFailure),
    Error(Report),
    Panicked(CaughtPanic),
    Hook {
        hook: HookKind,
        inner: Box<UnitFailure>,
    },
}

impl UnitFailure {
    fn from_report(report: Report) -> Self {
        match report.downcast::<AssertionFailure>() {
            Ok(failure) => UnitFailure::Assertion(failure),
            Err(report) => UnitFailure::Error(report),
        }
    }

    fn in_hook(self, hook: HookKind) -> Self {
        UnitFailure::Hook {
            hook,
            inner: Box::new(self),
        }
    }

    fn kind(&self) -> OutcomeKind {
        match self {
            UnitFailure::Assertion(_) => OutcomeKind::Failed,
            // A failed hook is an error of the test case, even if the hook failed an assertion.
            UnitFailure::Error(_) | UnitFailure::Panicked(_) | UnitFailure::Hook { .. } => {
                OutcomeKind::Errored
            }
        }
    }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitFailure::Assertion(failure) => write!(f, "{failure}"),
            // The alternate form includes the chain of causes.
            UnitFailure::Error(report) => {
                let rendered = format!("{report:#}");
                if rendered.is_empty() {
                    write!(f, "{EMPTY_ERROR_REASON}")
                } else {
                    f.write_str(&rendered)
                }
            }
            UnitFailure::Panicked(panic) => write!(f, "{panic}"),
            UnitFailure::Hook { hook, inner } => write!(f, "{hook} hook failed: {inner}"),
        }
    }
}
