// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The runner: a registry of suites that executes them in two waves.
//!
//! Parallel-mode suites form one wave and sequential-mode suites the other. Waves can be run
//! individually ([`Runner::run_parallel`], [`Runner::run_sequential`]) or together
//! ([`Runner::run_all`]), and in either order. Results are only readable once both waves have run.

use crate::{
    config::ExecutionSettings,
    errors::UsageError,
    reporter::RunReport,
    stats::RunStatistics,
    test_filter::SuiteFilter,
    test_suite::{ConcurrencyMode, TestSuite},
    time::stopwatch,
};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::{fmt, time::Duration};
use tracing::debug;

/// How much of the registry has been executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExecutionStatus {
    /// No wave has run yet.
    None,

    /// Exactly one wave has run.
    Partial,

    /// Both waves have run. Results may be read.
    All,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::None => write!(f, "NONE"),
            ExecutionStatus::Partial => write!(f, "PARTIAL"),
            ExecutionStatus::All => write!(f, "ALL"),
        }
    }
}

/// A group of suites that are run together.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Wave {
    /// Every suite whose mode is [`ConcurrencyMode::Parallel`].
    Parallel,

    /// Every suite whose mode is [`ConcurrencyMode::Sequential`].
    Sequential,
}

impl Wave {
    /// The concurrency mode of the suites in this wave.
    pub fn mode(self) -> ConcurrencyMode {
        match self {
            Wave::Parallel => ConcurrencyMode::Parallel,
            Wave::Sequential => ConcurrencyMode::Sequential,
        }
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wave::Parallel => write!(f, "parallel"),
            Wave::Sequential => write!(f, "sequential"),
        }
    }
}

/// An ordered registry of suites.
///
/// Suites are registered during a single-threaded setup phase, then executed. Once execution has
/// started no suite may be registered or filtered out, and results can only be read once every
/// wave has run.
#[derive(Debug, Default)]
pub struct Runner {
    settings: ExecutionSettings,
    suites: Vec<TestSuite>,
    parallel_done: bool,
    sequential_done: bool,
    start_time: Option<DateTime<Local>>,
    elapsed: Duration,
}

impl Runner {
    /// Creates a new runner with the given settings.
    pub fn new(settings: ExecutionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// The settings this runner executes suites with.
    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Registers a suite. Suites are kept in registration order.
    ///
    /// Fails if execution has already started, or if the suite was run outside of this runner.
    pub fn register(&mut self, suite: TestSuite) -> Result<(), UsageError> {
        self.ensure_not_started()?;
        if suite.is_run() {
            return Err(UsageError::SuiteAlreadyRun {
                suite: suite.name().to_owned(),
            });
        }
        debug!(suite = %suite.name(), mode = %suite.mode(), "registered suite");
        self.suites.push(suite);
        Ok(())
    }

    /// Retains only the suites accepted by `filter`, returning the number of suites kept.
    ///
    /// Fails if execution has already started.
    pub fn retain_suites(&mut self, filter: &SuiteFilter) -> Result<usize, UsageError> {
        self.ensure_not_started()?;
        let before = self.suites.len();
        self.suites.retain(|suite| filter.is_match(suite.name()));
        debug!(
            "suite filter kept {} of {before} suites",
            self.suites.len()
        );
        Ok(self.suites.len())
    }

    fn ensure_not_started(&self) -> Result<(), UsageError> {
        match self.status() {
            ExecutionStatus::None => Ok(()),
            ExecutionStatus::Partial | ExecutionStatus::All => Err(UsageError::ExecutionStarted),
        }
    }

    /// Returns how much of the registry has been executed.
    pub fn status(&self) -> ExecutionStatus {
        match (self.parallel_done, self.sequential_done) {
            (false, false) => ExecutionStatus::None,
            (true, true) => ExecutionStatus::All,
            _ => ExecutionStatus::Partial,
        }
    }

    /// Returns true if the given wave has run.
    pub fn is_wave_done(&self, wave: Wave) -> bool {
        match wave {
            Wave::Parallel => self.parallel_done,
            Wave::Sequential => self.sequential_done,
        }
    }

    /// Runs every parallel-mode suite.
    pub fn run_parallel(&mut self) -> Result<(), UsageError> {
        self.run_wave(Wave::Parallel)
    }

    /// Runs every sequential-mode suite.
    pub fn run_sequential(&mut self) -> Result<(), UsageError> {
        self.run_wave(Wave::Sequential)
    }

    /// Runs every wave that has not run yet, in the configured order.
    ///
    /// Fails if every wave has already run.
    pub fn run_all(&mut self) -> Result<(), UsageError> {
        let remaining: Vec<_> = self
            .settings
            .wave_order
            .waves()
            .into_iter()
            .filter(|&wave| !self.is_wave_done(wave))
            .collect();
        if remaining.is_empty() {
            return Err(UsageError::AllWavesRun);
        }
        for wave in remaining {
            self.run_wave(wave)?;
        }
        Ok(())
    }

    /// Runs every suite in the given wave.
    ///
    /// Parallel suites run concurrently with each other unless `suite-concurrency` is disabled.
    /// Sequential suites run one after the other, in registration order.
    ///
    /// Fails if the wave has already run.
    pub fn run_wave(&mut self, wave: Wave) -> Result<(), UsageError> {
        if self.is_wave_done(wave) {
            return Err(UsageError::WaveAlreadyRun { wave });
        }

        let stopwatch = stopwatch();
        self.start_time.get_or_insert(stopwatch.start_time());
        let mode = wave.mode();
        let settings = &self.settings;
        let mut suites: Vec<_> = self
            .suites
            .iter_mut()
            .filter(|suite| suite.mode() == mode)
            .collect();
        debug!(%wave, "running {} suites", suites.len());

        if wave == Wave::Parallel && settings.suite_concurrency {
            suites
                .par_iter_mut()
                .with_max_len(1)
                .try_for_each(|suite| suite.run(settings))?;
        } else {
            for suite in suites {
                suite.run(settings)?;
            }
        }

        let snapshot = stopwatch.snapshot();
        self.elapsed += snapshot.duration;
        match wave {
            Wave::Parallel => self.parallel_done = true,
            Wave::Sequential => self.sequential_done = true,
        }
        debug!(%wave, status = %self.status(), "wave finished in {:?}", snapshot.duration);
        Ok(())
    }

    fn ensure_all_executed(&self) -> Result<(), UsageError> {
        match self.status() {
            ExecutionStatus::All => Ok(()),
            status => Err(UsageError::NotExecuted { status }),
        }
    }

    /// The registered suites, in registration order.
    ///
    /// Fails unless every wave has run.
    pub fn suites(&self) -> Result<&[TestSuite], UsageError> {
        self.ensure_all_executed()?;
        Ok(&self.suites)
    }

    /// Aggregated statistics across every suite.
    ///
    /// Fails unless every wave has run.
    pub fn statistics(&self) -> Result<RunStatistics, UsageError> {
        let stats = self
            .suites()?
            .iter()
            .map(|suite| suite.statistics())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RunStatistics::from_suites(&stats, self.elapsed))
    }

    /// The number of test cases that failed or errored across every suite. Zero means success.
    ///
    /// Fails unless every wave has run.
    pub fn exit_signal(&self) -> Result<usize, UsageError> {
        Ok(self.statistics()?.exit_signal())
    }

    /// Returns a read-only view over the executed suites, for reporters.
    ///
    /// Fails unless every wave has run.
    pub fn report(&self) -> Result<RunReport<'_>, UsageError> {
        let start_time = self.start_time.unwrap_or_else(Local::now);
        RunReport::new(self.suites()?, start_time, self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveOrder;
    use test_case::test_case;

    fn runner_with_both_modes(settings: ExecutionSettings) -> Runner {
        let mut runner = Runner::new(settings);
        let mut parallel = TestSuite::parallel("par");
        parallel.test("a", |_| Ok(()));
        let mut sequential = TestSuite::sequential("seq");
        sequential.test("b", |_| Ok(()));
        runner.register(parallel).unwrap();
        runner.register(sequential).unwrap();
        runner
    }

    #[test_case(Wave::Parallel, Wave::Sequential ; "parallel first")]
    #[test_case(Wave::Sequential, Wave::Parallel ; "sequential first")]
    fn status_transitions(first: Wave, second: Wave) {
        let mut runner = runner_with_both_modes(ExecutionSettings::default());
        assert_eq!(runner.status(), ExecutionStatus::None);

        runner.run_wave(first).unwrap();
        assert_eq!(runner.status(), ExecutionStatus::Partial);
        assert_eq!(
            runner.suites().unwrap_err(),
            UsageError::NotExecuted {
                status: ExecutionStatus::Partial
            }
        );
        assert_eq!(
            runner.run_wave(first).unwrap_err(),
            UsageError::WaveAlreadyRun { wave: first }
        );

        runner.run_wave(second).unwrap();
        assert_eq!(runner.status(), ExecutionStatus::All);
        assert_eq!(runner.suites().unwrap().len(), 2);
        assert_eq!(runner.exit_signal().unwrap(), 0);
    }

    #[test]
    fn run_all_after_partial_runs_remaining_wave() {
        let mut runner = runner_with_both_modes(ExecutionSettings::default());
        runner.run_sequential().unwrap();
        runner.run_all().unwrap();
        assert_eq!(runner.status(), ExecutionStatus::All);
        assert_eq!(runner.run_all().unwrap_err(), UsageError::AllWavesRun);
    }

    #[test]
    fn wave_order_is_respected() {
        let mut settings = ExecutionSettings::default();
        settings.wave_order = WaveOrder::SequentialFirst;
        let mut runner = runner_with_both_modes(settings);
        runner.run_all().unwrap();

        let suites = runner.suites().unwrap();
        let par_start = suites[0].timestamp().unwrap();
        let seq_start = suites[1].timestamp().unwrap();
        assert!(seq_start <= par_start, "sequential wave ran first");
    }

    #[test]
    fn registration_closes_once_execution_starts() {
        let mut runner = runner_with_both_modes(ExecutionSettings::default());
        runner.run_parallel().unwrap();
        assert_eq!(
            runner.register(TestSuite::sequential("late")).unwrap_err(),
            UsageError::ExecutionStarted
        );
        assert_eq!(
            runner.retain_suites(&SuiteFilter::default()).unwrap_err(),
            UsageError::ExecutionStarted
        );
    }

    #[test]
    fn register_rejects_suites_that_already_ran() {
        let mut suite = TestSuite::sequential("ran");
        suite.run(&ExecutionSettings::default()).unwrap();
        let mut runner = Runner::default();
        assert_eq!(
            runner.register(suite).unwrap_err(),
            UsageError::SuiteAlreadyRun {
                suite: "ran".to_owned()
            }
        );
    }

    #[test]
    fn empty_runner_reaches_all() {
        let mut runner = Runner::default();
        runner.run_all().unwrap();
        assert_eq!(runner.status(), ExecutionStatus::All);
        let stats = runner.statistics().unwrap();
        assert_eq!(
            stats,
            RunStatistics {
                elapsed: stats.elapsed,
                ..RunStatistics::default()
            }
        );
        assert_eq!(stats.elapsed, runner.report().unwrap().elapsed());
    }
}
