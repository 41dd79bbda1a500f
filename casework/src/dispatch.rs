// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use casework_metadata::CaseworkExitCode;
use casework_runner::{
    config::{CaseworkConfig, ExecutionSettings, ReportSettings, TestThreads, WaveOrder},
    reporter::{
        ConsoleReporter, JsonReporter, JunitReporter, MarkdownReporter, Reporter, RunReport,
    },
    runner::Runner,
    test_filter::SuiteFilter,
    test_suite::TestSuite,
};
use clap::{Args, Parser, ValueEnum};
use itertools::Itertools;
use std::{
    fs::File,
    io::{BufWriter, Write},
};
use tracing::{debug, info, warn};

/// Runs casework test suites and reports their results.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles())]
pub struct CaseworkApp {
    #[command(flatten)]
    filter_opts: FilterOpts,

    #[command(flatten)]
    run_opts: RunOpts,

    #[command(flatten)]
    reporter_opts: ReporterOpts,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(flatten)]
    output: OutputOpts,
}

impl CaseworkApp {
    /// Initializes the output context, including logging.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Runs `suites` and writes a report, returning the process exit code on success.
    ///
    /// A run in which any test case failed or errored returns
    /// [`ExpectedError::TestRunFailed`].
    pub fn exec(
        self,
        suites: impl IntoIterator<Item = TestSuite>,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let root = self.config_opts.root()?;
        let config = self.config_opts.make_config(&root)?;
        let profile_name = self
            .config_opts
            .profile
            .as_deref()
            .unwrap_or(CaseworkConfig::DEFAULT_PROFILE);
        let profile = config.profile(profile_name)?;
        if output.verbose {
            info!(
                "using profile `{}` (known profiles: {})",
                profile.name(),
                config.all_profiles().join(", ")
            );
        }

        let settings = self.run_opts.apply(profile.execution_settings());
        let report_settings = self.reporter_opts.apply(profile.report_settings());
        let filter = self.filter_opts.make_filter()?;

        let mut runner = Runner::new(settings);
        for suite in suites {
            runner.register(suite)?;
        }
        let registered = runner.retain_suites(&filter)?;
        if registered == 0 {
            warn!("no test suites to run");
        }
        debug!(
            "running {registered} suites with test-threads {}",
            runner.settings().test_threads
        );

        runner.run_all()?;
        let run = runner.report()?;

        self.reporter_opts
            .write_report(&run, &report_settings, output, output_writer)?;
        if let Some(junit_path) = &report_settings.junit_path {
            debug!("writing JUnit report to {junit_path}");
            JunitReporter::create(junit_path, report_settings.clone())?.report(&run)?;
        }

        match run.exit_signal() {
            0 => Ok(CaseworkExitCode::OK),
            failed => Err(ExpectedError::TestRunFailed { failed }),
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Filter options")]
struct FilterOpts {
    /// Only run suites whose names match PATTERN (`*` matches any sequence)
    #[arg(long, short = 'i', value_name = "PATTERN")]
    include: Vec<String>,

    /// Skip suites whose names match PATTERN (`*` matches any sequence)
    #[arg(long, short = 'e', value_name = "PATTERN")]
    exclude: Vec<String>,
}

impl FilterOpts {
    fn make_filter(&self) -> Result<SuiteFilter> {
        Ok(SuiteFilter::new(&self.include, &self.exclude)?)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Runner options")]
struct RunOpts {
    /// Number of threads per parallel suite: a positive integer, or `per-test`
    #[arg(long, value_name = "THREADS", env = "CASEWORK_TEST_THREADS")]
    test_threads: Option<TestThreads>,

    /// Which wave of suites runs first
    #[arg(long, value_name = "ORDER")]
    wave_order: Option<WaveOrder>,

    /// Run parallel suites one after the other instead of concurrently
    #[arg(long)]
    no_suite_concurrency: bool,
}

impl RunOpts {
    fn apply(&self, mut settings: ExecutionSettings) -> ExecutionSettings {
        if let Some(test_threads) = self.test_threads {
            settings.test_threads = test_threads;
        }
        if let Some(wave_order) = self.wave_order {
            settings.wave_order = wave_order;
        }
        if self.no_suite_concurrency {
            settings.suite_concurrency = false;
        }
        settings
    }
}

/// The format of the report written at the end of the run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output
    #[default]
    Console,

    /// JUnit XML
    Junit,

    /// JSON summary, as described by `casework-metadata`
    Json,

    /// Markdown tables, one per suite
    Markdown,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Reporter options")]
struct ReporterOpts {
    /// Report format
    #[arg(long, value_enum, default_value_t, value_name = "FMT")]
    format: ReportFormat,

    /// Write the report to FILE instead of standard output
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<Utf8PathBuf>,

    /// Include captured output of passing tests in the report
    #[arg(long)]
    capture: bool,
}

impl ReporterOpts {
    fn apply(&self, mut settings: ReportSettings) -> ReportSettings {
        if self.capture {
            settings.capture_output = true;
        }
        settings
    }

    fn write_report(
        &self,
        run: &RunReport<'_>,
        settings: &ReportSettings,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        match &self.output {
            Some(path) => {
                let writer = create_report_file(path)?;
                self.make_reporter(writer, settings, false).report(run)?;
            }
            None => {
                let colorize = output_writer.is_terminal()
                    && output.color.should_colorize(supports_color::Stream::Stdout);
                let writer = output_writer.stdout_writer();
                self.make_reporter(writer, settings, colorize).report(run)?;
            }
        }
        Ok(())
    }

    fn make_reporter<'w>(
        &self,
        writer: impl Write + 'w,
        settings: &ReportSettings,
        colorize: bool,
    ) -> Box<dyn Reporter + 'w> {
        match self.format {
            ReportFormat::Console => {
                let mut reporter = ConsoleReporter::new(writer, settings.clone());
                if colorize {
                    reporter.colorize();
                }
                Box::new(reporter)
            }
            ReportFormat::Junit => Box::new(JunitReporter::new(writer, settings.clone())),
            ReportFormat::Json => Box::new(JsonReporter::new(writer, settings.clone())),
            ReportFormat::Markdown => Box::new(MarkdownReporter::new(writer, settings.clone())),
        }
    }
}

fn create_report_file(path: &Utf8Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|error| ExpectedError::report_file(dir, error))?;
    }
    let file = File::create(path).map_err(|error| ExpectedError::report_file(path, error))?;
    Ok(BufWriter::new(file))
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Casework profile to use
    #[arg(long, short = 'P', env = "CASEWORK_PROFILE")]
    profile: Option<String>,

    /// Config file [default: <root>/.config/casework.toml]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Directory that relative config paths are resolved against [default: current directory]
    #[arg(long, value_name = "DIR")]
    root: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn root(&self) -> Result<Utf8PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => {
                let current_dir = std::env::current_dir()
                    .map_err(|error| ExpectedError::CurrentDirFailed { error })?;
                Utf8PathBuf::try_from(current_dir)
                    .map_err(|err| ExpectedError::root_invalid_utf8(err.into_path_buf()))
            }
        }
    }

    fn make_config(&self, root: &Utf8Path) -> Result<CaseworkConfig> {
        Ok(CaseworkConfig::from_sources(
            root,
            self.config_file.as_deref(),
        )?)
    }
}
