// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::{
    Args, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use owo_colors::{OwoColorize, Style};
use std::{
    fmt,
    io::{self, BufWriter, Write},
    str::FromStr,
    sync::Once,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log events with this target are printed without a level prefix.
pub(crate) const NO_HEADING_TARGET: &str = "casework::no_heading";

/// Environment variable holding a log filter, e.g. `casework_runner=trace`.
const LOG_ENV: &str = "CASEWORK_LOG";

/// Styles for `--help` and argument errors.
pub(crate) const fn clap_styles() -> Styles {
    let heading = AnsiColor::Green.on_default().effects(Effects::BOLD);
    let literal = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
    Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(literal)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(literal)
        .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
}

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, env = "CASEWORK_VERBOSE")]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        value_name = "WHEN",
        env = "CASEWORK_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        init_logging(self.color, self.verbose);
        OutputContext {
            verbose: self.verbose,
            color: self.color,
        }
    }
}

/// Output settings for a harness invocation.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) verbose: bool,
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns general stderr styles for the current output context.
    pub fn stderr_styles(&self) -> StderrStyles {
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            StderrStyles {
                bold: Style::new().bold(),
            }
        } else {
            StderrStyles::default()
        }
    }
}

/// When to produce colored output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Use colors if the stream supports them.
    #[default]
    Auto,

    /// Always use colors.
    Always,

    /// Never use colors.
    Never,
}

impl Color {
    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Styles used when printing errors to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
}

/// Installs the global stderr logger. Later calls are no-ops.
fn init_logging(color: Color, verbose: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter = std::env::var(LOG_ENV).ok();
        let (targets, invalid) = match log_targets(env_filter.as_deref(), verbose) {
            Ok(targets) => (targets, None),
            Err(error) => (default_targets(verbose), Some(error)),
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(LevelPrefixFormatter {
                colorize: color.should_colorize(supports_color::Stream::Stderr),
            })
            .with_writer(io::stderr)
            .with_filter(targets);
        tracing_subscriber::registry().with(layer).init();

        if let Some(error) = invalid {
            warn!("ignoring invalid {LOG_ENV} value: {error}");
        }
    });
}

/// Parses a log filter. An unset or empty filter logs at INFO, or DEBUG if `verbose` is set.
fn log_targets(
    filter: Option<&str>,
    verbose: bool,
) -> Result<Targets, <Targets as FromStr>::Err> {
    match filter {
        Some(filter) if !filter.is_empty() => filter.parse(),
        _ => Ok(default_targets(verbose)),
    }
}

fn default_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    Targets::new().with_default(level)
}

/// Prints `level: message`, dropping structured fields.
struct LevelPrefixFormatter {
    colorize: bool,
}

impl LevelPrefixFormatter {
    fn heading(&self, level: Level) -> (&'static str, Style) {
        let (label, style) = match level {
            Level::ERROR => ("error", Style::new().red().bold()),
            Level::WARN => ("warning", Style::new().yellow().bold()),
            Level::INFO => ("info", Style::new().bold()),
            Level::DEBUG => ("debug", Style::new().bold()),
            Level::TRACE => ("trace", Style::new().dimmed()),
        };
        (label, if self.colorize { style } else { Style::new() })
    }
}

impl<S, N> FormatEvent<S, N> for LevelPrefixFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (label, style) = self.heading(*metadata.level());
            write!(writer, "{}: ", label.style(style))?;
        }

        let mut message = MessageOnly {
            writer: &mut writer,
            result: Ok(()),
        };
        event.record(&mut message);
        message.result?;

        writeln!(writer)
    }
}

struct MessageOnly<'w, 'a> {
    writer: &'a mut format::Writer<'w>,
    result: fmt::Result,
}

impl Visit for MessageOnly<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" && self.result.is_ok() {
            self.result = write!(self.writer, "{value:?}");
        }
    }
}

/// Where the harness writes its report when no output file is given.
///
/// Tests use the `Test` variant to capture the report in memory.
#[derive(Default)]
pub enum OutputWriter {
    /// Standard output.
    #[default]
    Normal,

    /// An in-memory buffer.
    #[cfg(test)]
    Test {
        /// The captured report.
        stdout: Vec<u8>,
    },
}

impl OutputWriter {
    pub(crate) fn stdout_writer(&mut self) -> Box<dyn Write + '_> {
        match self {
            Self::Normal => Box::new(BufWriter::new(io::stdout())),
            #[cfg(test)]
            Self::Test { stdout } => Box::new(stdout),
        }
    }

    /// Returns true if writes to stdout go to a terminal-like stream that may be colorized.
    pub(crate) fn is_terminal(&self) -> bool {
        match self {
            Self::Normal => true,
            #[cfg(test)]
            Self::Test { .. } => false,
        }
    }
}
