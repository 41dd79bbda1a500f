// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output capture and the unit-of-work boundary.
//!
//! Every execution of a test case gets its own [`TestContext`], which owns the standard output and
//! standard error sinks the test writes into. Sinks are never shared between test cases, so output
//! from concurrently running tests cannot interleave.

use crate::{
    assertion::FloatEquals,
    config::CompareSettings,
    outcome::CapturedOutput,
};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt, io,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

/// An owned, in-memory output buffer.
///
/// Implements both [`io::Write`] and [`fmt::Write`], so `write!` and `writeln!` work with either
/// trait in scope.
#[derive(Default)]
pub struct OutputSink {
    buf: Vec<u8>,
}

impl OutputSink {
    /// Returns the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn into_captured(self) -> CapturedOutput {
        CapturedOutput::new(self.buf)
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("len", &self.buf.len())
            .finish()
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for OutputSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// State handed to a test body and its hooks for the duration of one execution.
#[derive(Debug)]
pub struct TestContext {
    test_name: String,
    suite_name: String,
    compare: CompareSettings,
    stdout: OutputSink,
    stderr: OutputSink,
}

impl TestContext {
    pub(crate) fn new(
        test_name: impl Into<String>,
        suite_name: impl Into<String>,
        compare: CompareSettings,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            suite_name: suite_name.into(),
            compare,
            stdout: OutputSink::default(),
            stderr: OutputSink::default(),
        }
    }

    /// The name of the test case being executed.
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// The name of the suite the test case belongs to.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Comparison settings for this run.
    pub fn compare_settings(&self) -> CompareSettings {
        self.compare
    }

    /// A floating-point comparator using the configured epsilon.
    pub fn float_equals(&self) -> FloatEquals {
        FloatEquals::new(self.compare.float_epsilon)
    }

    /// The sink standing in for standard output.
    pub fn stdout(&mut self) -> &mut OutputSink {
        &mut self.stdout
    }

    /// The sink standing in for standard error.
    pub fn stderr(&mut self) -> &mut OutputSink {
        &mut self.stderr
    }

    pub(crate) fn into_output(self) -> (CapturedOutput, CapturedOutput) {
        (self.stdout.into_captured(), self.stderr.into_captured())
    }
}

/// A panic caught at the unit-of-work boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaughtPanic {
    message: String,
    location: Option<String>,
}

impl CaughtPanic {
    /// The panic message, if the payload was a string.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the panic happened, as `file:line`.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for CaughtPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "panicked at {location}: {}", self.message),
            None => write!(f, "panicked: {}", self.message),
        }
    }
}

thread_local! {
    static CATCHING: Cell<bool> = const { Cell::new(false) };
    static LAST_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

fn install_panic_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CATCHING.get() {
                // The panic is reported through the test outcome instead.
                let location = info
                    .location()
                    .map(|location| format!("{}:{}", location.file(), location.line()));
                LAST_LOCATION.set(location);
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs `f`, converting a panic into a [`CaughtPanic`].
///
/// While `f` runs, the default panic message is suppressed on this thread. Panics on other threads
/// are reported as usual.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, CaughtPanic> {
    install_panic_hook();

    let was_catching = CATCHING.replace(true);
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CATCHING.set(was_catching);

    result.map_err(|payload| CaughtPanic {
        message: panic_message(&*payload),
        location: LAST_LOCATION.take(),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}
