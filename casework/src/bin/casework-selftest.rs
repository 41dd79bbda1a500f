// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs a small set of casework suites through the harness.

use casework::{CaseworkApp, OutputWriter};
use casework_runner::{
    assertion::{
        Contains, Equals, GreaterThan, InRange, LessThan, Like, Matches, Not, assert_false,
        assert_panics, assert_runtime, assert_that, assert_true,
    },
    test_suite::{ConcurrencyMode, TestSuite},
};
use clap::Parser;
use color_eyre::{
    Result,
    eyre::{bail, eyre},
};
use regex::Regex;
use std::{
    io::Write,
    sync::{Arc, Mutex},
    time::Duration,
};

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = enable_ansi_support::enable_ansi_support();

    let app = CaseworkApp::parse();
    let output = app.init_output();

    let mut suites = vec![calculator_suite(), stack_suite()];
    // Used by the harness's own tests to exercise failure reporting.
    if std::env::var("__CASEWORK_SELFTEST_FAIL").as_deref() == Ok("1") {
        suites.push(failing_suite());
    }

    match app.exec(suites, output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}

#[derive(Debug, Default)]
struct Calculator {
    memory: f64,
    operations: usize,
}

impl Calculator {
    fn apply(&mut self, op: char, value: f64) -> Result<f64> {
        self.operations += 1;
        self.memory = match op {
            '+' => self.memory + value,
            '-' => self.memory - value,
            '*' => self.memory * value,
            '/' if value == 0.0 => bail!("division by zero"),
            '/' => self.memory / value,
            _ => return Err(eyre!("unknown operator `{op}`")),
        };
        Ok(self.memory)
    }
}

/// Records how often the hooks around the calculator tests ran.
#[derive(Debug, Default)]
struct HookLedger {
    set_up: usize,
    torn_down: usize,
}

/// A parallel suite whose hooks share one fixture across every test.
fn calculator_suite() -> TestSuite {
    let ledger = Arc::new(Mutex::new(HookLedger::default()));

    let mut suite = TestSuite::new("calculator", "Calculator", ConcurrencyMode::Parallel);
    suite
        .before_each({
            let ledger = ledger.clone();
            move |cx| {
                let mut ledger = ledger.lock().map_err(|_| eyre!("hook ledger poisoned"))?;
                ledger.set_up += 1;
                let name = cx.test_name().to_owned();
                writeln!(cx.stdout(), "set up {}", name)?;
                Ok(())
            }
        })
        .after_each(move |cx| {
            let mut ledger = ledger.lock().map_err(|_| eyre!("hook ledger poisoned"))?;
            ledger.torn_down += 1;
            assert_that(&ledger.torn_down, Not(GreaterThan), &ledger.set_up)?;
            let name = cx.test_name().to_owned();
            writeln!(cx.stdout(), "torn down {}", name)?;
            Ok(())
        });

    suite
        .test("adds", |_| {
            let mut calculator = Calculator::default();
            calculator.apply('+', 2.0)?;
            assert_that(&calculator.apply('+', 3.0)?, Equals, &5.0)?;
            Ok(())
        })
        .test("divides with tolerance", |cx| {
            let mut calculator = Calculator::default();
            calculator.apply('+', 1.0)?;
            let third = calculator.apply('/', 3.0)?;
            assert_that(&(third * 3.0), cx.float_equals(), &1.0)?;
            assert_that(&third, InRange, &(0.33..=0.34))?;
            Ok(())
        })
        .test("rejects division by zero", |_| {
            let mut calculator = Calculator::default();
            let err = calculator
                .apply('/', 0.0)
                .err()
                .ok_or_else(|| eyre!("division by zero succeeded"))?;
            assert_that(&err.to_string(), Contains, "zero")?;
            Ok(())
        })
        .test("counts operations", |_| {
            let mut calculator = Calculator::default();
            for value in [1.0, 2.0, 3.0] {
                calculator.apply('*', value)?;
            }
            assert_that(&calculator.operations, Equals, &3)?;
            assert_that(&calculator.operations, Not(LessThan), &1)?;
            Ok(())
        });

    suite
}

/// A sequential suite whose tests build on each other's state.
fn stack_suite() -> TestSuite {
    let stack = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut suite = TestSuite::new("stack", "Vec<String>", ConcurrencyMode::Sequential);

    let pushes = stack.clone();
    suite.test("pushes", move |_| {
        let mut stack = pushes.lock().map_err(|_| eyre!("stack poisoned"))?;
        stack.extend(["alpha".to_owned(), "beta-2".to_owned()]);
        assert_that(&stack.len(), Equals, &2)?;
        Ok(())
    });

    let peeks = stack.clone();
    suite.test("peeks", move |_| {
        let stack = peeks.lock().map_err(|_| eyre!("stack poisoned"))?;
        let top = stack.last().ok_or_else(|| eyre!("stack is empty"))?;
        assert_that(top, Matches, &Regex::new(r"[a-z]+-\d")?)?;
        assert_that(top, Not(Like), &Regex::new("gamma")?)?;
        Ok(())
    });

    let pops = stack;
    suite.test("pops", move |_| {
        let mut stack = pops.lock().map_err(|_| eyre!("stack poisoned"))?;
        stack.clear();
        assert_true(stack.is_empty())?;
        assert_false(stack.pop().is_some())?;
        Ok(())
    });

    suite.test("checks panics and runtime", |_| {
        assert_panics(|| {
            let empty: Vec<u8> = Vec::new();
            empty[0]
        })?;
        let total = assert_runtime(Duration::from_secs(5), || (1..=100u64).sum::<u64>())?;
        assert_that(&total, Equals, &5050)?;
        Ok(())
    });

    suite
}

fn failing_suite() -> TestSuite {
    let mut suite = TestSuite::sequential("failing");
    suite
        .test("fails an assertion", |_| {
            assert_that(&"left", Equals, &"right")?;
            Ok(())
        })
        .test("returns an error", |_| bail!("unexpected state"));
    suite
}
