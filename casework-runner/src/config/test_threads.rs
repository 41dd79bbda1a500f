// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::TestThreadsParseError;
use serde::Deserialize;
use std::{fmt, num::NonZeroUsize, str::FromStr};

/// Type for the test-threads config key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TestThreads {
    /// Run every test case of a parallel suite on its own thread.
    #[default]
    PerTest,

    /// Run test cases on a pool with the given number of threads.
    Count(NonZeroUsize),
}

impl TestThreads {
    /// Gets the number of threads to use for a suite with `test_count` test cases.
    pub fn compute(self, test_count: usize) -> usize {
        match self {
            Self::PerTest => test_count.max(1),
            Self::Count(threads) => threads.get(),
        }
    }
}

impl FromStr for TestThreads {
    type Err = TestThreadsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "per-test" {
            return Ok(Self::PerTest);
        }

        s.parse::<NonZeroUsize>()
            .map(Self::Count)
            .map_err(|_| TestThreadsParseError::new(s))
    }
}

impl fmt::Display for TestThreads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerTest => write!(f, "per-test"),
            Self::Count(threads) => write!(f, "{threads}"),
        }
    }
}

impl<'de> Deserialize<'de> for TestThreads {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = TestThreads;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a positive integer or the string \"per-test\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v == "per-test" {
                    Ok(TestThreads::PerTest)
                } else {
                    Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Str(v),
                        &self,
                    ))
                }
            }

            // Note that TOML uses i64, not u64.
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                usize::try_from(v)
                    .ok()
                    .and_then(NonZeroUsize::new)
                    .map(TestThreads::Count)
                    .ok_or_else(|| {
                        serde::de::Error::invalid_value(serde::de::Unexpected::Signed(v), &self)
                    })
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                usize::try_from(v)
                    .ok()
                    .and_then(NonZeroUsize::new)
                    .map(TestThreads::Count)
                    .ok_or_else(|| {
                        serde::de::Error::invalid_value(serde::de::Unexpected::Unsigned(v), &self)
                    })
            }
        }

        deserializer.deserialize_any(V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaseworkConfig, test_helpers::write_config};
    use camino_tempfile::tempdir;
    use indoc::indoc;
    use test_case::test_case;

    #[test_case(
        indoc! {r#"
            [profile.custom]
            test-threads = 2
        "#},
        Some(TestThreads::Count(NonZeroUsize::new(2).unwrap()))

        ; "positive"
    )]
    #[test_case(
        indoc! {r#"
            [profile.custom]
            test-threads = "per-test"
        "#},
        Some(TestThreads::PerTest)

        ; "per test"
    )]
    #[test_case(
        indoc! {r#"
            [profile.custom]
            test-threads = 0
        "#},
        None

        ; "zero"
    )]
    #[test_case(
        indoc! {r#"
            [profile.custom]
            test-threads = -3
        "#},
        None

        ; "negative"
    )]
    #[test_case(
        indoc! {r#"
            [profile.custom]
            test-threads = "num-cpus"
        "#},
        None

        ; "unknown string"
    )]
    fn parse_test_threads(config_contents: &str, expected: Option<TestThreads>) {
        let workspace_dir = tempdir().unwrap();
        let config_path = write_config(workspace_dir.path(), config_contents);

        let config = CaseworkConfig::from_sources(workspace_dir.path(), Some(&config_path));
        match expected {
            Some(expected) => {
                let config = config.expect("config is valid");
                let profile = config.profile("custom").expect("custom profile exists");
                assert_eq!(profile.test_threads(), expected);
            }
            None => {
                config.expect_err("config is invalid");
            }
        }
    }

    #[test_case("per-test", Some(TestThreads::PerTest) ; "per test")]
    #[test_case("8", Some(TestThreads::Count(NonZeroUsize::new(8).unwrap())) ; "eight")]
    #[test_case("0", None ; "zero")]
    #[test_case("many", None ; "garbage")]
    fn from_str(input: &str, expected: Option<TestThreads>) {
        assert_eq!(input.parse::<TestThreads>().ok(), expected);
    }

    #[test]
    fn compute() {
        assert_eq!(TestThreads::PerTest.compute(5), 5);
        assert_eq!(TestThreads::PerTest.compute(0), 1);
        assert_eq!(
            TestThreads::Count(NonZeroUsize::new(3).unwrap()).compute(10),
            3
        );
    }
}
