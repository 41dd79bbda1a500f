// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CompareSettings, ExecutionSettings, ReportSettings, TestThreads, WaveOrder};
use crate::errors::{ConfigParseError, ProfileNotFound};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

/// Overall configuration for casework.
///
/// This is the root data structure for casework configuration. Most runner-specific configuration
/// is managed through [profiles](CaseworkProfile), obtained through the [`profile`](Self::profile)
/// method.
#[derive(Clone, Debug)]
pub struct CaseworkConfig {
    workspace_root: Utf8PathBuf,
    default_profile: DefaultProfileImpl,
    other_profiles: IndexMap<String, CustomProfileImpl>,
}

impl CaseworkConfig {
    /// The default location of the config within the workspace root: `.config/casework.toml`.
    pub const CONFIG_PATH: &'static str = ".config/casework.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// The name of the default profile.
    pub const DEFAULT_PROFILE: &'static str = "default";

    /// Reads the casework config from the given file, or if not specified from
    /// `.config/casework.toml` in the workspace root.
    ///
    /// An explicitly specified file must exist. The default location is optional.
    pub fn from_sources(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let workspace_root = workspace_root.into();
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!("reading casework config from {config_file} (layered over defaults)");

        let builder = Self::make_default_config().add_source(source);
        let deserialized = Self::build_and_deserialize_config(&builder)
            .map_err(|err| ConfigParseError::new(&config_file, err))?;
        Self::from_deserialized(workspace_root, deserialized)
            .map_err(|err| ConfigParseError::new(&config_file, err))
    }

    /// Returns the default casework config, with no user configuration applied.
    pub fn default_config(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        let deserialized = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");
        Self::from_deserialized(workspace_root.into(), deserialized)
            .expect("default config is always valid")
    }

    /// Returns the profile with the given name.
    pub fn profile(&self, name: impl AsRef<str>) -> Result<CaseworkProfile<'_>, ProfileNotFound> {
        let name = name.as_ref();
        let custom_profile = if name == Self::DEFAULT_PROFILE {
            None
        } else {
            let profile = self
                .other_profiles
                .get(name)
                .ok_or_else(|| ProfileNotFound::new(name, self.all_profiles()))?;
            Some(profile)
        };

        Ok(CaseworkProfile {
            name: name.to_owned(),
            workspace_root: &self.workspace_root,
            custom_profile,
            default_profile: &self.default_profile,
        })
    }

    /// Returns the names of all known profiles, starting with the default profile.
    pub fn all_profiles(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(Self::DEFAULT_PROFILE).chain(self.other_profiles.keys().map(|s| s.as_str()))
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<CaseworkConfigDeserialize, ConfigError> {
        builder.build_cloned()?.try_deserialize()
    }

    fn from_deserialized(
        workspace_root: Utf8PathBuf,
        mut deserialized: CaseworkConfigDeserialize,
    ) -> Result<Self, ConfigError> {
        let default_profile = deserialized
            .profile
            .shift_remove(Self::DEFAULT_PROFILE)
            .expect("default profile is always present");
        let default_profile = DefaultProfileImpl::new(default_profile);

        let epsilons = std::iter::once((Self::DEFAULT_PROFILE, default_profile.float_epsilon)).chain(
            deserialized
                .profile
                .iter()
                .filter_map(|(name, profile)| Some((name.as_str(), profile.float_epsilon?))),
        );
        for (name, epsilon) in epsilons {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(ConfigError::Message(format!(
                    "profile.{name}.float-epsilon must be a non-negative number, found {epsilon}"
                )));
            }
        }

        Ok(Self {
            workspace_root,
            default_profile,
            other_profiles: deserialized.profile,
        })
    }
}

/// A casework profile, with custom settings layered over the default profile.
#[derive(Clone, Debug)]
pub struct CaseworkProfile<'cfg> {
    name: String,
    workspace_root: &'cfg Utf8Path,
    custom_profile: Option<&'cfg CustomProfileImpl>,
    default_profile: &'cfg DefaultProfileImpl,
}

impl<'cfg> CaseworkProfile<'cfg> {
    /// Returns the name of the profile.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wave order for this profile.
    pub fn wave_order(&self) -> WaveOrder {
        self.custom_profile
            .and_then(|profile| profile.wave_order)
            .unwrap_or(self.default_profile.wave_order)
    }

    /// Returns the test-threads setting for this profile.
    pub fn test_threads(&self) -> TestThreads {
        self.custom_profile
            .and_then(|profile| profile.test_threads)
            .unwrap_or(self.default_profile.test_threads)
    }

    /// Returns whether parallel suites may run concurrently with each other.
    pub fn suite_concurrency(&self) -> bool {
        self.custom_profile
            .and_then(|profile| profile.suite_concurrency)
            .unwrap_or(self.default_profile.suite_concurrency)
    }

    /// Returns the default floating-point tolerance.
    pub fn float_epsilon(&self) -> f64 {
        self.custom_profile
            .and_then(|profile| profile.float_epsilon)
            .unwrap_or(self.default_profile.float_epsilon)
    }

    /// Returns whether reports include output of passing tests.
    pub fn capture_output(&self) -> bool {
        self.custom_profile
            .and_then(|profile| profile.capture_output)
            .unwrap_or(self.default_profile.capture_output)
    }

    /// Returns the JUnit report path, resolved against the workspace root, if one is configured.
    pub fn junit_path(&self) -> Option<Utf8PathBuf> {
        self.custom_profile
            .and_then(|profile| profile.junit.path.as_deref())
            .or(self.default_profile.junit.path.as_deref())
            .map(|path| self.workspace_root.join(path))
    }

    /// Returns the name of the report.
    pub fn report_name(&self) -> &'cfg str {
        self.custom_profile
            .and_then(|profile| profile.junit.report_name.as_deref())
            .unwrap_or(&self.default_profile.junit.report_name)
    }

    /// Resolves the settings used to execute suites.
    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            wave_order: self.wave_order(),
            test_threads: self.test_threads(),
            suite_concurrency: self.suite_concurrency(),
            compare: CompareSettings::new(self.float_epsilon()),
        }
    }

    /// Resolves the settings used by reporters.
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            capture_output: self.capture_output(),
            report_name: self.report_name().to_owned(),
            junit_path: self.junit_path(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CaseworkConfigDeserialize {
    #[serde(default)]
    profile: IndexMap<String, CustomProfileImpl>,
}

#[derive(Clone, Debug)]
struct DefaultProfileImpl {
    wave_order: WaveOrder,
    test_threads: TestThreads,
    suite_concurrency: bool,
    float_epsilon: f64,
    capture_output: bool,
    junit: DefaultJunitImpl,
}

impl DefaultProfileImpl {
    fn new(p: CustomProfileImpl) -> Self {
        Self {
            wave_order: p
                .wave_order
                .expect("profile.default.wave-order present in default config"),
            test_threads: p
                .test_threads
                .expect("profile.default.test-threads present in default config"),
            suite_concurrency: p
                .suite_concurrency
                .expect("profile.default.suite-concurrency present in default config"),
            float_epsilon: p
                .float_epsilon
                .expect("profile.default.float-epsilon present in default config"),
            capture_output: p
                .capture_output
                .expect("profile.default.capture-output present in default config"),
            junit: DefaultJunitImpl {
                path: p.junit.path,
                report_name: p
                    .junit
                    .report_name
                    .expect("profile.default.junit.report-name present in default config"),
            },
        }
    }
}

#[derive(Clone, Debug)]
struct DefaultJunitImpl {
    path: Option<Utf8PathBuf>,
    report_name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CustomProfileImpl {
    #[serde(default)]
    wave_order: Option<WaveOrder>,
    #[serde(default)]
    test_threads: Option<TestThreads>,
    #[serde(default)]
    suite_concurrency: Option<bool>,
    #[serde(default)]
    float_epsilon: Option<f64>,
    #[serde(default)]
    capture_output: Option<bool>,
    #[serde(default)]
    junit: JunitImpl,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct JunitImpl {
    #[serde(default)]
    path: Option<Utf8PathBuf>,
    #[serde(default)]
    report_name: Option<String>,
}
