//! Provisioning configuration.
//!
//! Settings come from three layers: built-in defaults, an optional TOML file
//! (`toolfetch.toml` in the working directory unless `--config` names
//! another), and command-line flags. [`ProvisionConfig`] is the resolved
//! value handed to every provisioning step; relative paths in it have
//! already been joined onto the working directory.
//!
//! ```toml
//! dist_dir = "dist"
//! manifest = "dist/package_list.json"
//! bin_dir = "bin"
//! default_architecture = "esp8266"
//! ```

use crate::architecture::{ArchitectureProfile, DEFAULT_ARCHITECTURE, resolve_profile};
use crate::error::{ProvisionError, Result};
use crate::overrides::{DEFAULT_OVERRIDES, ToolOverride};
use crate::platform::HostPlatform;
use crate::relocation::{DEFAULT_RELOCATION, RelocationPlan};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "toolfetch.toml";

/// Default distribution directory holding downloaded archives.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Default manifest file name inside the distribution directory.
pub const DEFAULT_MANIFEST_NAME: &str = "package_list.json";

/// Default directory receiving relocated executables.
pub const DEFAULT_BIN_DIR: &str = "bin";

/// Values read from the settings file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Distribution directory, relative to the working directory.
    pub dist_dir: Option<Utf8PathBuf>,
    /// Manifest path, relative to the working directory.
    pub manifest: Option<Utf8PathBuf>,
    /// Binaries directory, relative to the working directory.
    pub bin_dir: Option<Utf8PathBuf>,
    /// Architecture used when none is given on the command line.
    pub default_architecture: Option<String>,
}

impl Settings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn from_toml(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] when the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ProvisionError::Config {
            path: path.as_std_path().to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&source).map_err(|e| ProvisionError::Config {
            path: path.as_std_path().to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load settings from `path` when the file exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] when an existing file cannot be
    /// read or parsed.
    pub fn load_if_present(path: &Utf8Path) -> Result<Self> {
        if path.is_file() {
            log::debug!("loading settings from {path}");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values supplied on the command line, taking precedence over settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigOverrides {
    /// Architecture to provision.
    pub architecture: Option<String>,
    /// Distribution directory.
    pub dist_dir: Option<Utf8PathBuf>,
    /// Manifest path.
    pub manifest: Option<Utf8PathBuf>,
    /// Binaries directory.
    pub bin_dir: Option<Utf8PathBuf>,
    /// Platform to provision for instead of the detected host.
    pub platform: Option<HostPlatform>,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Resolved configuration for one provisioning run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Directory tools are extracted into.
    pub work_dir: Utf8PathBuf,
    /// Directory holding downloaded archives.
    pub dist_dir: Utf8PathBuf,
    /// Manifest file.
    pub manifest_path: Utf8PathBuf,
    /// Directory receiving relocated executables.
    pub bin_dir: Utf8PathBuf,
    /// Requested architecture name.
    pub architecture: String,
    /// Platform override; `None` detects the host.
    pub platform: Option<HostPlatform>,
    /// Suppress progress output.
    pub quiet: bool,
    /// Exceptions to the generic unpack rule.
    pub overrides: Vec<ToolOverride>,
    /// Post-pass relocation for architectures that request it.
    pub relocation: RelocationPlan,
}

impl ProvisionConfig {
    /// Build the default configuration rooted at `work_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolfetch::config::ProvisionConfig;
    ///
    /// let config = ProvisionConfig::new("/tmp/tools", "avr");
    /// assert_eq!(config.dist_dir, "/tmp/tools/dist");
    /// assert_eq!(config.manifest_path, "/tmp/tools/dist/package_list.json");
    /// ```
    #[must_use]
    pub fn new(work_dir: impl Into<Utf8PathBuf>, architecture: impl Into<String>) -> Self {
        Self::resolve(
            work_dir.into(),
            &Settings::default(),
            ConfigOverrides {
                architecture: Some(architecture.into()),
                ..ConfigOverrides::default()
            },
        )
    }

    /// Merge defaults, settings, and command-line overrides.
    ///
    /// Command-line values win over settings, which win over defaults. The
    /// manifest defaults to `package_list.json` inside the resolved
    /// distribution directory.
    #[must_use]
    pub fn resolve(work_dir: Utf8PathBuf, settings: &Settings, cli: ConfigOverrides) -> Self {
        let dist_dir = work_dir.join(
            cli.dist_dir
                .or_else(|| settings.dist_dir.clone())
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DIST_DIR)),
        );
        let manifest_path = cli
            .manifest
            .or_else(|| settings.manifest.clone())
            .map_or_else(
                || dist_dir.join(DEFAULT_MANIFEST_NAME),
                |manifest| work_dir.join(manifest),
            );
        let bin_dir = work_dir.join(
            cli.bin_dir
                .or_else(|| settings.bin_dir.clone())
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_BIN_DIR)),
        );
        let architecture = cli
            .architecture
            .or_else(|| settings.default_architecture.clone())
            .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_owned());

        Self {
            work_dir,
            dist_dir,
            manifest_path,
            bin_dir,
            architecture,
            platform: cli.platform,
            quiet: cli.quiet,
            overrides: DEFAULT_OVERRIDES.to_vec(),
            relocation: DEFAULT_RELOCATION,
        }
    }

    /// Profile of the requested architecture.
    #[must_use]
    pub fn profile(&self) -> ArchitectureProfile {
        resolve_profile(&self.architecture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_follow_the_distribution_layout() {
        let config = ProvisionConfig::new("/work", "esp8266");

        assert_eq!(config.work_dir, "/work");
        assert_eq!(config.dist_dir, "/work/dist");
        assert_eq!(config.manifest_path, "/work/dist/package_list.json");
        assert_eq!(config.bin_dir, "/work/bin");
        assert_eq!(config.overrides, DEFAULT_OVERRIDES);
        assert!(!config.quiet);
    }

    #[rstest]
    fn settings_override_defaults() {
        let settings = Settings::from_toml(concat!(
            "dist_dir = \"cache\"\n",
            "bin_dir = \"tools/bin\"\n",
            "default_architecture = \"avr\"\n",
        ))
        .expect("expected settings to parse");

        let config =
            ProvisionConfig::resolve("/work".into(), &settings, ConfigOverrides::default());

        assert_eq!(config.dist_dir, "/work/cache");
        assert_eq!(config.manifest_path, "/work/cache/package_list.json");
        assert_eq!(config.bin_dir, "/work/tools/bin");
        assert_eq!(config.architecture, "avr");
    }

    #[rstest]
    fn command_line_wins_over_settings() {
        let settings = Settings {
            dist_dir: Some("cache".into()),
            manifest: Some("cache/list.json".into()),
            bin_dir: None,
            default_architecture: Some("avr".to_owned()),
        };
        let cli = ConfigOverrides {
            architecture: Some("efm32".to_owned()),
            dist_dir: Some("downloads".into()),
            manifest: Some("catalog.json".into()),
            quiet: true,
            ..ConfigOverrides::default()
        };

        let config = ProvisionConfig::resolve("/work".into(), &settings, cli);

        assert_eq!(config.architecture, "efm32");
        assert_eq!(config.dist_dir, "/work/downloads");
        assert_eq!(config.manifest_path, "/work/catalog.json");
        assert!(config.quiet);
    }

    #[rstest]
    fn absolute_paths_are_kept() {
        let cli = ConfigOverrides {
            dist_dir: Some("/var/cache/toolfetch".into()),
            ..ConfigOverrides::default()
        };

        let config = ProvisionConfig::resolve("/work".into(), &Settings::default(), cli);

        assert_eq!(config.dist_dir, "/var/cache/toolfetch");
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let outcome = Settings::from_toml("dist = \"x\"\n");
        assert!(outcome.is_err(), "expected unknown keys to be rejected");
    }

    #[rstest]
    fn missing_settings_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join(DEFAULT_SETTINGS_FILE))
            .expect("UTF-8 path");

        let settings = Settings::load_if_present(&path).expect("defaults");

        assert_eq!(settings, Settings::default());
    }

    #[rstest]
    fn malformed_settings_file_is_a_config_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join(DEFAULT_SETTINGS_FILE))
            .expect("UTF-8 path");
        std::fs::write(&path, "dist_dir = [").expect("write settings");

        let err = Settings::load_if_present(&path).expect_err("malformed settings");

        assert!(matches!(err, ProvisionError::Config { .. }));
    }
}
