//! CLI argument definitions for toolfetch.
//!
//! Parsing lives here so the binary only orchestrates. [`Cli::resolve`] turns
//! parsed arguments and the settings file into a [`ProvisionConfig`].

use crate::config::{ConfigOverrides, DEFAULT_SETTINGS_FILE, ProvisionConfig, Settings};
use crate::error::Result;
use crate::platform::HostPlatform;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

/// Download, verify, and unpack embedded toolchains.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "toolfetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download, verify, and unpack embedded toolchains.\n\n",
    "Tools are listed in a JSON package manifest, grouped by architecture and ",
    "keyed by host platform. Archives are cached in the distribution directory, ",
    "checked against their SHA-256 digests, and unpacked into version-free ",
    "directories. For the ESP architectures, esptool and mkspiffs are moved ",
    "into the binaries directory afterwards.",
))]
#[command(after_help = concat!(
    "ARCHITECTURES:\n",
    "  esp8266   ESP8266 toolchain (default)\n",
    "  esp32     Uses the esp8266 manifest section\n",
    "  opencpu   OpenCPU ARM toolchain\n",
    "  avr       AVR toolchain\n",
    "  efm32     EFM32 ARM toolchain\n\n",
    "EXAMPLES:\n",
    "  Provision the default architecture:\n",
    "    $ toolfetch\n\n",
    "  Provision the AVR toolchain for 32-bit Windows:\n",
    "    $ toolfetch avr --platform i686-mingw32\n",
))]
pub struct Cli {
    /// Architecture to provision [default: esp8266].
    #[arg(value_name = "ARCH")]
    pub architecture: Option<String>,

    /// Settings file [default: toolfetch.toml in the working directory].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory tools are installed into [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// Directory holding downloaded archives [default: dist].
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<Utf8PathBuf>,

    /// Package manifest [default: <dist-dir>/package_list.json].
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Directory receiving relocated executables [default: bin].
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Provision for this platform instead of the detected host.
    #[arg(long, value_name = "TRIPLE")]
    pub platform: Option<HostPlatform>,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the run configuration relative to `cwd`.
    ///
    /// An explicit `--config` file must exist; the default settings file is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ProvisionError::Config`] when the settings
    /// file cannot be read or parsed.
    pub fn resolve(&self, cwd: &Utf8Path) -> Result<ProvisionConfig> {
        let work_dir = self
            .work_dir
            .as_ref()
            .map_or_else(|| cwd.to_path_buf(), |dir| cwd.join(dir));
        let settings = match &self.config {
            Some(path) => Settings::load(&cwd.join(path))?,
            None => Settings::load_if_present(&work_dir.join(DEFAULT_SETTINGS_FILE))?,
        };
        Ok(ProvisionConfig::resolve(
            work_dir,
            &settings,
            self.overrides(),
        ))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            architecture: self.architecture.clone(),
            dist_dir: self.dist_dir.clone(),
            manifest: self.manifest.clone(),
            bin_dir: self.bin_dir.clone(),
            platform: self.platform,
            quiet: self.quiet,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
