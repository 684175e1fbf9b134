//! Tool manifest schema and selection.
//!
//! The manifest is a JSON catalog of toolchain archives:
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "name": "esp8266",
//!       "tools": [
//!         {
//!           "name": "xtensa-lx106-elf-gcc",
//!           "version": "1.20.0-26-gb404fb9-2",
//!           "systems": [
//!             {
//!               "host": "x86_64-pc-linux-gnu",
//!               "url": "https://example.com/xtensa-lx106-elf-linux64.tar.gz",
//!               "archiveFileName": "xtensa-lx106-elf-linux64.tar.gz",
//!               "checksum": "SHA-256:...",
//!               "size": "30262903"
//!             }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Packages are addressed by their `name` field; each architecture profile
//! names the package (section) that holds its tools.

mod checksum;

pub use checksum::{Checksum, ChecksumError};

use crate::architecture::resolve_profile;
use crate::platform::HostPlatform;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors arising from loading or querying the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        /// Path of the manifest file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization or field validation failed.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// No package in the manifest carries the requested section name.
    #[error("manifest has no package named \"{name}\"")]
    MissingSection {
        /// The section name that was looked up.
        name: String,
    },

    /// A selected tool carries a malformed or non-SHA-256 checksum.
    #[error("invalid checksum for {archive}: {source}")]
    InvalidChecksum {
        /// Archive file name of the offending tool.
        archive: String,
        /// Why the checksum was rejected.
        #[source]
        source: ChecksumError,
    },
}

/// The parsed tool catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Manifest sections, one per architecture family.
    pub packages: Vec<Package>,
}

/// One manifest section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Section name matched against architecture profiles.
    pub name: String,
    /// Tools offered by this section, in install order.
    #[serde(default)]
    pub tools: Vec<Tool>,
}

/// A tool with one downloadable variant per host platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tool {
    /// Tool name, used only for diagnostics.
    #[serde(default)]
    pub name: Option<String>,
    /// Tool version, used only for diagnostics.
    #[serde(default)]
    pub version: Option<String>,
    /// Per-platform download records.
    #[serde(default)]
    pub systems: Vec<ToolVariant>,
}

/// The platform-specific download record for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolVariant {
    /// Platform string this variant is built for.
    pub host: String,
    /// Download URL of the archive.
    pub url: String,
    /// File name of the archive in the distribution directory.
    pub archive_file_name: String,
    /// Expected archive checksum as written, for example `SHA-256:1a2b...`.
    ///
    /// Left unparsed so that tools for other platforms or sections cannot
    /// reject the manifest; see [`ToolVariant::expected_checksum`].
    pub checksum: String,
    /// Advertised archive size in bytes, as a decimal string.
    #[serde(default)]
    pub size: Option<String>,
}

impl ToolVariant {
    /// Parse the checksum of this variant.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidChecksum`] when the value lacks an
    /// algorithm prefix, names an algorithm other than SHA-256, or carries a
    /// malformed digest.
    pub fn expected_checksum(&self) -> Result<Checksum, ManifestError> {
        self.checksum
            .parse()
            .map_err(|source| ManifestError::InvalidChecksum {
                archive: self.archive_file_name.clone(),
                source,
            })
    }
}

impl Manifest {
    /// Find a section by name, ignoring ASCII case.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Package> {
        self.packages
            .iter()
            .find(|package| package.name.eq_ignore_ascii_case(name))
    }

    /// Select the variants of a section's tools that match `platform`.
    ///
    /// For each tool the first variant whose `host` equals the platform
    /// string is kept. Tools without such a variant are skipped. The result
    /// preserves manifest order.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MissingSection`] when no package is named
    /// `section`.
    pub fn select_tools(
        &self,
        section: &str,
        platform: HostPlatform,
    ) -> Result<Vec<ToolVariant>, ManifestError> {
        let package = self
            .section(section)
            .ok_or_else(|| ManifestError::MissingSection {
                name: section.to_owned(),
            })?;

        let selected = package
            .tools
            .iter()
            .filter_map(|tool| {
                let variant = tool
                    .systems
                    .iter()
                    .find(|variant| variant.host == platform.as_str());
                if variant.is_none() {
                    log::debug!(
                        "skipping {} {}: no build for {platform}",
                        tool.name.as_deref().unwrap_or("<unnamed tool>"),
                        tool.version.as_deref().unwrap_or_default()
                    );
                }
                variant.cloned()
            })
            .collect();
        Ok(selected)
    }
}

/// Parse a JSON string into a [`Manifest`].
///
/// Checksums are kept as written and only checked for the tools a run
/// selects.
///
/// # Errors
///
/// Returns [`ManifestError::Json`] when the JSON is malformed or a required
/// field is missing.
pub fn parse_manifest(json: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] when the file cannot be read, or
/// [`ManifestError::Json`] when it does not parse.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&json)
}

/// Load the tool variants for an architecture on a platform.
///
/// The architecture is resolved to its manifest section first; unknown
/// architectures use the default section.
///
/// # Errors
///
/// Returns any [`ManifestError`] raised while loading or selecting.
pub fn load_tools(
    path: &Path,
    platform: HostPlatform,
    architecture: &str,
) -> Result<Vec<ToolVariant>, ManifestError> {
    let manifest = load_manifest(path)?;
    let profile = resolve_profile(architecture);
    log::debug!(
        "architecture {architecture} uses manifest section {}",
        profile.section
    );
    manifest.select_tools(profile.section, platform)
}
