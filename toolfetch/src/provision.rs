//! Provisioning orchestration.
//!
//! A run identifies the platform, selects the architecture's tools from the
//! manifest, and then for each tool in manifest order fetches, verifies, and
//! unpacks its archive. Architectures that request it finish with the
//! relocation pass. The first failure stops the run.

use crate::config::ProvisionConfig;
use crate::download::{ArchiveDownloader, HttpDownloader};
use crate::error::{ProvisionError, Result};
use crate::extraction::ArchiveKind;
use crate::fetch::{fetch_archive, verify_archive};
use crate::manifest::{ToolVariant, load_tools};
use crate::output::Reporter;
use crate::platform::{HostPlatform, identify_platform};
use crate::relocation::relocate;
use crate::unpack::{UnpackRequest, unpack_tool};
use std::io::Write;
use std::path::PathBuf;

/// A tool installed by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledTool {
    /// Archive file name from the manifest.
    pub archive_file_name: String,
    /// Directory the tool ended up in.
    pub directory: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Platform the tools were selected for.
    pub platform: HostPlatform,
    /// Manifest section the tools came from.
    pub section: &'static str,
    /// Installed tools in manifest order.
    pub installed: Vec<InstalledTool>,
    /// Executables moved into the binaries directory.
    pub relocated: Vec<PathBuf>,
}

/// Provision using the HTTP downloader.
///
/// # Errors
///
/// Returns the first [`ProvisionError`] encountered.
pub fn run(config: &ProvisionConfig, stderr: &mut dyn Write) -> Result<ProvisionReport> {
    let downloader = HttpDownloader::new(!config.quiet);
    provision(config, &downloader, stderr)
}

/// Provision the configured architecture using `downloader`.
///
/// Progress lines go to `stderr` unless the configuration is quiet.
///
/// # Errors
///
/// Returns the first [`ProvisionError`] encountered. Tools completed before
/// the failure stay installed.
pub fn provision(
    config: &ProvisionConfig,
    downloader: &dyn ArchiveDownloader,
    stderr: &mut dyn Write,
) -> Result<ProvisionReport> {
    let mut reporter = Reporter::new(stderr, config.quiet);

    let platform = match config.platform {
        Some(platform) => platform,
        None => identify_platform()?,
    };
    reporter.line(format_args!("Current platform is: {platform}"));

    let dist_dir = config.dist_dir.as_std_path();
    std::fs::create_dir_all(dist_dir).map_err(ProvisionError::io(dist_dir))?;

    let profile = config.profile();
    let tools = load_tools(
        config.manifest_path.as_std_path(),
        platform,
        &config.architecture,
    )?;
    log::info!(
        "provisioning {} tool(s) for {} on {platform}",
        tools.len(),
        profile.name
    );
    if let Some(banner) = profile.banner_line() {
        reporter.line(banner);
    }

    let mut installed = Vec::with_capacity(tools.len());
    for variant in &tools {
        let directory = provision_tool(config, variant, downloader, &mut reporter)?;
        installed.push(InstalledTool {
            archive_file_name: variant.archive_file_name.clone(),
            directory,
        });
    }

    let relocated = if profile.relocate {
        relocate(
            &config.relocation,
            config.work_dir.as_std_path(),
            config.bin_dir.as_std_path(),
        )?
    } else {
        Vec::new()
    };

    Ok(ProvisionReport {
        platform,
        section: profile.section,
        installed,
        relocated,
    })
}

fn provision_tool(
    config: &ProvisionConfig,
    variant: &ToolVariant,
    downloader: &dyn ArchiveDownloader,
    reporter: &mut Reporter<'_>,
) -> Result<PathBuf> {
    // Unsupported formats and unusable checksums are rejected before
    // anything is written.
    let kind = ArchiveKind::from_file_name(&variant.archive_file_name)?;
    let checksum = variant.expected_checksum()?;
    let archive_path = fetch_archive(variant, config.dist_dir.as_std_path(), downloader, reporter)?;
    verify_archive(&archive_path, &checksum)?;

    let request = UnpackRequest {
        archive_path: &archive_path,
        archive_name: &variant.archive_file_name,
        kind,
        architecture: &config.architecture,
        work_dir: config.work_dir.as_std_path(),
    };
    unpack_tool(&request, &config.overrides, reporter)
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
