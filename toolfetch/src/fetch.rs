//! Archive acquisition and verification.
//!
//! Archives are cached in the distribution directory under their manifest
//! file name. A cached archive is never downloaded again; it is verified
//! against the manifest checksum like a fresh download.

use crate::digest::compute_sha256;
use crate::download::ArchiveDownloader;
use crate::error::{ProvisionError, Result};
use crate::manifest::{Checksum, ToolVariant};
use crate::output::Reporter;
use std::path::{Path, PathBuf};

/// Ensure the archive for `variant` exists in `dist_dir`.
///
/// Creates `dist_dir` when missing. Downloads the archive only when no file
/// with its name is present.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`] when the distribution directory cannot be
/// created, or [`ProvisionError::Download`] when the transfer fails.
pub fn fetch_archive(
    variant: &ToolVariant,
    dist_dir: &Path,
    downloader: &dyn ArchiveDownloader,
    reporter: &mut Reporter<'_>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dist_dir).map_err(ProvisionError::io(dist_dir))?;
    let archive_path = dist_dir.join(&variant.archive_file_name);

    if archive_path.is_file() {
        reporter.line(format_args!(
            "Tool {} already downloaded",
            variant.archive_file_name
        ));
        return Ok(archive_path);
    }

    reporter.line(format_args!("Downloading {}", variant.archive_file_name));
    log::debug!("fetching {} into {}", variant.url, archive_path.display());
    downloader.download(&variant.url, &archive_path)?;
    Ok(archive_path)
}

/// Check that the file at `path` matches `checksum`.
///
/// # Errors
///
/// Returns [`ProvisionError::ChecksumMismatch`] when the digests differ, or
/// [`ProvisionError::Io`] when the file cannot be read.
pub fn verify_archive(path: &Path, checksum: &Checksum) -> Result<()> {
    let actual = compute_sha256(path).map_err(ProvisionError::io(path))?;
    if &actual != checksum.digest() {
        return Err(ProvisionError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: checksum.digest().to_string(),
            actual: actual.to_string(),
        });
    }
    log::debug!("verified {} ({checksum})", path.display());
    Ok(())
}
