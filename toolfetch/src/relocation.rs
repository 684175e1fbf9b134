//! Post-pass relocation of flashing utilities.
//!
//! The ESP toolchains ship `esptool` and `mkspiffs` in their own
//! directories. After provisioning, the executables are moved into the
//! binaries directory and the now-redundant directories are removed.

use crate::error::{ProvisionError, Result};
use std::path::{Path, PathBuf};

/// Executables to move and directories to remove afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationPlan {
    /// Candidate executables, relative to the working directory. Candidates
    /// that do not exist are skipped.
    pub executables: &'static [&'static str],
    /// Directories removed once the executables have moved. Each must exist.
    pub source_dirs: &'static [&'static str],
}

/// Relocation applied to the ESP architectures.
pub const DEFAULT_RELOCATION: RelocationPlan = RelocationPlan {
    executables: &[
        "esptool/esptool",
        "esptool/esptool.exe",
        "mkspiffs/mkspiffs",
        "mkspiffs/mkspiffs.exe",
    ],
    source_dirs: &["mkspiffs", "esptool"],
};

/// Move the plan's executables from `work_dir` into `bin_dir`.
///
/// Returns the new locations of the moved executables. `bin_dir` is created
/// when missing and existing files in it are overwritten.
///
/// # Errors
///
/// Returns [`ProvisionError::MissingRelocationSource`] when a source
/// directory is absent, or [`ProvisionError::Io`] when a move or removal
/// fails.
pub fn relocate(plan: &RelocationPlan, work_dir: &Path, bin_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(bin_dir).map_err(ProvisionError::io(bin_dir))?;

    let mut moved = Vec::new();
    for relative in plan.executables {
        let source = work_dir.join(relative);
        if !source.is_file() {
            continue;
        }
        moved.push(move_into(&source, bin_dir)?);
    }

    for dir in plan.source_dirs {
        let path = work_dir.join(dir);
        if !path.is_dir() {
            return Err(ProvisionError::MissingRelocationSource { path });
        }
        std::fs::remove_dir_all(&path).map_err(ProvisionError::io(&path))?;
    }
    Ok(moved)
}

fn move_into(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let Some(file_name) = source.file_name() else {
        return Err(ProvisionError::Io {
            path: source.to_path_buf(),
            source: std::io::Error::other("executable path has no file name"),
        });
    };
    let dest = dest_dir.join(file_name);
    log::debug!("moving {} to {}", source.display(), dest.display());

    if let Err(rename_err) = std::fs::rename(source, &dest) {
        // Rename fails across filesystems; fall back to copy and delete.
        log::debug!("rename failed ({rename_err}); copying instead");
        std::fs::copy(source, &dest).map_err(ProvisionError::io(&dest))?;
        std::fs::remove_file(source).map_err(ProvisionError::io(source))?;
    }
    Ok(dest)
}
