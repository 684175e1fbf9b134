//! Archive extraction for toolchain archives.
//!
//! Supports gzip- and bzip2-compressed tarballs and zip files, selected by
//! file name suffix. Every entry path is checked before it is written so an
//! archive cannot escape the destination directory.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The archive file name has no supported suffix.
    #[error("unsupported archive type: {file_name}; expected .tar.gz, .zip, or .tar.bz2")]
    Unsupported {
        /// The rejected file name.
        file_name: String,
    },

    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container is malformed.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to escape the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no entries.
    #[error("archive {archive} contains no entries")]
    EmptyArchive {
        /// The archive that was opened.
        archive: PathBuf,
    },
}

/// Container formats understood by the unpacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.tar.gz`
    TarGz,
    /// `.zip`
    Zip,
    /// `.tar.bz2`
    TarBz2,
}

impl ArchiveKind {
    /// Classify an archive by its file name.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Unsupported`] for any other suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolfetch::extraction::ArchiveKind;
    ///
    /// let kind = ArchiveKind::from_file_name("mkspiffs-0.2.0-linux64.tar.gz").expect("supported");
    /// assert_eq!(kind, ArchiveKind::TarGz);
    /// assert!(ArchiveKind::from_file_name("tool.7z").is_err());
    /// ```
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        if file_name.ends_with(".tar.gz") {
            Ok(Self::TarGz)
        } else if file_name.ends_with(".zip") {
            Ok(Self::Zip)
        } else if file_name.ends_with(".tar.bz2") {
            Ok(Self::TarBz2)
        } else {
            Err(ExtractionError::Unsupported {
                file_name: file_name.to_owned(),
            })
        }
    }
}

/// Extract `archive_path` into `dest_dir`.
///
/// Returns the archive's top-level directory name: the first normal path
/// component of its first entry.
///
/// # Errors
///
/// Returns [`ExtractionError::PathTraversal`] if an entry escapes
/// `dest_dir`, [`ExtractionError::EmptyArchive`] if there are no entries, or
/// an I/O or zip error.
pub fn extract_archive(
    kind: ArchiveKind,
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<String, ExtractionError> {
    let file = File::open(archive_path)?;
    fs::create_dir_all(dest_dir)?;
    let dest = Destination {
        dir: dest_dir,
        root: dest_dir.canonicalize()?,
    };
    let top_level = match kind {
        ArchiveKind::TarGz => extract_tar(flate2::read::GzDecoder::new(file), &dest)?,
        ArchiveKind::TarBz2 => extract_tar(bzip2::read::BzDecoder::new(file), &dest)?,
        ArchiveKind::Zip => extract_zip(file, &dest)?,
    };
    top_level.ok_or_else(|| ExtractionError::EmptyArchive {
        archive: archive_path.to_path_buf(),
    })
}

/// Extraction directory as given and with symlinks resolved.
struct Destination<'a> {
    dir: &'a Path,
    root: PathBuf,
}

impl Destination<'_> {
    /// Reject `entry_path` when one of its parent directories on disk is a
    /// symlink resolving outside the destination.
    fn check_parents(&self, entry_path: &Path) -> Result<(), ExtractionError> {
        let Some(parent) = entry_path.parent() else {
            return Ok(());
        };
        let mut current = self.dir.to_path_buf();
        for component in parent.components() {
            current.push(component);
            let is_link = fs::symlink_metadata(&current)
                .is_ok_and(|meta| meta.file_type().is_symlink());
            let inside = || {
                current
                    .canonicalize()
                    .is_ok_and(|resolved| resolved.starts_with(&self.root))
            };
            if is_link && !inside() {
                return Err(ExtractionError::PathTraversal {
                    path: entry_path.display().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn extract_tar<R: Read>(
    reader: R,
    dest: &Destination<'_>,
) -> Result<Option<String>, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut top_level = None;

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;
        let link_target = if entry.header().entry_type().is_symlink() {
            entry.link_name()?
        } else {
            None
        };
        if let Some(target) = link_target {
            validate_link_target(&entry_path, &target)?;
        }
        dest.check_parents(&entry_path)?;
        if top_level.is_none() {
            top_level = first_component(&entry_path);
        }

        // `unpack_in` also refuses entries that resolve outside `dest`.
        if !entry.unpack_in(dest.dir)? {
            return Err(ExtractionError::PathTraversal {
                path: entry_path.display().to_string(),
            });
        }
    }

    Ok(top_level)
}

fn extract_zip(file: File, dest: &Destination<'_>) -> Result<Option<String>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(file)?;
    let mut top_level = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_path = entry
            .enclosed_name()
            .ok_or_else(|| ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            })?;

        validate_entry_path(&entry_path)?;
        dest.check_parents(&entry_path)?;
        if top_level.is_none() {
            top_level = first_component(&entry_path);
        }

        let dest_path = dest.dir.join(&entry_path);
        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if entry.is_symlink() {
            let mut target = String::new();
            entry.read_to_string(&mut target)?;
            validate_link_target(&entry_path, Path::new(&target))?;
            create_symlink(Path::new(&target), &dest_path)?;
            continue;
        }
        let mut output = File::create(&dest_path)?;
        io::copy(&mut entry, &mut output)?;
        restore_permissions(&dest_path, entry.unix_mode())?;
    }

    Ok(top_level)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    log::warn!(
        "skipping symlink {} -> {}: not supported on this platform",
        link.display(),
        target.display()
    );
    Ok(())
}

#[cfg(unix)]
fn restore_permissions(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn restore_permissions(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

/// First normal component of an entry path, skipping a leading `./`.
fn first_component(path: &Path) -> Option<String> {
    path.components().find_map(|component| match component {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that a symlink at `entry_path` pointing at `target` stays inside
/// the destination directory.
fn validate_link_target(entry_path: &Path, target: &Path) -> Result<(), ExtractionError> {
    let escape = || ExtractionError::PathTraversal {
        path: format!("{} -> {}", entry_path.display(), target.display()),
    };
    let mut depth = entry_path.parent().map_or(0, |parent| {
        parent
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .count()
    });
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(escape)?,
            Component::RootDir | Component::Prefix(_) => return Err(escape()),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
