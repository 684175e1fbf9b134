//! Unpacking verified archives into the working directory.
//!
//! The generic rule extracts an archive into the working directory and
//! renames its top-level directory to the canonical name. Entries in the
//! override table change the extraction destination and, for some tools,
//! skip the rename.

use crate::canonical::canonical_name;
use crate::error::{ProvisionError, Result};
use crate::extraction::{ArchiveKind, extract_archive};
use crate::output::Reporter;
use crate::overrides::{RenamePolicy, ToolOverride, find_override};
use std::path::{Path, PathBuf};

/// One archive to unpack.
#[derive(Debug, Clone, Copy)]
pub struct UnpackRequest<'a> {
    /// Location of the verified archive.
    pub archive_path: &'a Path,
    /// Archive file name as listed in the manifest.
    pub archive_name: &'a str,
    /// Format of the archive.
    pub kind: ArchiveKind,
    /// Architecture being provisioned.
    pub architecture: &'a str,
    /// Directory tools are installed into.
    pub work_dir: &'a Path,
}

/// Unpack an archive and return the directory holding the tool.
///
/// # Errors
///
/// Returns [`ProvisionError::Extraction`] when the archive cannot be
/// unpacked, or [`ProvisionError::Io`] when creating the destination or
/// renaming fails.
pub fn unpack_tool(
    request: &UnpackRequest<'_>,
    overrides: &[ToolOverride],
    reporter: &mut Reporter<'_>,
) -> Result<PathBuf> {
    let rule = find_override(
        overrides,
        request.archive_name,
        request.kind,
        request.architecture,
    );
    let (destination, policy) = match rule {
        Some(rule) => {
            let destination = request.work_dir.join(rule.destination);
            std::fs::create_dir_all(&destination).map_err(ProvisionError::io(&destination))?;
            (destination, rule.rename)
        }
        None => (request.work_dir.to_path_buf(), RenamePolicy::Canonicalize),
    };

    reporter.line(format_args!("Extracting {}", request.archive_name));
    let dirname = extract_archive(request.kind, request.archive_path, &destination)?;

    match policy {
        RenamePolicy::KeepDestination => Ok(destination),
        RenamePolicy::Canonicalize => rename_to_canonical(&destination, &dirname, reporter),
    }
}

/// Rename `parent/dirname` to its canonical name and return the result.
///
/// An existing entry at the target is removed first. Names without a
/// canonical form, or already canonical, are left untouched.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`] when the old target cannot be removed or
/// the rename fails.
pub fn rename_to_canonical(
    parent: &Path,
    dirname: &str,
    reporter: &mut Reporter<'_>,
) -> Result<PathBuf> {
    let source = parent.join(dirname);
    let Some(canonical) = canonical_name(dirname) else {
        log::warn!("no canonical name for {dirname}; leaving it in place");
        return Ok(source);
    };
    if canonical == dirname {
        return Ok(source);
    }

    let target = parent.join(&canonical);
    reporter.line(format_args!("Renaming {dirname} to {canonical}"));
    remove_existing(&target)?;
    std::fs::rename(&source, &target).map_err(ProvisionError::io(&source))?;
    Ok(target)
}

fn remove_existing(target: &Path) -> Result<()> {
    let Ok(metadata) = std::fs::symlink_metadata(target) else {
        return Ok(());
    };
    log::debug!("replacing previous install at {}", target.display());
    let removal = if metadata.is_dir() {
        std::fs::remove_dir_all(target)
    } else {
        std::fs::remove_file(target)
    };
    removal.map_err(ProvisionError::io(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::DEFAULT_OVERRIDES;
    use crate::test_support::{TestEntry, write_tar_gz, write_zip};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn unpack(
        work_dir: &Path,
        archive_path: &Path,
        architecture: &str,
        out: &mut Vec<u8>,
    ) -> Result<PathBuf> {
        let archive_name = archive_path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("archive name");
        let kind = ArchiveKind::from_file_name(archive_name).expect("supported archive");
        let request = UnpackRequest {
            archive_path,
            archive_name,
            kind,
            architecture,
            work_dir,
        };
        let mut reporter = Reporter::new(out, false);
        unpack_tool(&request, DEFAULT_OVERRIDES, &mut reporter)
    }

    #[rstest]
    fn generic_archive_is_renamed_to_canonical_name(temp: TempDir) {
        let archive = temp.path().join("xtensa.tar.gz");
        write_tar_gz(
            &archive,
            &[
                TestEntry::dir("xtensa-lx106-elf-gcc-1.22.0-92-g8facf4c-5.2.0/"),
                TestEntry::executable(
                    "xtensa-lx106-elf-gcc-1.22.0-92-g8facf4c-5.2.0/bin/xtensa-lx106-elf-gcc",
                    b"gcc",
                ),
            ],
        )
        .expect("write archive");
        let work = temp.path().join("work");
        std::fs::create_dir_all(&work).expect("create work dir");
        let mut out = Vec::new();

        let dir = unpack(&work, &archive, "esp8266", &mut out).expect("unpacked");

        assert_eq!(dir, work.join("xtensa-lx106-elf-gcc"));
        assert!(dir.join("bin/xtensa-lx106-elf-gcc").is_file());
        assert_eq!(
            String::from_utf8(out).expect("UTF-8"),
            concat!(
                "Extracting xtensa.tar.gz\n",
                "Renaming xtensa-lx106-elf-gcc-1.22.0-92-g8facf4c-5.2.0 to xtensa-lx106-elf-gcc\n",
            )
        );
    }

    #[rstest]
    fn previous_install_is_replaced(temp: TempDir) {
        let archive = temp.path().join("esptool.tar.gz");
        write_tar_gz(
            &archive,
            &[TestEntry::file("esptool-0.4.9-linux64/esptool", b"new")],
        )
        .expect("write archive");
        let work = temp.path().join("work");
        std::fs::create_dir_all(work.join("esptool")).expect("create stale dir");
        std::fs::write(work.join("esptool/stale"), b"old").expect("stale file");
        let mut out = Vec::new();

        let dir = unpack(&work, &archive, "esp8266", &mut out).expect("unpacked");

        assert!(!dir.join("stale").exists());
        assert_eq!(std::fs::read(dir.join("esptool")).expect("read"), b"new");
    }

    #[rstest]
    fn canonical_directory_is_left_alone(temp: TempDir) {
        let archive = temp.path().join("mkspiffs.tar.gz");
        write_tar_gz(&archive, &[TestEntry::file("mkspiffs/mkspiffs", b"bin")])
            .expect("write archive");
        let mut out = Vec::new();

        let dir = unpack(temp.path(), &archive, "esp8266", &mut out).expect("unpacked");

        assert_eq!(dir, temp.path().join("mkspiffs"));
        assert_eq!(
            String::from_utf8(out).expect("UTF-8"),
            "Extracting mkspiffs.tar.gz\n"
        );
    }

    #[rstest]
    fn opencpu_zip_keeps_fixed_destination(temp: TempDir) {
        let archive = temp.path().join("opencpu-gcc.zip");
        write_zip(
            &archive,
            &[TestEntry::executable("gcc-4.9/bin/arm-none-eabi-gcc", b"gcc")],
        )
        .expect("write archive");
        let mut out = Vec::new();

        let dir = unpack(temp.path(), &archive, "opencpu", &mut out).expect("unpacked");

        assert_eq!(dir, temp.path().join("arm-none-eabi-opencpu"));
        assert!(dir.join("gcc-4.9/bin/arm-none-eabi-gcc").is_file());
        assert!(!String::from_utf8(out).expect("UTF-8").contains("Renaming"));
    }

    #[rstest]
    fn arm_win32_zip_is_canonicalized_inside_its_destination(temp: TempDir) {
        let archive = temp
            .path()
            .join("gcc-arm-none-eabi-7-2017-q4-major-win32.zip");
        write_zip(
            &archive,
            &[TestEntry::file("bin/arm-none-eabi-gcc.exe", b"gcc")],
        )
        .expect("write archive");
        let mut out = Vec::new();

        let dir = unpack(temp.path(), &archive, "efm32", &mut out).expect("unpacked");

        assert_eq!(dir, temp.path().join("gcc-arm-none-eabi/bin"));
        assert!(dir.join("arm-none-eabi-gcc.exe").is_file());
    }

    #[rstest]
    fn name_without_canonical_form_is_kept(temp: TempDir) {
        let archive = temp.path().join("tools.tar.gz");
        write_tar_gz(&archive, &[TestEntry::file("1.0-tools/readme", b"x")])
            .expect("write archive");
        let mut out = Vec::new();

        let dir = unpack(temp.path(), &archive, "avr", &mut out).expect("unpacked");

        assert_eq!(dir, temp.path().join("1.0-tools"));
    }

    #[rstest]
    fn rename_replaces_a_file_in_the_way(temp: TempDir) {
        std::fs::create_dir_all(temp.path().join("avrdude-6.3")).expect("source dir");
        std::fs::write(temp.path().join("avrdude"), b"stale").expect("stale file");
        let mut out = Vec::new();
        let mut reporter = Reporter::new(&mut out, true);

        let dir = rename_to_canonical(temp.path(), "avrdude-6.3", &mut reporter)
            .expect("renamed");

        assert!(dir.is_dir());
        assert!(!temp.path().join("avrdude-6.3").exists());
    }
}
