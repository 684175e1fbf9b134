//! Archive and manifest builders shared by unit and behaviour tests.

use crate::download::{ArchiveDownloader, DownloadError};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One entry of a test archive. Names ending in `/` are directories.
#[derive(Debug, Clone, Copy)]
pub struct TestEntry<'a> {
    /// Path inside the archive.
    pub name: &'a str,
    /// File contents; ignored for directories and symlinks.
    pub contents: &'a [u8],
    /// Unix permission bits.
    pub mode: u32,
    /// Target of a symbolic link entry.
    pub link_target: Option<&'a str>,
}

impl<'a> TestEntry<'a> {
    /// A directory entry.
    #[must_use]
    pub const fn dir(name: &'a str) -> Self {
        Self {
            name,
            contents: b"",
            mode: 0o755,
            link_target: None,
        }
    }

    /// A regular file entry with mode `0644`.
    #[must_use]
    pub const fn file(name: &'a str, contents: &'a [u8]) -> Self {
        Self {
            name,
            contents,
            mode: 0o644,
            link_target: None,
        }
    }

    /// An executable file entry with mode `0755`.
    #[must_use]
    pub const fn executable(name: &'a str, contents: &'a [u8]) -> Self {
        Self {
            name,
            contents,
            mode: 0o755,
            link_target: None,
        }
    }

    /// A symbolic link entry pointing at `target`.
    #[must_use]
    pub const fn symlink(name: &'a str, target: &'a str) -> Self {
        Self {
            name,
            contents: b"",
            mode: 0o777,
            link_target: Some(target),
        }
    }

    fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Return the lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Return the lowercase hex SHA-256 of the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn file_sha256_hex(path: &Path) -> io::Result<String> {
    Ok(sha256_hex(&std::fs::read(path)?))
}

/// Write a `.tar.gz` archive at `path`.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be written.
pub fn write_tar_gz(path: &Path, entries: &[TestEntry<'_>]) -> io::Result<()> {
    let encoder = flate2::write::GzEncoder::new(File::create(path)?, flate2::Compression::default());
    let encoder = append_tar_entries(encoder, entries)?;
    encoder.finish()?.flush()
}

/// Write a `.tar.bz2` archive at `path`.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be written.
pub fn write_tar_bz2(path: &Path, entries: &[TestEntry<'_>]) -> io::Result<()> {
    let encoder = bzip2::write::BzEncoder::new(File::create(path)?, bzip2::Compression::default());
    let encoder = append_tar_entries(encoder, entries)?;
    encoder.finish()?.flush()
}

fn append_tar_entries<W: Write>(writer: W, entries: &[TestEntry<'_>]) -> io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_mode(entry.mode);
        if let Some(target) = entry.link_target {
            // Literal link names allow absolute targets.
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_link_name_literal(target)?;
            builder.append_data(&mut header, entry.name, io::empty())?;
        } else if entry.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder.append_data(&mut header, entry.name, io::empty())?;
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(entry.contents.len() as u64);
            header.set_cksum();
            builder.append_data(&mut header, entry.name, entry.contents)?;
        }
    }
    builder.into_inner()
}

/// Write a `.zip` archive at `path`.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be written.
pub fn write_zip(path: &Path, entries: &[TestEntry<'_>]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(path)?);
    for entry in entries {
        let options =
            zip::write::SimpleFileOptions::default().unix_permissions(entry.mode);
        if let Some(target) = entry.link_target {
            writer
                .add_symlink(entry.name, target, options)
                .map_err(io::Error::other)?;
        } else if entry.is_dir() {
            writer.add_directory(entry.name, options).map_err(io::Error::other)?;
        } else {
            writer.start_file(entry.name, options).map_err(io::Error::other)?;
            writer.write_all(entry.contents)?;
        }
    }
    writer.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Build a one-section manifest whose tools each have one variant.
///
/// Each tool is `(host, archive_file_name, sha256_hex)`.
#[must_use]
pub fn manifest_json(section: &str, tools: &[(&str, &str, &str)]) -> String {
    let tools: Vec<serde_json::Value> = tools
        .iter()
        .map(|(host, archive, sha)| {
            serde_json::json!({
                "name": archive,
                "systems": [{
                    "host": host,
                    "url": format!("https://example.test/{archive}"),
                    "archiveFileName": archive,
                    "checksum": format!("SHA-256:{sha}"),
                }]
            })
        })
        .collect();
    serde_json::json!({ "packages": [{ "name": section, "tools": tools }] }).to_string()
}

/// Downloader serving archives from a local directory.
///
/// The last segment of each URL names the file to copy. Unknown files are
/// reported as [`DownloadError::NotFound`].
#[derive(Debug)]
pub struct LocalDownloader {
    root: PathBuf,
    requests: RefCell<Vec<String>>,
}

impl LocalDownloader {
    /// Serve files from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ArchiveDownloader for LocalDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        let name = url.rsplit('/').next().unwrap_or(url);
        let source = self.root.join(name);
        if !source.is_file() {
            return Err(DownloadError::NotFound {
                url: url.to_owned(),
            });
        }
        std::fs::copy(source, dest)?;
        Ok(())
    }
}
