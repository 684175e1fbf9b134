//! Archive download over HTTP.
//!
//! Provides a trait-based abstraction for fetching toolchain archives so the
//! fetcher can be exercised without network access, plus the `ureq`-backed
//! production implementation.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Connection timeout for archive downloads.
///
/// No global timeout is set: compiler archives run to hundreds of megabytes.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Block size used when streaming a response body to disk.
const DOWNLOAD_BLOCK_SIZE: usize = 64 * 1024;

/// Trait for downloading archive files.
///
/// # Examples
///
/// ```
/// use toolfetch::download::HttpDownloader;
///
/// let downloader = HttpDownloader::new(false);
/// // Use downloader.download(url, dest) in production
/// # let _ = downloader;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveDownloader {
    /// Download `url` into the file at `dest`.
    ///
    /// Implementations must not leave a partial file at `dest` when the
    /// transfer fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the file write fails.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from archive downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered 404.
    #[error("archive not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP downloader using `ureq`.
///
/// Streams the body into `<dest>.part`, drawing a percentage progress bar on
/// stderr, and renames the file into place once the transfer completes.
#[derive(Debug, Clone, Copy)]
pub struct HttpDownloader {
    show_progress: bool,
}

impl HttpDownloader {
    /// Create a downloader, optionally drawing progress on stderr.
    #[must_use]
    pub const fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    fn draw_target(self) -> ProgressDrawTarget {
        if self.show_progress {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        }
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body();
        let progress = progress_bar(body.content_length(), self.draw_target());
        let mut reader = body.as_reader();
        save_body(url, &mut reader, dest, &progress)
    }
}

/// Build the percentage bar for a transfer of `total` bytes.
///
/// An unknown total draws nothing until the completion message.
fn progress_bar(total: Option<u64>, target: ProgressDrawTarget) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(total, target);
    let template = if total.is_some() { "{percent}%" } else { "{msg}" };
    apply_template(&bar, template);
    bar
}

fn apply_template(bar: &ProgressBar, template: &str) {
    match ProgressStyle::default_bar().template(template) {
        Ok(style) => bar.set_style(style),
        Err(err) => log::debug!("progress template {template:?} rejected: {err}"),
    }
}

/// Stream `reader` into `dest` through its `.part` file.
///
/// The partial file is removed when the transfer fails, and the bar is
/// finished with `Done` once the body is complete.
fn save_body(
    url: &str,
    reader: &mut dyn Read,
    dest: &Path,
    progress: &ProgressBar,
) -> Result<(), DownloadError> {
    let partial = partial_path(dest);
    let copied = copy_with_progress(reader, &partial, progress).map_err(|e| {
        // The partial file is useless after a failed transfer.
        let _ = std::fs::remove_file(&partial);
        progress.abandon();
        map_transfer_error(url, e)
    })?;
    apply_template(progress, "{msg}");
    progress.finish_with_message("Done");
    log::debug!("downloaded {copied} bytes from {url}");

    std::fs::rename(&partial, dest)?;
    Ok(())
}

/// Path of the in-progress download for `dest`.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Copy `reader` into a new file at `path` in fixed-size blocks.
fn copy_with_progress(
    reader: &mut dyn Read,
    path: &Path,
    progress: &ProgressBar,
) -> std::io::Result<u64> {
    let mut file = File::create(path)?;
    let mut buffer = vec![0u8; DOWNLOAD_BLOCK_SIZE];
    let mut copied = 0u64;
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        file.write_all(buffer.get(..read).unwrap_or_default())?;
        copied += read as u64;
        progress.inc(read as u64);
    }
    file.sync_all()?;
    Ok(copied)
}

/// Shared `ureq` agent with connection timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Map a failure while streaming the body.
///
/// Errors reading the body surface as I/O errors from ureq's reader; they
/// are reported against the URL rather than the local file.
fn map_transfer_error(url: &str, err: std::io::Error) -> DownloadError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied
        | std::io::ErrorKind::NotFound
        | std::io::ErrorKind::StorageFull => DownloadError::Io(err),
        _ => DownloadError::Http {
            url: url.to_owned(),
            reason: err.to_string(),
        },
    }
}
