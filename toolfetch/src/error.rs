//! Error types for toolchain provisioning.
//!
//! Every failure is fatal to the run. Variants carry enough context for the
//! message printed by the CLI to tell the user what to do next.

use crate::download::DownloadError;
use crate::extraction::ExtractionError;
use crate::manifest::ManifestError;
use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The host platform could not be identified.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The manifest could not be loaded or queried.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// An archive download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// An archive could not be extracted, including unsupported formats.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A local archive does not match the manifest checksum.
    #[error(
        "hash mismatch for {path}: expected {expected}, got {actual}; delete the file and try again"
    )]
    ChecksumMismatch {
        /// The archive that failed verification.
        path: PathBuf,
        /// Digest declared in the manifest.
        expected: String,
        /// Digest computed from the file.
        actual: String,
    },

    /// A directory expected by the relocation pass does not exist.
    #[error("expected directory {path} not found during relocation")]
    MissingRelocationSource {
        /// The missing directory.
        path: PathBuf,
    },

    /// The settings file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config {
        /// Path of the settings file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    /// Build a closure that wraps an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Result type alias using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_mismatch_tells_user_to_delete_the_file() {
        let err = ProvisionError::ChecksumMismatch {
            path: PathBuf::from("dist/esptool-0.4.9-linux64.tar.gz"),
            expected: "a".repeat(64),
            actual: "b".repeat(64),
        };
        let msg = err.to_string();
        assert!(msg.contains("dist/esptool-0.4.9-linux64.tar.gz"));
        assert!(msg.contains("delete the file and try again"));
    }

    #[test]
    fn unsupported_archive_message_passes_through() {
        let err = ProvisionError::from(ExtractionError::Unsupported {
            file_name: "tool.7z".to_owned(),
        });
        assert!(err.to_string().contains("unsupported archive type: tool.7z"));
    }

    #[test]
    fn io_helper_preserves_source() {
        let wrap = ProvisionError::io("bin");
        let err = wrap(std::io::Error::other("denied"));
        assert!(err.to_string().contains("bin"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_relocation_source_names_the_directory() {
        let err = ProvisionError::MissingRelocationSource {
            path: PathBuf::from("mkspiffs"),
        };
        assert!(err.to_string().contains("mkspiffs"));
    }
}
