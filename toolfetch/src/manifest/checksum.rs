//! Algorithm-tagged checksums as written in the manifest.
//!
//! The manifest spells checksums as `ALGORITHM:hexdigest`, for example
//! `SHA-256:1a2b...`. Only SHA-256 is supported; the digest portion is what
//! verification compares.

use crate::digest::{DigestError, Sha256Digest};
use std::fmt;

/// Errors raised when a checksum string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecksumError {
    /// The value has no `algorithm:` prefix.
    #[error("checksum \"{value}\" is missing an algorithm prefix")]
    MissingAlgorithm {
        /// The rejected checksum string.
        value: String,
    },

    /// The algorithm is not SHA-256.
    #[error("unsupported checksum algorithm \"{algorithm}\"; expected SHA-256")]
    UnsupportedAlgorithm {
        /// The rejected algorithm label.
        algorithm: String,
    },

    /// The digest portion is malformed.
    #[error(transparent)]
    Digest(#[from] DigestError),
}

/// A parsed `SHA-256:hexdigest` checksum.
///
/// # Examples
///
/// ```
/// use toolfetch::manifest::Checksum;
///
/// let value = format!("SHA-256:{}", "0".repeat(64));
/// let checksum: Checksum = value.parse().expect("valid checksum");
/// assert_eq!(checksum.digest().as_str(), "0".repeat(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: String,
    digest: Sha256Digest,
}

impl Checksum {
    /// The expected digest.
    #[must_use]
    pub fn digest(&self) -> &Sha256Digest {
        &self.digest
    }
}

impl std::str::FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (algorithm, hex) =
            value
                .split_once(':')
                .ok_or_else(|| ChecksumError::MissingAlgorithm {
                    value: value.to_owned(),
                })?;
        if !is_sha256_label(algorithm) {
            return Err(ChecksumError::UnsupportedAlgorithm {
                algorithm: algorithm.to_owned(),
            });
        }
        Ok(Self {
            algorithm: algorithm.to_owned(),
            digest: Sha256Digest::try_from(hex)?,
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

fn is_sha256_label(algorithm: &str) -> bool {
    algorithm.eq_ignore_ascii_case("SHA-256") || algorithm.eq_ignore_ascii_case("SHA256")
}
