//! SHA-256 digests for archive verification.
//!
//! Provides the validated [`Sha256Digest`] newtype and a streaming file
//! hasher that reads archives in fixed-size blocks.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Block size used when hashing archives.
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Errors raised when a digest string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The value is not a 64-character hexadecimal string.
    #[error("invalid SHA-256 digest: {reason}")]
    Invalid {
        /// Description of the validation failure.
        reason: String,
    },
}

/// A validated, lowercase hex-encoded SHA-256 digest.
///
/// Upper-case hex input is accepted and normalized to lowercase, so two
/// digests compare equal regardless of how the manifest spelled them.
///
/// # Examples
///
/// ```
/// use toolfetch::digest::Sha256Digest;
///
/// let digest = Sha256Digest::try_from("AB".repeat(32).as_str()).expect("valid digest");
/// assert_eq!(digest.as_str(), "ab".repeat(32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_sha256(value)?;
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_sha256(value: &str) -> Result<(), DigestError> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(DigestError::Invalid {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DigestError::Invalid {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}

/// Compute the SHA-256 digest of a file.
///
/// The file is read in [`HASH_BLOCK_SIZE`] blocks so large toolchain
/// archives never have to fit in memory.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> std::io::Result<Sha256Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest(format!("{:x}", hasher.finalize())))
}
