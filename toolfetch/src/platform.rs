//! Host platform identification.
//!
//! Manifest variants are keyed by a platform string such as
//! `x86_64-pc-linux-gnu`. This module maps the host operating-system family
//! and pointer width onto that fixed set.

use std::fmt;
use std::str::FromStr;

/// Errors arising from platform identification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The host operating system is not one of the supported families.
    #[error("unrecognized host platform \"{system}\"; expected Darwin, Linux, or Windows")]
    Unrecognized {
        /// The system name that could not be mapped.
        system: String,
    },

    /// A platform string supplied by the user is not a known platform.
    #[error("unknown platform \"{value}\"; expected one of: {expected}")]
    UnknownPlatform {
        /// The rejected platform string.
        value: String,
        /// Comma-separated list of known platforms.
        expected: String,
    },
}

/// Operating-system families with toolchain builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemFamily {
    /// macOS.
    Darwin,
    /// Linux.
    Linux,
    /// Windows, including Cygwin.
    Windows,
}

impl SystemFamily {
    /// Classify a system name.
    ///
    /// Accepts both `uname`-style names (`Linux`, `Darwin`, `CYGWIN_NT-10.0`)
    /// and Rust's `std::env::consts::OS` values (`linux`, `macos`, `windows`).
    #[must_use]
    pub fn from_system_name(name: &str) -> Option<Self> {
        if name.contains("CYGWIN_NT") {
            return Some(Self::Windows);
        }
        match name.to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// Pointer width of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    /// 32-bit (or narrower) pointers.
    Bits32,
    /// Pointers wider than 32 bits.
    Bits64,
}

impl PointerWidth {
    /// Classify a pointer size in bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        if bits > 32 { Self::Bits64 } else { Self::Bits32 }
    }

    /// Pointer width of the running process.
    #[must_use]
    pub const fn host() -> Self {
        Self::from_bits(usize::BITS)
    }
}

/// A platform string that selects manifest variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    /// `i386-apple-darwin`
    DarwinI386,
    /// `x86_64-apple-darwin`
    DarwinX86_64,
    /// `i686-pc-linux-gnu`
    LinuxI686,
    /// `x86_64-pc-linux-gnu`
    LinuxX86_64,
    /// `i686-mingw32`, used for both Windows widths.
    Mingw32,
}

impl HostPlatform {
    /// Every platform this tool can identify.
    pub const ALL: [Self; 5] = [
        Self::DarwinI386,
        Self::DarwinX86_64,
        Self::LinuxI686,
        Self::LinuxX86_64,
        Self::Mingw32,
    ];

    /// Look up the platform for a system family and pointer width.
    #[must_use]
    pub const fn for_family(family: SystemFamily, width: PointerWidth) -> Self {
        match (family, width) {
            (SystemFamily::Darwin, PointerWidth::Bits32) => Self::DarwinI386,
            (SystemFamily::Darwin, PointerWidth::Bits64) => Self::DarwinX86_64,
            (SystemFamily::Linux, PointerWidth::Bits32) => Self::LinuxI686,
            (SystemFamily::Linux, PointerWidth::Bits64) => Self::LinuxX86_64,
            (SystemFamily::Windows, _) => Self::Mingw32,
        }
    }

    /// Return the manifest key for this platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DarwinI386 => "i386-apple-darwin",
            Self::DarwinX86_64 => "x86_64-apple-darwin",
            Self::LinuxI686 => "i686-pc-linux-gnu",
            Self::LinuxX86_64 => "x86_64-pc-linux-gnu",
            Self::Mingw32 => "i686-mingw32",
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostPlatform {
    type Err = PlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == value)
            .ok_or_else(|| PlatformError::UnknownPlatform {
                value: value.to_owned(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

/// Identify the platform for a system name and pointer width in bits.
///
/// # Errors
///
/// Returns [`PlatformError::Unrecognized`] when the system name is not a
/// Darwin, Linux, Windows, or Cygwin name.
///
/// # Examples
///
/// ```
/// use toolfetch::platform::{HostPlatform, platform_for};
///
/// let platform = platform_for("CYGWIN_NT-10.0", 64).expect("known system");
/// assert_eq!(platform, HostPlatform::Mingw32);
/// ```
pub fn platform_for(system: &str, pointer_bits: u32) -> Result<HostPlatform, PlatformError> {
    let family =
        SystemFamily::from_system_name(system).ok_or_else(|| PlatformError::Unrecognized {
            system: system.to_owned(),
        })?;
    Ok(HostPlatform::for_family(
        family,
        PointerWidth::from_bits(pointer_bits),
    ))
}

/// Identify the platform of the running host.
///
/// # Errors
///
/// Returns [`PlatformError::Unrecognized`] on hosts other than macOS, Linux,
/// or Windows.
pub fn identify_platform() -> Result<HostPlatform, PlatformError> {
    let platform = platform_for(std::env::consts::OS, usize::BITS)?;
    log::debug!(
        "identified host {} ({}-bit) as {platform}",
        std::env::consts::OS,
        usize::BITS
    );
    Ok(platform)
}
