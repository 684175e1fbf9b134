//! Per-tool exceptions to the generic unpack-and-rename rule.
//!
//! Most archives unpack into the working directory and are renamed to their
//! canonical name. A few toolchains ship archives whose layout needs a
//! dedicated destination; those cases are listed in [`DEFAULT_OVERRIDES`].

use crate::extraction::ArchiveKind;

/// Which tools an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSelector {
    /// An archive with exactly this file name.
    ArchiveName(&'static str),
    /// Archives of one kind provisioned for one architecture.
    ArchitectureKind {
        /// Architecture name as given on the command line.
        architecture: &'static str,
        /// Archive kind the override is limited to.
        kind: ArchiveKind,
    },
}

impl OverrideSelector {
    fn matches(self, archive_name: &str, kind: ArchiveKind, architecture: &str) -> bool {
        match self {
            Self::ArchiveName(name) => name == archive_name,
            Self::ArchitectureKind {
                architecture: arch,
                kind: wanted,
            } => arch == architecture && wanted == kind,
        }
    }
}

/// How the extracted directory is named after unpacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenamePolicy {
    /// Rename the archive's top-level directory to its canonical name.
    Canonicalize,
    /// The destination directory is the final directory; do not rename.
    KeepDestination,
}

/// An exception to the generic unpack rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOverride {
    /// Tools this override applies to.
    pub selector: OverrideSelector,
    /// Subdirectory of the working directory to extract into.
    pub destination: &'static str,
    /// Naming rule applied after extraction.
    pub rename: RenamePolicy,
}

/// Built-in overrides.
///
/// - The Windows build of GNU Arm Embedded 7-2017-q4 is a flat zip, so it is
///   extracted into its own `gcc-arm-none-eabi` directory.
/// - OpenCPU zip toolchains are extracted straight into
///   `arm-none-eabi-opencpu`, which is also their final name.
pub const DEFAULT_OVERRIDES: &[ToolOverride] = &[
    ToolOverride {
        selector: OverrideSelector::ArchiveName("gcc-arm-none-eabi-7-2017-q4-major-win32.zip"),
        destination: "gcc-arm-none-eabi",
        rename: RenamePolicy::Canonicalize,
    },
    ToolOverride {
        selector: OverrideSelector::ArchitectureKind {
            architecture: "opencpu",
            kind: ArchiveKind::Zip,
        },
        destination: "arm-none-eabi-opencpu",
        rename: RenamePolicy::KeepDestination,
    },
];

/// Find the first override in `overrides` that applies to a tool.
#[must_use]
pub fn find_override<'a>(
    overrides: &'a [ToolOverride],
    archive_name: &str,
    kind: ArchiveKind,
    architecture: &str,
) -> Option<&'a ToolOverride> {
    overrides
        .iter()
        .find(|candidate| candidate.selector.matches(archive_name, kind, architecture))
}
