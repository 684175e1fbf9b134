//! toolfetch library.
//!
//! Provisions embedded toolchains listed in a JSON package manifest: picks
//! the tools for the host platform and requested architecture, downloads and
//! verifies their archives, unpacks them into version-free directories, and
//! relocates the ESP flashing utilities. The `toolfetch` binary is a thin
//! wrapper over [`provision::run`].
//!
//! # Modules
//!
//! - [`architecture`] - Per-architecture manifest sections and banners
//! - [`canonical`] - Version-free directory names
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Settings file and resolved run configuration
//! - [`digest`] - SHA-256 digests of archives
//! - [`download`] - HTTP archive download with progress output
//! - [`error`] - Error types for provisioning runs
//! - [`extraction`] - Tar and zip extraction with path validation
//! - [`fetch`] - Archive caching and checksum verification
//! - [`manifest`] - Package manifest parsing and tool selection
//! - [`output`] - User-facing progress lines
//! - [`overrides`] - Exceptions to the generic unpack rule
//! - [`platform`] - Host platform identification
//! - [`provision`] - End-to-end provisioning
//! - [`relocation`] - Moving flashing utilities into the binaries directory
//! - [`unpack`] - Extraction into the working directory and renaming

pub mod architecture;
pub mod canonical;
pub mod cli;
pub mod config;
pub mod digest;
pub mod download;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod manifest;
pub mod output;
pub mod overrides;
pub mod platform;
pub mod provision;
pub mod relocation;
pub mod unpack;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
