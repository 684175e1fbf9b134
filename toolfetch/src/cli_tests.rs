//! Tests for CLI parsing and configuration resolution.

use super::*;
use crate::error::ProvisionError;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["toolfetch"]);
    assert!(cli.architecture.is_none());
    assert!(cli.config.is_none());
    assert!(cli.work_dir.is_none());
    assert!(cli.dist_dir.is_none());
    assert!(cli.manifest.is_none());
    assert!(cli.bin_dir.is_none());
    assert!(cli.platform.is_none());
    assert!(!cli.quiet);
}

#[rstest]
#[case::avr("avr")]
#[case::efm32("efm32")]
#[case::unknown("riscv")]
fn cli_parses_architecture(#[case] arch: &str) {
    let cli = Cli::parse_from(["toolfetch", arch]);
    assert_eq!(cli.architecture.as_deref(), Some(arch));
}

#[test]
fn cli_parses_paths() {
    let cli = Cli::parse_from([
        "toolfetch",
        "-C",
        "/opt/tools",
        "--dist-dir",
        "cache",
        "-m",
        "cache/list.json",
        "--bin-dir",
        "tools/bin",
    ]);
    assert_eq!(cli.work_dir, Some(Utf8PathBuf::from("/opt/tools")));
    assert_eq!(cli.dist_dir, Some(Utf8PathBuf::from("cache")));
    assert_eq!(cli.manifest, Some(Utf8PathBuf::from("cache/list.json")));
    assert_eq!(cli.bin_dir, Some(Utf8PathBuf::from("tools/bin")));
}

#[test]
fn cli_parses_platform() {
    let cli = Cli::parse_from(["toolfetch", "--platform", "i686-mingw32"]);
    assert_eq!(cli.platform, Some(HostPlatform::Mingw32));
}

#[test]
fn cli_rejects_unknown_platform() {
    let outcome = Cli::try_parse_from(["toolfetch", "--platform", "riscv64-linux"]);
    assert!(outcome.is_err());
}

#[test]
fn cli_parses_quiet() {
    let cli = Cli::parse_from(["toolfetch", "-q"]);
    assert!(cli.quiet);
}

#[test]
fn resolve_uses_cwd_as_work_dir() {
    let temp = tempfile::tempdir().expect("temp dir");
    let cwd = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");

    let config = Cli::default().resolve(&cwd).expect("resolved");

    assert_eq!(config.work_dir, cwd);
    assert_eq!(config.dist_dir, cwd.join("dist"));
    assert_eq!(config.architecture, "esp8266");
}

#[test]
fn resolve_reads_default_settings_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let cwd = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    std::fs::write(
        cwd.join("toolfetch.toml"),
        "default_architecture = \"avr\"\nbin_dir = \"tools\"\n",
    )
    .expect("write settings");

    let config = Cli::default().resolve(&cwd).expect("resolved");

    assert_eq!(config.architecture, "avr");
    assert_eq!(config.bin_dir, cwd.join("tools"));
}

#[test]
fn resolve_prefers_command_line_architecture() {
    let temp = tempfile::tempdir().expect("temp dir");
    let cwd = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    std::fs::write(cwd.join("toolfetch.toml"), "default_architecture = \"avr\"\n")
        .expect("write settings");
    let cli = Cli::parse_from(["toolfetch", "efm32"]);

    let config = cli.resolve(&cwd).expect("resolved");

    assert_eq!(config.architecture, "efm32");
}

#[test]
fn resolve_requires_explicit_settings_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let cwd = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    let cli = Cli::parse_from(["toolfetch", "--config", "missing.toml"]);

    let err = cli.resolve(&cwd).expect_err("missing settings file");

    assert!(matches!(err, ProvisionError::Config { .. }));
}

#[test]
fn resolve_joins_relative_work_dir() {
    let cli = Cli::parse_from(["toolfetch", "-C", "sdk"]);

    let config = cli
        .resolve(Utf8Path::new("/nonexistent-root"))
        .expect("resolved");

    assert_eq!(config.work_dir, "/nonexistent-root/sdk");
    assert_eq!(config.manifest_path, "/nonexistent-root/sdk/dist/package_list.json");
}
