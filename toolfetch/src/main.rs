//! toolfetch CLI entrypoint.
//!
//! Provisions the toolchain for one architecture into the working directory
//! and exits non-zero on the first failure.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;
use toolfetch::cli::Cli;
use toolfetch::error::{ProvisionError, Result};
use toolfetch::output::write_stderr_line;
use toolfetch::provision::{ProvisionReport, run as provision};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let cwd = current_dir()?;
    let config = cli.resolve(&cwd)?;
    let report = provision(&config, stderr)?;
    log_summary(&report);
    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|source| ProvisionError::Io {
        path: ".".into(),
        source,
    })?;
    Utf8PathBuf::try_from(cwd).map_err(|e| ProvisionError::Io {
        path: e.as_path().to_path_buf(),
        source: std::io::Error::other("current directory is not valid UTF-8"),
    })
}

fn log_summary(report: &ProvisionReport) {
    for tool in &report.installed {
        log::info!(
            "{} installed in {}",
            tool.archive_file_name,
            tool.directory.display()
        );
    }
    if !report.relocated.is_empty() {
        log::info!("relocated {} executable(s)", report.relocated.len());
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
