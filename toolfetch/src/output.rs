//! User-facing progress output.

use std::io::Write;

/// Write a line to `stderr`, ignoring write failures.
///
/// Progress output is best effort; a closed stream must not abort a
/// provisioning run.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Writes progress lines unless quiet mode is active.
pub struct Reporter<'a> {
    stderr: &'a mut dyn Write,
    quiet: bool,
}

impl<'a> Reporter<'a> {
    /// Wrap `stderr`, suppressing output when `quiet` is set.
    pub fn new(stderr: &'a mut dyn Write, quiet: bool) -> Self {
        Self { stderr, quiet }
    }

    /// Write one progress line.
    pub fn line(&mut self, message: impl std::fmt::Display) {
        if !self.quiet {
            write_stderr_line(&mut *self.stderr, message);
        }
    }
}
