//! # Process specification for supervised execution.
//!
//! Defines [`ProcessSpec`]: the argument vector of a child plus where its
//! three standard streams come from.
//!
//! A stream is either inherited from the supervisor ([`Redirect::Inherit`]) or
//! taken from a descriptor the spec owns ([`Redirect::Fd`]). Owned descriptors
//! are closed in the supervisor once the child has been forked, so handing over
//! the write end of a pipe does not keep the pipe open.
//!
//! ## Example
//! ```rust
//! use procvisor::ProcessSpec;
//!
//! let spec = ProcessSpec::new(["sh", "-c", "echo hi"]);
//! assert_eq!(spec.name(), Some("sh"));
//! assert_eq!(spec.argv().len(), 3);
//! ```

use std::os::fd::{AsRawFd, OwnedFd, RawFd};

/// Source of one standard stream of a child.
#[derive(Debug, Default)]
pub enum Redirect {
    /// Use the supervisor's own descriptor with the same number.
    #[default]
    Inherit,
    /// Duplicate this descriptor onto the stream.
    Fd(OwnedFd),
}

impl Redirect {
    fn raw_or(&self, inherited: RawFd) -> RawFd {
        match self {
            Redirect::Inherit => inherited,
            Redirect::Fd(fd) => fd.as_raw_fd(),
        }
    }
}

impl From<OwnedFd> for Redirect {
    fn from(fd: OwnedFd) -> Self {
        Redirect::Fd(fd)
    }
}

/// What to execute and with which standard streams.
#[derive(Debug, Default)]
pub struct ProcessSpec {
    argv: Vec<String>,
    stdin: Redirect,
    stdout: Redirect,
    stderr: Redirect,
}

impl ProcessSpec {
    /// Creates a spec that inherits all three standard streams.
    ///
    /// `argv[0]` is both the program looked up in `PATH` and the display name.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns a new spec whose stdin reads from `fd`.
    pub fn with_stdin(mut self, fd: impl Into<OwnedFd>) -> Self {
        self.stdin = Redirect::Fd(fd.into());
        self
    }

    /// Returns a new spec whose stdout writes to `fd`.
    pub fn with_stdout(mut self, fd: impl Into<OwnedFd>) -> Self {
        self.stdout = Redirect::Fd(fd.into());
        self
    }

    /// Returns a new spec whose stderr writes to `fd`.
    pub fn with_stderr(mut self, fd: impl Into<OwnedFd>) -> Self {
        self.stderr = Redirect::Fd(fd.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Display name (`argv[0]`), if the argument vector is not empty.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Descriptors to duplicate onto 0, 1 and 2, in that order.
    pub(crate) fn stdio_fds(&self) -> [RawFd; 3] {
        [
            self.stdin.raw_or(libc::STDIN_FILENO),
            self.stdout.raw_or(libc::STDOUT_FILENO),
            self.stderr.raw_or(libc::STDERR_FILENO),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherits_by_default() {
        let spec = ProcessSpec::new(["true"]);
        assert_eq!(spec.stdio_fds(), [0, 1, 2]);
        assert_eq!(spec.name(), Some("true"));
    }

    #[test]
    fn empty_argv_has_no_name() {
        let spec = ProcessSpec::new(Vec::<String>::new());
        assert!(spec.name().is_none());
    }

    #[test]
    fn owned_descriptors_replace_streams() {
        let (read, write) = nix::unistd::pipe().expect("pipe");
        let (read_raw, write_raw) = (read.as_raw_fd(), write.as_raw_fd());
        let spec = ProcessSpec::new(["cat"]).with_stdin(read).with_stderr(write);
        assert_eq!(spec.stdio_fds(), [read_raw, 1, write_raw]);
    }
}
