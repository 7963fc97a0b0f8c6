//! # Process status and its numeric encoding.
//!
//! A record starts as [`ProcessStatus::Running`] and is resolved exactly once to
//! a terminal value. The numeric form follows the shell convention:
//!
//! ```text
//! Running        → -1
//! Exited(code)   → code          (0..=255)
//! Signaled(sig)  → sig + 128
//! (unknown id)   → -2            (INVALID_ID, never a ProcessStatus)
//! ```

use std::fmt;

use nix::sys::signal::Signal;

/// Numeric status reported for an id that does not name a tracked record.
pub const INVALID_ID: i32 = -2;

/// Liveness and exit outcome of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// Not yet reaped.
    Running,
    /// Terminated normally with the given exit code.
    Exited(u8),
    /// Terminated by the given signal number.
    Signaled(i32),
}

impl ProcessStatus {
    /// Numeric code for [`ProcessStatus::Running`].
    pub const RUNNING_CODE: i32 = -1;

    /// Returns the shell-style numeric code (`-1`, exit code, or `128 + signal`).
    ///
    /// # Example
    /// ```
    /// use procvisor::ProcessStatus;
    ///
    /// assert_eq!(ProcessStatus::Running.code(), -1);
    /// assert_eq!(ProcessStatus::Exited(3).code(), 3);
    /// assert_eq!(ProcessStatus::Signaled(9).code(), 137);
    /// ```
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            ProcessStatus::Running => Self::RUNNING_CODE,
            ProcessStatus::Exited(code) => i32::from(code),
            ProcessStatus::Signaled(sig) => sig + 128,
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, ProcessStatus::Running)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Decodes a raw `waitpid` status word.
    ///
    /// `waitpid` is never called with `WUNTRACED`/`WCONTINUED`, so every status
    /// that is not a normal exit is a termination by signal.
    pub(crate) fn from_wait_status(raw: libc::c_int) -> Self {
        if libc::WIFEXITED(raw) {
            ProcessStatus::Exited(libc::WEXITSTATUS(raw) as u8)
        } else {
            ProcessStatus::Signaled(libc::WTERMSIG(raw))
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Running => f.write_str("running"),
            ProcessStatus::Exited(code) => write!(f, "exited({code})"),
            ProcessStatus::Signaled(sig) => match Signal::try_from(*sig) {
                Ok(signal) => write!(f, "killed({})", signal.as_str()),
                Err(_) => write!(f, "killed({sig})"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_shell_convention() {
        assert_eq!(ProcessStatus::Running.code(), -1);
        assert_eq!(ProcessStatus::Exited(0).code(), 0);
        assert_eq!(ProcessStatus::Exited(255).code(), 255);
        assert_eq!(ProcessStatus::Signaled(libc::SIGKILL).code(), 137);
        assert_eq!(ProcessStatus::Signaled(libc::SIGTERM).code(), 143);
        assert!(INVALID_ID < ProcessStatus::RUNNING_CODE);
    }

    #[test]
    fn decodes_exit_status_word() {
        // exit(7): code in bits 8..16, low 7 bits zero
        assert_eq!(
            ProcessStatus::from_wait_status(7 << 8),
            ProcessStatus::Exited(7)
        );
        assert_eq!(ProcessStatus::from_wait_status(0), ProcessStatus::Exited(0));
    }

    #[test]
    fn decodes_signal_status_word() {
        assert_eq!(
            ProcessStatus::from_wait_status(libc::SIGKILL),
            ProcessStatus::Signaled(libc::SIGKILL)
        );
        // core dump flag does not change the signal number
        assert_eq!(
            ProcessStatus::from_wait_status(libc::SIGSEGV | 0x80),
            ProcessStatus::Signaled(libc::SIGSEGV)
        );
    }

    #[test]
    fn display_names_signals() {
        assert_eq!(ProcessStatus::Exited(1).to_string(), "exited(1)");
        assert_eq!(
            ProcessStatus::Signaled(libc::SIGKILL).to_string(),
            "killed(SIGKILL)"
        );
        assert!(ProcessStatus::Signaled(9).is_terminal());
        assert!(ProcessStatus::Running.is_running());
    }
}
