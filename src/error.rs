//! Error types used by the procvisor runtime.
//!
//! [`SupervisorError`] covers every failure the supervisor reports to its caller.
//! "Not found" style outcomes are not errors: an unknown id yields `None` from
//! [`Supervisor::status`](crate::Supervisor::status) and
//! [`SignalOutcome::Ignored`](crate::SignalOutcome::Ignored) from
//! [`Supervisor::send_signal`](crate::Supervisor::send_signal).
//!
//! Like the rest of the runtime, the error provides `as_label` / `as_message`
//! helpers for logs and metrics.

use nix::errno::Errno;
use thiserror::Error;

/// # Errors produced by the supervisor.
///
/// Failures inside a freshly forked child are never reported here: the child
/// terminates with the errno as its exit status and the caller observes it
/// through the usual status path.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// One-time setup failed (subreaper declaration, `SIGCHLD` registration,
    /// reaper thread). Unrecoverable; never retried internally.
    #[error("setup failed during {op}: {source}")]
    Setup {
        /// Setup step that failed.
        op: &'static str,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The argument vector cannot be turned into an exec call.
    #[error("invalid argv: {reason}")]
    InvalidArgv {
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Process duplication (`fork`) failed.
    #[error("fork failed: {source}")]
    Spawn {
        /// Underlying OS error.
        #[source]
        source: Errno,
    },

    /// A status probe failed for a reason other than "still running".
    #[error("waitpid({pid}) failed: {source}")]
    Wait {
        /// OS pid that was probed.
        pid: i32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },

    /// Signal delivery failed for a reason other than "process already gone".
    #[error("kill({pid}, {signal}) failed: {source}")]
    Signal {
        /// Target OS pid.
        pid: i32,
        /// Signal number that was sent.
        signal: i32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },

    /// The OS rejected the signal number (`EINVAL`).
    #[error("unsupported signal number {signal}")]
    InvalidSignal {
        /// The rejected signal number.
        signal: i32,
    },
}

impl SupervisorError {
    pub(crate) fn setup(op: &'static str, source: impl Into<std::io::Error>) -> Self {
        SupervisorError::Setup {
            op,
            source: source.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::SupervisorError;
    ///
    /// let err = SupervisorError::InvalidSignal { signal: 4242 };
    /// assert_eq!(err.as_label(), "invalid_signal");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Setup { .. } => "setup_failed",
            SupervisorError::InvalidArgv { .. } => "invalid_argv",
            SupervisorError::Spawn { .. } => "spawn_failed",
            SupervisorError::Wait { .. } => "wait_failed",
            SupervisorError::Signal { .. } => "signal_failed",
            SupervisorError::InvalidSignal { .. } => "invalid_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::Setup { op, source } => format!("setup: {op}: {source}"),
            SupervisorError::InvalidArgv { reason } => format!("argv: {reason}"),
            SupervisorError::Spawn { source } => format!("fork: {}", source.desc()),
            SupervisorError::Wait { pid, source } => {
                format!("waitpid pid={pid}: {}", source.desc())
            }
            SupervisorError::Signal {
                pid,
                signal,
                source,
            } => format!("kill pid={pid} signal={signal}: {}", source.desc()),
            SupervisorError::InvalidSignal { signal } => format!("signal {signal} unknown"),
        }
    }

    /// Returns the raw OS error code carried by this error, if any.
    ///
    /// Mirrors the exit code a C-style supervisor would terminate with.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            SupervisorError::Setup { source, .. } => source.raw_os_error(),
            SupervisorError::Spawn { source }
            | SupervisorError::Wait { source, .. }
            | SupervisorError::Signal { source, .. } => Some(*source as i32),
            SupervisorError::InvalidArgv { .. } | SupervisorError::InvalidSignal { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = SupervisorError::Wait {
            pid: 42,
            source: Errno::ECHILD,
        };
        assert_eq!(err.as_label(), "wait_failed");
        assert_eq!(err.os_code(), Some(libc::ECHILD));
        assert!(err.as_message().contains("pid=42"));
    }

    #[test]
    fn setup_keeps_os_code() {
        let err = SupervisorError::setup("prctl", Errno::EPERM);
        assert_eq!(err.as_label(), "setup_failed");
        assert_eq!(err.os_code(), Some(libc::EPERM));
        assert!(err.to_string().starts_with("setup failed during prctl"));
    }

    #[test]
    fn argument_errors_have_no_os_code() {
        let err = SupervisorError::InvalidArgv {
            reason: "empty argv",
        };
        assert_eq!(err.os_code(), None);
        assert_eq!(err.to_string(), "invalid argv: empty argv");
    }
}
