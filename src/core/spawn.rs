//! # Spawn: fork, redirect, close inherited descriptors, exec.
//!
//! Everything the child needs is prepared in the parent ([`Prepared::new`]):
//! C strings, the `argv` pointer array and the list of descriptors to close.
//! Between `fork` and `exec` the child only makes raw syscalls; it never
//! allocates, locks or returns to Rust code that could.
//!
//! ## Child path
//! ```text
//! fork ─► dup2(stdin,0) dup2(stdout,1) dup2(stderr,2)
//!      ─► close_range(3, ~0)  (fallback: close each pre-listed fd)
//!      ─► execvp(argv[0], argv)
//!      ─► any failure: _exit(errno)
//! ```

use std::ffi::CString;
use std::os::fd::RawFd;
use std::ptr;

use nix::errno::Errno;
use nix::unistd::{ForkResult, fork};

use crate::error::SupervisorError;
use crate::process::ProcessSpec;

/// Upper bound of the descriptor sweep when `/proc/self/fd` is unavailable.
const MAX_SWEEP_FD: libc::c_long = 65_536;

/// Exec arguments and descriptor plan, built before forking.
pub(crate) struct Prepared {
    // Owns the strings `argv_ptrs` points into.
    _argv: Vec<CString>,
    argv_ptrs: Vec<*const libc::c_char>,
    stdio: [RawFd; 3],
    close: Option<Vec<RawFd>>,
}

impl Prepared {
    pub(crate) fn new(spec: &ProcessSpec, close_inherited: bool) -> Result<Self, SupervisorError> {
        if spec.argv().is_empty() {
            return Err(SupervisorError::InvalidArgv {
                reason: "empty argv",
            });
        }
        let argv = spec
            .argv()
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SupervisorError::InvalidArgv {
                reason: "argument contains a NUL byte",
            })?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        Ok(Self {
            _argv: argv,
            argv_ptrs,
            stdio: spec.stdio_fds(),
            close: close_inherited.then(inherited_fds),
        })
    }

    /// Forks and execs. Returns the child's pid in the parent; never returns in the child.
    pub(crate) fn spawn(&self) -> Result<i32, SupervisorError> {
        // SAFETY: the child branch only calls async-signal-safe functions on
        // data prepared before the fork, then execs or exits.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => Ok(child.as_raw()),
            Ok(ForkResult::Child) => unsafe { self.exec_child() },
            Err(source) => Err(SupervisorError::Spawn { source }),
        }
    }

    /// # Safety
    /// Must only be called in a freshly forked child.
    unsafe fn exec_child(&self) -> ! {
        for (target, &fd) in (0..).zip(self.stdio.iter()) {
            // SAFETY: plain syscall on integer descriptors.
            if fd != target && unsafe { libc::dup2(fd, target) } == -1 {
                exit_with_errno();
            }
        }
        if let Some(fds) = &self.close {
            close_inherited(fds);
        }
        // SAFETY: `argv_ptrs` is a NUL-terminated array of valid C strings.
        unsafe { libc::execvp(self.argv_ptrs[0], self.argv_ptrs.as_ptr()) };
        exit_with_errno()
    }
}

/// Descriptors above stderr currently open in this process.
///
/// Enumerated in the parent so the child does not have to read a directory.
fn inherited_fds() -> Vec<RawFd> {
    match std::fs::read_dir("/proc/self/fd") {
        Ok(dir) => dir
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str()?.parse::<RawFd>().ok())
            .filter(|&fd| fd > libc::STDERR_FILENO)
            .collect(),
        Err(_) => {
            // SAFETY: sysconf has no memory-safety preconditions.
            let max = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
            let max = if max <= 0 { MAX_SWEEP_FD } else { max.min(MAX_SWEEP_FD) };
            (libc::STDERR_FILENO + 1..max as RawFd).collect()
        }
    }
}

/// Closes every descriptor above stderr. Runs in the forked child.
fn close_inherited(fds: &[RawFd]) {
    // SAFETY: close_range only closes descriptors; no pointers involved.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_close_range,
            (libc::STDERR_FILENO + 1) as libc::c_uint,
            libc::c_uint::MAX,
            0 as libc::c_uint,
        )
    };
    if ret == 0 {
        return;
    }
    for &fd in fds {
        // SAFETY: closing an unknown or already closed descriptor yields EBADF, nothing else.
        unsafe { libc::close(fd) };
    }
}

fn exit_with_errno() -> ! {
    // SAFETY: _exit skips atexit handlers and buffered I/O owned by the parent image.
    unsafe { libc::_exit(Errno::last_raw()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_argv() {
        let spec = ProcessSpec::new(Vec::<String>::new());
        assert!(matches!(
            Prepared::new(&spec, false),
            Err(SupervisorError::InvalidArgv { .. })
        ));
    }

    #[test]
    fn rejects_interior_nul() {
        let spec = ProcessSpec::new(["echo", "a\0b"]);
        assert!(matches!(
            Prepared::new(&spec, false),
            Err(SupervisorError::InvalidArgv { .. })
        ));
    }

    #[test]
    fn argv_pointer_array_is_null_terminated() {
        let spec = ProcessSpec::new(["ls", "-l"]);
        let prepared = Prepared::new(&spec, false).unwrap();
        assert_eq!(prepared.argv_ptrs.len(), 3);
        assert!(prepared.argv_ptrs[2].is_null());
        assert!(prepared.close.is_none());
    }

    #[test]
    fn lists_open_descriptors_above_stderr() {
        let (read, _write) = nix::unistd::pipe().unwrap();
        let fds = inherited_fds();
        assert!(fds.iter().all(|&fd| fd > 2));
        assert!(fds.contains(&std::os::fd::AsRawFd::as_raw_fd(&read)));
    }
}
