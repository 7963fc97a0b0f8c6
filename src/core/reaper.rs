//! # Reaper: process-wide collection of terminated children.
//!
//! `SIGCHLD`, `waitpid(-1)` and the subreaper flag are process-wide, so there is
//! exactly one [`Reaper`] per process, shared by every [`Supervisor`](crate::Supervisor).
//! It runs on a dedicated thread (`procvisor-reaper`); the signal handler itself
//! only wakes that thread (via `signal-hook`), it never touches the records.
//!
//! ## Architecture
//! ```text
//! kernel ── SIGCHLD ──► signal-hook pipe ──► reaper thread
//!                                                │ lock (reap lock)
//!                                                ▼
//!                              loop waitpid(-1, WNOHANG) until 0 / ECHILD
//!                                                │ for each (pid, status)
//!                        ┌───────────────────────┼─────────────────────────┐
//!                        ▼                       ▼                         ▼
//!            supervisor #1 .claim()   supervisor #2 .claim()  ...   nobody claimed
//!                  (first match wins, tracked record resolved)   → earliest live
//!                                                                  supervisor .adopt()
//! ```
//!
//! ## Rules
//! - The reap lock serializes every `waitpid` in the crate and every fork+append
//!   in `create`, so a pid is reaped once and is always attributed to its
//!   tracked record, even when the child dies before `create` returns.
//! - Lock order: reap lock → store lock.
//! - Signals coalesce; each wake-up drains every pending child.
//! - A `waitpid` failure other than `ECHILD`/`EINTR` is fatal: the process exits
//!   with the errno.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::thread;

use nix::errno::Errno;
use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::Signals;

use super::shared::Shared;
use super::status::ProcessStatus;
use crate::error::SupervisorError;

static REAPER: OnceLock<Reaper> = OnceLock::new();
static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Registered supervisors, in registration order.
pub(crate) type Members = Vec<Weak<Shared>>;

/// Guard of the process-wide reap lock.
pub(crate) type ReapGuard<'a> = MutexGuard<'a, Members>;

pub(crate) struct Reaper {
    members: Mutex<Members>,
}

impl Reaper {
    fn new() -> Self {
        Self {
            members: Mutex::new(Vec::new()),
        }
    }

    /// Takes the reap lock.
    pub(crate) fn lock(&self) -> ReapGuard<'_> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a supervisor to the dispatch list.
    pub(crate) fn register(&self, shared: &Arc<Shared>) {
        let mut members = self.lock();
        members.retain(|m| m.strong_count() > 0);
        members.push(Arc::downgrade(shared));
    }

    fn run(&self, mut signals: Signals) {
        tracing::debug!(target: "procvisor", "reaper thread started");
        self.drain();
        for _ in signals.forever() {
            self.drain();
        }
        tracing::debug!(target: "procvisor", "reaper thread stopped");
    }

    /// Collects every terminated child and dispatches it.
    pub(crate) fn drain(&self) {
        let mut members = self.lock();
        let mut reaped = 0usize;
        loop {
            match try_wait(None) {
                Ok(Some((pid, status))) => {
                    reaped += 1;
                    dispatch(&members, pid, status);
                }
                Ok(None) | Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    tracing::error!(target: "procvisor", error = %errno, "waitpid(-1) failed; aborting");
                    std::process::exit(errno as i32);
                }
            }
        }
        if reaped > 0 {
            members.retain(|m| m.strong_count() > 0);
            tracing::trace!(target: "procvisor", reaped, "drained terminated children");
        }
    }
}

/// Hands one reaped child to its owner, or records it as an orphan.
fn dispatch(members: &Members, pid: i32, status: ProcessStatus) {
    let mut first_live = None;
    for shared in members.iter().filter_map(Weak::upgrade) {
        if shared.claim(pid, status) {
            return;
        }
        first_live.get_or_insert(shared);
    }
    match first_live {
        Some(shared) => {
            shared.adopt(pid, status);
        }
        None => {
            tracing::trace!(target: "procvisor", pid, status = status.code(), "reaped child with no live supervisor");
        }
    }
}

/// Non-blocking `waitpid`. `None` targets any child.
///
/// Returns `Ok(None)` while the target is still running.
pub(crate) fn try_wait(pid: Option<i32>) -> Result<Option<(i32, ProcessStatus)>, Errno> {
    let mut raw: libc::c_int = 0;
    // SAFETY: `raw` is a valid out-pointer for the duration of the call.
    let ret = unsafe { libc::waitpid(pid.unwrap_or(-1), &mut raw, libc::WNOHANG) };
    match Errno::result(ret)? {
        0 => Ok(None),
        reaped => Ok(Some((reaped, ProcessStatus::from_wait_status(raw)))),
    }
}

/// Returns the process-wide reaper, installing it on first use.
///
/// Installation declares this process a child subreaper, registers the
/// `SIGCHLD` handler and starts the reaper thread. A failed attempt leaves
/// nothing half-installed and may be retried by a later build.
pub(crate) fn install() -> Result<&'static Reaper, SupervisorError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    let reaper = REAPER.get_or_init(Reaper::new);
    if *installed {
        return Ok(reaper);
    }

    declare_subreaper().map_err(|e| SupervisorError::setup("subreaper", e))?;
    let signals = Signals::new([SIGCHLD]).map_err(|e| SupervisorError::setup("sigchld", e))?;
    thread::Builder::new()
        .name("procvisor-reaper".into())
        .spawn(move || reaper.run(signals))
        .map_err(|e| SupervisorError::setup("reaper thread", e))?;

    *installed = true;
    tracing::debug!(target: "procvisor", "child reaper installed");
    Ok(reaper)
}

fn declare_subreaper() -> Result<(), Errno> {
    // SAFETY: PR_SET_CHILD_SUBREAPER takes a single integer argument.
    let ret = unsafe { libc::prctl(libc::PR_SET_CHILD_SUBREAPER, 1 as libc::c_ulong, 0, 0, 0) };
    Errno::result(ret).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_wait_without_children_reports_echild() {
        // pid 1 is never our child
        assert_eq!(try_wait(Some(1)), Err(Errno::ECHILD));
    }

    #[test]
    fn install_is_idempotent() {
        let a = install().expect("first install") as *const Reaper;
        let b = install().expect("second install") as *const Reaper;
        assert_eq!(a, b);
    }
}
