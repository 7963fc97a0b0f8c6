//! # Supervisor: spawns children, tracks their status, signals and waits.
//!
//! The [`Supervisor`] owns one record store (tracked + orphans) and an event
//! bus; a listener task forwards bus events to the subscriber workers until
//! [`shutdown`](Supervisor::shutdown). Terminations are collected by the process-wide
//! reaper thread and dispatched to the supervisor that created the pid.
//!
//! ## High-level architecture
//! ```text
//! create(spec) ── reap lock ──► fork ─► child: dup2 / close fds / execvp
//!                                 └──► parent: push tracked record (Running) ─► ProcessSpawned
//!
//! SIGCHLD ──► reaper thread ── reap lock ──► waitpid(-1) loop ──► claim / adopt
//!                                                                   │
//! status(id) ─────── reap lock ──► waitpid(pid, WNOHANG) ──► resolve ┤
//!                                                                   ▼
//! wait_all() ◄──── generation watch ◄── ProcessExited / OrphanReaped ┘
//! ```
//!
//! ## Rules
//! - Ids are `0..len()` in creation order and stay valid for the supervisor's lifetime.
//! - A terminal status is cached: no syscall is made for it again.
//! - A signal is never sent to a terminal record (its pid may have been reused).
//! - Only `wait_all` suspends; every other operation is non-blocking.
//!
//! ## Example
//! ```rust,no_run
//! use procvisor::{Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), procvisor::SupervisorError> {
//!     let sup = Supervisor::builder(SupervisorConfig::default()).build()?;
//!
//!     let ok = sup.spawn(["true"])?;
//!     let killed = sup.spawn(["sh", "-c", "kill -9 $$"])?;
//!
//!     sup.wait_all().await?;
//!     assert_eq!(sup.status_code(ok)?, 0);
//!     assert_eq!(sup.status_code(killed)?, 137);
//!     print!("{}", sup.render());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use nix::errno::Errno;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::builder::SupervisorBuilder;
use super::config::SupervisorConfig;
use super::reaper::{self, Reaper};
use super::shared::Shared;
use super::spawn::Prepared;
use super::status::{INVALID_ID, ProcessStatus};
use super::store::Snapshot;
use crate::error::SupervisorError;
use crate::events::{Event, EventKind};
use crate::process::ProcessSpec;
use crate::subscribers::SubscriberSet;

/// Result of [`Supervisor::send_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The kernel accepted the signal.
    Delivered,
    /// The process vanished before delivery (`ESRCH`); treated as success.
    Gone,
    /// Unknown id or already terminal record; nothing was sent.
    Ignored,
}

/// Spawns and tracks child processes; see the [module docs](self).
pub struct Supervisor {
    cfg: SupervisorConfig,
    shared: Arc<Shared>,
    reaper: &'static Reaper,
    token: CancellationToken,
}

impl Supervisor {
    /// Returns a builder; `build()` performs the one-time setup.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        shared: Arc<Shared>,
        reaper: &'static Reaper,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            shared,
            reaper,
            token,
        }
    }

    /// Forwards bus events to `set` until shutdown, then flushes its workers.
    ///
    /// Pending bus events win over cancellation, so everything published
    /// before [`shutdown`](Self::shutdown) (including `ShutdownRequested`)
    /// still reaches the subscribers.
    pub(crate) fn spawn_listener(&self, set: SubscriberSet) {
        let mut rx = self.shared.bus().subscribe();
        let token = self.token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => {
                            set.emit(&ev);
                            if ev.kind == EventKind::ShutdownRequested {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {
                            set.emit(&Event::subscriber_overflow("bus-listener", "lagged"));
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        });
    }

    /// Configuration this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Creates a receiver for this supervisor's events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus().subscribe()
    }

    /// Launches `spec` and returns its supervisor id.
    ///
    /// The child's standard streams are redirected per `spec`, every other
    /// inherited descriptor is closed (unless disabled in the config), and
    /// `argv[0]` is executed via `PATH` lookup. If any of that fails inside
    /// the child, the child exits with the errno as its status, so a missing
    /// program shows up as exit code `2` (`ENOENT`).
    ///
    /// ### Errors
    /// - [`SupervisorError::InvalidArgv`] for an empty argv or a NUL byte
    /// - [`SupervisorError::Spawn`] when `fork` fails
    pub fn create(&self, spec: ProcessSpec) -> Result<usize, SupervisorError> {
        let prepared = Prepared::new(&spec, self.cfg.close_inherited_fds)?;
        let name: Arc<str> = Arc::from(spec.name().unwrap_or_default());

        let _reap = self.reaper.lock();
        let pid = prepared.spawn()?;
        Ok(self.shared.track(pid, name))
    }

    /// Launches `argv` with inherited standard streams.
    pub fn spawn<I, S>(&self, argv: I) -> Result<usize, SupervisorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.create(ProcessSpec::new(argv))
    }

    /// Number of tracked records (the next id to be issued).
    pub fn len(&self) -> usize {
        self.shared.store().tracked_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the status of record `id`, or `None` if no such record exists.
    ///
    /// A terminal status is returned from cache; a running record is probed
    /// without blocking and resolved if it has terminated.
    pub fn status(&self, id: usize) -> Result<Option<ProcessStatus>, SupervisorError> {
        let pid = match self.shared.store().get(id) {
            None => return Ok(None),
            Some(rec) if rec.status().is_terminal() => return Ok(Some(rec.status())),
            Some(rec) => rec.pid(),
        };
        self.probe(id, pid).map(Some)
    }

    /// Numeric status: `-2` unknown id, `-1` running, `0..=255` terminal
    /// (`128 + signal` for signal deaths).
    pub fn status_code(&self, id: usize) -> Result<i32, SupervisorError> {
        Ok(self.status(id)?.map_or(INVALID_ID, ProcessStatus::code))
    }

    /// Non-blocking probe of one running record.
    fn probe(&self, id: usize, pid: i32) -> Result<ProcessStatus, SupervisorError> {
        let _reap = self.reaper.lock();

        // The reaper may have resolved it while we waited for the lock.
        let cached = self.shared.store().get(id).map(|rec| rec.status());
        if let Some(status) = cached.filter(|s| s.is_terminal()) {
            return Ok(status);
        }

        match reaper::try_wait(Some(pid)) {
            Ok(None) => Ok(ProcessStatus::Running),
            Ok(Some((_, status))) => {
                self.shared.resolve(id, status);
                Ok(status)
            }
            Err(source) => Err(SupervisorError::Wait { pid, source }),
        }
    }

    /// Sends `signal` to record `id` if it is still running.
    ///
    /// Any number the OS accepts is passed through unchanged, including
    /// real-time signals and `0` (an existence check). Unknown ids and terminal
    /// records are ignored. A process that vanished before delivery counts as
    /// success ([`SignalOutcome::Gone`]).
    ///
    /// ### Errors
    /// - [`SupervisorError::InvalidSignal`] when the OS rejects the number (`EINVAL`)
    /// - [`SupervisorError::Signal`] for any other `kill` failure
    pub fn send_signal(&self, id: usize, signal: i32) -> Result<SignalOutcome, SupervisorError> {
        let _reap = self.reaper.lock();

        let pid = match self.shared.store().get(id) {
            Some(rec) if rec.status().is_running() => rec.pid(),
            Some(_) => return Ok(self.skip_signal(id, signal, "terminal")),
            None => return Ok(self.skip_signal(id, signal, "invalid_id")),
        };

        // SAFETY: kill(2) takes two integers and has no memory-safety preconditions.
        let outcome = match Errno::result(unsafe { libc::kill(pid, signal) }) {
            Ok(_) => SignalOutcome::Delivered,
            Err(Errno::ESRCH) => SignalOutcome::Gone,
            Err(Errno::EINVAL) => return Err(SupervisorError::InvalidSignal { signal }),
            Err(source) => return Err(SupervisorError::Signal { pid, signal, source }),
        };
        self.shared.bus().publish(
            Event::new(EventKind::SignalSent)
                .with_id(id)
                .with_pid(pid)
                .with_signal(signal)
                .with_reason(match outcome {
                    SignalOutcome::Gone => "gone",
                    _ => "delivered",
                }),
        );
        Ok(outcome)
    }

    fn skip_signal(&self, id: usize, signal: i32, reason: &'static str) -> SignalOutcome {
        self.shared.bus().publish(
            Event::new(EventKind::SignalSkipped)
                .with_id(id)
                .with_signal(signal)
                .with_reason(reason),
        );
        SignalOutcome::Ignored
    }

    /// Waits until every tracked record is terminal.
    ///
    /// Records already terminal are skipped; orphans are not waited for (they
    /// are recorded only once reaped). There is no timeout; wrap the future in
    /// `tokio::time::timeout` or poll [`status`](Self::status) for bounded waits.
    pub async fn wait_all(&self) -> Result<(), SupervisorError> {
        let mut changes = self.shared.changes();
        loop {
            changes.borrow_and_update();

            let running = self.shared.store().running();
            let mut pending = false;
            for (id, pid) in running {
                pending |= self.probe(id, pid)?.is_running();
            }
            if !pending {
                return Ok(());
            }

            match self.cfg.poll_tick() {
                Some(tick) => {
                    tokio::select! {
                        _ = changes.changed() => {}
                        _ = tokio::time::sleep(tick) => {}
                    }
                }
                None => {
                    let _ = changes.changed().await;
                }
            }
        }
    }

    /// Owned copy of both collections.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.store().snapshot()
    }

    /// Renders the status table (tracked rows, then orphan rows).
    pub fn render(&self) -> String {
        crate::table::render(&self.snapshot())
    }

    /// Stops event fan-out to subscribers.
    ///
    /// Subscribers still receive every event published before this call,
    /// ending with `ShutdownRequested`; their queues are drained before the
    /// workers exit. Records keep being updated and the API keeps working;
    /// only subscriber delivery stops. Children are not signalled.
    pub fn shutdown(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.shared
            .bus()
            .publish(Event::new(EventKind::ShutdownRequested));
        self.token.cancel();
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
