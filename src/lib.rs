//! # procvisor
//!
//! **procvisor** is a minimal process supervisor for Linux.
//!
//! It launches child programs, declares the current process a child subreaper
//! (so orphaned grandchildren are reparented to it instead of to init), reaps
//! every terminated descendant, and tracks the exit status of each process it
//! created. Callers query status, signal a specific process, wait for all of
//! them, or render a status table. Restart policies are left to the caller:
//! poll [`Supervisor::status`] and call [`Supervisor::create`] again.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ProcessSpec  │   │ ProcessSpec  │   │ ProcessSpec  │
//!     │  (argv, fds) │   │  (argv, fds) │   │  (argv, fds) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (one per caller context)                              │
//! │  - RecordStore (tracked + orphans, append-only, write-once)       │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬─────────────────────────────────────────────▲──────────────┘
//!        │ fork/exec (under reap lock)                 │ claim / adopt
//!        ▼                                             │
//!   child processes ── exit ──► SIGCHLD ──► Reaper thread (process-wide)
//!                                            waitpid(-1, WNOHANG) loop
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::builder(cfg).build()
//!   ├─► reaper::install()    (first build only: subreaper, SIGCHLD, thread)
//!   ├─► register store with the reaper
//!   └─► spawn bus listener → SubscriberSet
//!
//! create(spec) ─► Running ─► (reaper | status probe | wait_all) ─► Exited(c) / Signaled(s)
//!                                                     terminal: cached forever
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | Spawn, query, signal and wait for child processes.            | [`Supervisor`], [`ProcessSpec`]            |
//! | **Status**        | Typed and shell-style numeric exit status.                    | [`ProcessStatus`], [`SignalOutcome`]       |
//! | **Records**       | Tracked and orphan records, status table rendering.           | [`ProcessRecord`], [`Snapshot`], [`render`]|
//! | **Subscriber API**| Hook into process lifecycle events.                           | [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed errors for setup and OS primitive failures.             | [`SupervisorError`]                        |
//! | **Configuration** | Centralize supervisor settings.                               | [`SupervisorConfig`]                       |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which forwards events to `tracing`.
//!
//! ## Caveat
//! The reaper collects **every** child of the process. Children started
//! elsewhere (e.g. `std::process::Command`) are reaped too and show up as
//! orphans; their own `wait` then fails with `ECHILD`.
//!
//! ## Example
//! ```rust,no_run
//! use procvisor::{ProcessSpec, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(SupervisorConfig::default()).build()?;
//!
//!     let (read, write) = nix::unistd::pipe()?;
//!     let worker = sup.create(ProcessSpec::new(["sh", "-c", "echo ready"]).with_stdout(write))?;
//!     let sleeper = sup.spawn(["sleep", "60"])?;
//!
//!     sup.send_signal(sleeper, libc::SIGTERM)?;
//!     sup.wait_all().await?;
//!
//!     assert_eq!(sup.status_code(worker)?, 0);
//!     assert_eq!(sup.status_code(sleeper)?, 128 + libc::SIGTERM);
//!     print!("{}", sup.render());
//!     drop(read);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod process;
mod subscribers;
mod table;

// ---- Public re-exports ----

pub use crate::core::{
    INVALID_ID, ORPHAN_NAME, ProcessRecord, ProcessStatus, SignalOutcome, Snapshot, Supervisor,
    SupervisorBuilder, SupervisorConfig,
};
pub use error::SupervisorError;
pub use events::{Event, EventKind};
pub use process::{ProcessSpec, Redirect};
pub use subscribers::Subscribe;
pub use table::render;

// Optional: built-in logger subscriber.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
