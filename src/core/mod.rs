//! Runtime core: process tracking and reaping.
//!
//! The public API from this module is [`Supervisor`] plus its configuration,
//! status and record types.
//!
//! Internal modules:
//! - [`store`]: append-only tracked/orphan collections;
//! - [`shared`]: per-supervisor state shared with the reaper thread;
//! - [`reaper`]: process-wide `SIGCHLD` thread, drains and dispatches terminations;
//! - [`spawn`]: fork/redirect/close/exec collaborator;
//! - [`supervisor`]: create, status, signal, wait, render;
//! - [`builder`]: one-time setup.

mod builder;
mod config;
mod reaper;
mod shared;
mod spawn;
mod status;
mod store;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use status::{INVALID_ID, ProcessStatus};
pub use store::{ORPHAN_NAME, ProcessRecord, Snapshot};
pub use supervisor::{SignalOutcome, Supervisor};

#[cfg(test)]
pub(crate) use store::RecordStore;
