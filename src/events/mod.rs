//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the supervisor API, the reaper
//! thread and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (spawn, probe resolutions, signals, shutdown),
//!   the reaper thread (exits and orphans), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's bus listener (fans out to `SubscriberSet`)
//!   and any receiver from [`Supervisor::subscribe`](crate::Supervisor::subscribe).

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
