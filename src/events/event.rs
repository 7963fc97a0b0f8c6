//! # Runtime events emitted by the supervisor and the reaper.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Process events**: spawn, exit of a tracked process, orphan reaped
//! - **Control events**: signal delivery (or why it was skipped), shutdown
//! - **Subscriber events**: overflow and panic isolation reports
//!
//! The [`Event`] struct carries the metadata: supervisor id, OS pid, display
//! name, resolved status, signal number and a free-form reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use procvisor::{Event, EventKind, ProcessStatus};
//!
//! let ev = Event::new(EventKind::ProcessExited)
//!     .with_id(3)
//!     .with_pid(4242)
//!     .with_name("sleep")
//!     .with_status(ProcessStatus::Signaled(15));
//!
//! assert_eq!(ev.kind, EventKind::ProcessExited);
//! assert_eq!(ev.name.as_deref(), Some("sleep"));
//! assert_eq!(ev.status.map(|s| s.code()), Some(143));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::ProcessStatus;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Process events ===
    /// A child was forked and recorded as tracked.
    ///
    /// Sets:
    /// - `id`: supervisor id
    /// - `pid`: OS pid
    /// - `name`: `argv[0]`
    ProcessSpawned,

    /// A tracked record was resolved to a terminal status.
    ///
    /// Published exactly once per tracked record, whichever path reaped it
    /// (reaper thread, `status` probe or `wait_all`).
    ///
    /// Sets:
    /// - `id`, `pid`, `name`
    /// - `status`: terminal status
    ProcessExited,

    /// The reaper collected a child no tracked record claims.
    ///
    /// Sets:
    /// - `id`: orphan id
    /// - `pid`: OS pid
    /// - `name`: `"<unknown>"`
    /// - `status`: terminal status
    OrphanReaped,

    // === Control events ===
    /// A signal was handed to the kernel for a running record.
    ///
    /// Sets:
    /// - `id`, `pid`
    /// - `signal`: signal number
    /// - `reason`: `"delivered"` or `"gone"` (process vanished before delivery)
    SignalSent,

    /// A signal request was ignored.
    ///
    /// Sets:
    /// - `id`
    /// - `signal`: signal number
    /// - `reason`: `"invalid_id"` or `"terminal"`
    SignalSkipped,

    /// [`Supervisor::shutdown`](crate::Supervisor::shutdown) was called.
    ShutdownRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Supervisor id (tracked) or orphan id, depending on `kind`.
    pub id: Option<usize>,
    /// OS process id.
    pub pid: Option<i32>,
    /// Display name of the process, or subscriber name for subscriber events.
    pub name: Option<Arc<str>>,
    /// Resolved status.
    pub status: Option<ProcessStatus>,
    /// Signal number for signal events.
    pub signal: Option<i32>,
    /// Human-readable reason (overflow details, skip reasons, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            id: None,
            pid: None,
            name: None,
            status: None,
            signal: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    #[inline]
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for events that report a resolved process (tracked or orphan).
    #[inline]
    pub fn is_resolution(&self) -> bool {
        matches!(self.kind, EventKind::ProcessExited | EventKind::OrphanReaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::ProcessSpawned);
        let b = Event::new(EventKind::ProcessExited);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_helpers_fill_name_and_reason() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.name.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=metrics reason=full"));

        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert!(!ev.is_resolution());
    }

    #[test]
    fn resolution_kinds() {
        assert!(Event::new(EventKind::OrphanReaped).is_resolution());
        assert!(Event::new(EventKind::ProcessExited).is_resolution());
        assert!(!Event::new(EventKind::SignalSent).is_resolution());
    }
}
