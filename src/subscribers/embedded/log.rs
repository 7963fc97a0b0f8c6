//! # LogWriter: forwards events to `tracing`
//!
//! A minimal subscriber that turns every [`Event`] into one `tracing` record
//! under the `procvisor` target. Install any `tracing` subscriber to see them.
//!
//! ## Example output (tracing-subscriber fmt)
//! ```text
//! INFO procvisor: spawned id=0 pid=41230 cmd="sleep"
//! INFO procvisor: exited id=0 pid=41230 cmd="sleep" status=0
//! WARN procvisor: exited id=1 pid=41231 cmd="sh" status=137
//! INFO procvisor: orphan reaped id=0 pid=41240 status=0
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let cmd = e.name.as_deref().unwrap_or("");
        let status = e.status.map(|s| s.code());
        match e.kind {
            EventKind::ProcessSpawned => {
                tracing::info!(target: "procvisor", id = ?e.id, pid = ?e.pid, cmd, "spawned");
            }
            EventKind::ProcessExited if status == Some(0) => {
                tracing::info!(target: "procvisor", id = ?e.id, pid = ?e.pid, cmd, status = ?status, "exited");
            }
            EventKind::ProcessExited => {
                tracing::warn!(target: "procvisor", id = ?e.id, pid = ?e.pid, cmd, status = ?status, "exited");
            }
            EventKind::OrphanReaped => {
                tracing::info!(target: "procvisor", id = ?e.id, pid = ?e.pid, status = ?status, "orphan reaped");
            }
            EventKind::SignalSent => {
                tracing::debug!(target: "procvisor", id = ?e.id, pid = ?e.pid, signal = ?e.signal, reason = ?e.reason, "signal sent");
            }
            EventKind::SignalSkipped => {
                tracing::debug!(target: "procvisor", id = ?e.id, signal = ?e.signal, reason = ?e.reason, "signal skipped");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "procvisor", "shutdown requested");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "procvisor", subscriber = cmd, reason = ?e.reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "procvisor", subscriber = cmd, info = ?e.reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
