//! # Per-subscriber workers behind the bus listener.
//!
//! The supervisor's bus listener owns one `SubscriberSet` and hands every bus
//! event to it. Each subscriber has its own bounded queue and worker task, so a
//! slow or panicking subscriber never holds up the others or the publisher.
//!
//! ```text
//! bus listener ──► emit(event) ──┬──► [queue 1] ──► worker 1 ──► sub1.on_event()
//!                                └──► [queue N] ──► worker N ──► subN.on_event()
//!                                        full / closed ──► SubscriberOverflow on the bus
//!                                        panic         ──► SubscriberPanicked on the bus
//! ```
//!
//! Panics are caught with `AssertUnwindSafe`; a subscriber that panics while
//! holding its own lock may leave that state inconsistent.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Worker {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    handle: JoinHandle<()>,
}

pub(crate) struct SubscriberSet {
    workers: Vec<Worker>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Needs a tokio runtime unless `subs` is empty.
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let workers = subs
            .into_iter()
            .map(|sub| {
                let name = sub.name();
                let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let handle = tokio::spawn(run_worker(sub, rx, bus.clone()));
                Worker {
                    name,
                    queue,
                    handle,
                }
            })
            .collect();
        Self { workers, bus }
    }

    /// Queues `event` for every subscriber without waiting.
    ///
    /// A full or closed queue drops the event for that subscriber only and
    /// reports it on the bus, unless the event is itself an overflow report.
    pub(crate) fn emit(&self, event: &Event) {
        if self.workers.is_empty() {
            return;
        }
        let event = Arc::new(event.clone());
        let report = event.kind != EventKind::SubscriberOverflow;

        for worker in &self.workers {
            let reason = match worker.queue.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if report {
                self.bus
                    .publish(Event::subscriber_overflow(worker.name, reason));
            }
        }
    }

    /// Closes every queue and waits until the workers have handled what was queued.
    pub(crate) async fn shutdown(self) {
        let handles: Vec<_> = self
            .workers
            .into_iter()
            .map(|worker| {
                drop(worker.queue);
                worker.handle
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn run_worker(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(panic) = handled {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*panic)));
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
