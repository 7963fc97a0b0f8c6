//! # Per-supervisor state shared with the reaper thread.
//!
//! [`Shared`] bundles the record store, the event bus and a change counter.
//! The supervisor owns it through an `Arc`; the process-wide reaper holds a
//! `Weak` so a dropped supervisor simply stops receiving dispatches.
//!
//! ## Rules
//! - The store lock is short and never held across `.await`.
//! - Every status change publishes its event and bumps `generation`, in that order,
//!   after the store lock is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::status::ProcessStatus;
use super::store::{ORPHAN_NAME, RecordStore};
use crate::events::{Bus, Event, EventKind};

pub(crate) struct Shared {
    store: Mutex<RecordStore>,
    bus: Bus,
    /// Bumped after every resolution; `wait_all` awaits it.
    generation: watch::Sender<u64>,
}

impl Shared {
    pub(crate) fn new(capacity: usize, bus: Bus) -> Self {
        let (generation, _rx) = watch::channel(0);
        Self {
            store: Mutex::new(RecordStore::with_capacity(capacity)),
            bus,
            generation,
        }
    }

    /// Locks the store. A poisoned lock is recovered: every store mutation is a
    /// single push or field write, so the data is consistent even after a panic.
    pub(crate) fn store(&self) -> MutexGuard<'_, RecordStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    pub(crate) fn changes(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Appends a tracked record. Caller holds the reap lock.
    pub(crate) fn track(&self, pid: i32, name: Arc<str>) -> usize {
        let id = self.store().push_tracked(pid, Arc::clone(&name));
        self.bus.publish(
            Event::new(EventKind::ProcessSpawned)
                .with_id(id)
                .with_pid(pid)
                .with_name(name),
        );
        id
    }

    /// Resolves the tracked record `id` if it is still running.
    pub(crate) fn resolve(&self, id: usize, status: ProcessStatus) -> bool {
        let resolved = {
            let mut store = self.store();
            store
                .resolve(id, status)
                .then(|| store.get(id).map(|rec| (rec.pid(), Arc::<str>::from(rec.name()))))
                .flatten()
        };
        match resolved {
            Some((pid, name)) => {
                self.exited(id, pid, name, status);
                true
            }
            None => false,
        }
    }

    /// Resolves the running record with OS pid `pid`, if this supervisor owns one.
    pub(crate) fn claim(&self, pid: i32, status: ProcessStatus) -> bool {
        let claimed = {
            let mut store = self.store();
            store
                .claim(pid, status)
                .and_then(|id| store.get(id).map(|rec| (id, Arc::<str>::from(rec.name()))))
        };
        match claimed {
            Some((id, name)) => {
                self.exited(id, pid, name, status);
                true
            }
            None => false,
        }
    }

    /// Records a reaped child nobody claimed.
    pub(crate) fn adopt(&self, pid: i32, status: ProcessStatus) -> usize {
        let id = self.store().push_orphan(pid, status);
        self.bus.publish(
            Event::new(EventKind::OrphanReaped)
                .with_id(id)
                .with_pid(pid)
                .with_name(ORPHAN_NAME)
                .with_status(status),
        );
        self.bump();
        id
    }

    fn exited(&self, id: usize, pid: i32, name: Arc<str>, status: ProcessStatus) {
        self.bus.publish(
            Event::new(EventKind::ProcessExited)
                .with_id(id)
                .with_pid(pid)
                .with_name(name)
                .with_status(status),
        );
        self.bump();
    }

    fn bump(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }
}
