//! # Record store: tracked and orphaned process records.
//!
//! Two append-only collections:
//! - **tracked**: one record per successful [`Supervisor::create`](crate::Supervisor::create);
//! - **orphans**: one record per reaped child that no tracked record claims
//!   (typically a grandchild reparented to this process).
//!
//! ## Rules
//! - `id` is the insertion index; records are never removed or reordered.
//! - Status is write-once: [`RecordStore::resolve`] on a terminal record is a no-op.
//! - Orphans are inserted already resolved, named [`ORPHAN_NAME`].

use std::sync::Arc;

use super::status::ProcessStatus;

/// Display name of records whose origin is unknown.
pub const ORPHAN_NAME: &str = "<unknown>";

/// One child process known to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    id: usize,
    pid: i32,
    name: Arc<str>,
    status: ProcessStatus,
}

impl ProcessRecord {
    /// Stable index in the owning collection.
    pub fn id(&self) -> usize {
        self.id
    }

    /// OS process id. Meaningless once the status is terminal: the OS may have
    /// handed it to another process.
    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// `argv[0]` for tracked records, [`ORPHAN_NAME`] for orphans.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status; once terminal it never changes.
    pub fn status(&self) -> ProcessStatus {
        self.status
    }
}

/// Owned, point-in-time copy of both collections.
///
/// Its [`Display`](std::fmt::Display) impl renders the status table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    tracked: Vec<ProcessRecord>,
    orphans: Vec<ProcessRecord>,
}

impl Snapshot {
    /// Records created by this supervisor, indexed by id.
    pub fn tracked(&self) -> &[ProcessRecord] {
        &self.tracked
    }

    /// Reaped children nobody claimed, in reaping order.
    pub fn orphans(&self) -> &[ProcessRecord] {
        &self.orphans
    }

    /// Tracked records first, then orphans (table order).
    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.tracked.iter().chain(self.orphans.iter())
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::table::render(self))
    }
}

/// Append-only storage guarded by the supervisor's store lock.
#[derive(Debug)]
pub(crate) struct RecordStore {
    tracked: Vec<ProcessRecord>,
    orphans: Vec<ProcessRecord>,
}

impl RecordStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tracked: Vec::with_capacity(capacity),
            orphans: Vec::with_capacity(capacity),
        }
    }

    /// Appends a running record and returns its id.
    pub(crate) fn push_tracked(&mut self, pid: i32, name: Arc<str>) -> usize {
        let id = self.tracked.len();
        self.tracked.push(ProcessRecord {
            id,
            pid,
            name,
            status: ProcessStatus::Running,
        });
        id
    }

    /// Appends an already-resolved orphan and returns its orphan id.
    pub(crate) fn push_orphan(&mut self, pid: i32, status: ProcessStatus) -> usize {
        let id = self.orphans.len();
        self.orphans.push(ProcessRecord {
            id,
            pid,
            name: Arc::from(ORPHAN_NAME),
            status,
        });
        id
    }

    pub(crate) fn get(&self, id: usize) -> Option<&ProcessRecord> {
        self.tracked.get(id)
    }

    #[cfg(test)]
    pub(crate) fn orphan(&self, id: usize) -> Option<&ProcessRecord> {
        self.orphans.get(id)
    }

    pub(crate) fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    /// Resolves a running record. Returns `false` if the id is unknown, the
    /// record is already terminal, or `status` is not terminal.
    pub(crate) fn resolve(&mut self, id: usize, status: ProcessStatus) -> bool {
        match self.tracked.get_mut(id) {
            Some(rec) if rec.status.is_running() && status.is_terminal() => {
                rec.status = status;
                true
            }
            _ => false,
        }
    }

    /// Finds the running record for `pid` and resolves it.
    ///
    /// A pid is unique among running records, so the first match wins.
    pub(crate) fn claim(&mut self, pid: i32, status: ProcessStatus) -> Option<usize> {
        let id = self
            .tracked
            .iter()
            .position(|rec| rec.pid == pid && rec.status.is_running())?;
        self.resolve(id, status).then_some(id)
    }

    /// `(id, pid)` of every record still running, in id order.
    pub(crate) fn running(&self) -> Vec<(usize, i32)> {
        self.tracked
            .iter()
            .filter(|rec| rec.status.is_running())
            .map(|rec| (rec.id, rec.pid))
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            tracked: self.tracked.clone(),
            orphans: self.orphans.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut store = RecordStore::with_capacity(1);
        for (i, pid) in [100, 101, 102, 103].into_iter().enumerate() {
            assert_eq!(store.push_tracked(pid, name("sleep")), i);
        }
        assert_eq!(store.tracked_len(), 4);
        assert_eq!(store.get(2).map(ProcessRecord::pid), Some(102));
        assert!(store.get(4).is_none());
    }

    #[test]
    fn resolve_is_write_once() {
        let mut store = RecordStore::with_capacity(4);
        let id = store.push_tracked(10, name("true"));

        assert!(store.resolve(id, ProcessStatus::Exited(0)));
        assert!(!store.resolve(id, ProcessStatus::Signaled(9)));
        assert!(!store.resolve(id, ProcessStatus::Running));
        assert_eq!(store.get(id).map(|r| r.status()), Some(ProcessStatus::Exited(0)));
    }

    #[test]
    fn resolve_rejects_running_and_unknown() {
        let mut store = RecordStore::with_capacity(4);
        let id = store.push_tracked(10, name("true"));
        assert!(!store.resolve(id, ProcessStatus::Running));
        assert!(!store.resolve(id + 1, ProcessStatus::Exited(0)));
        assert!(store.get(id).is_some_and(|r| r.status().is_running()));
    }

    #[test]
    fn claim_skips_resolved_records_with_reused_pid() {
        let mut store = RecordStore::with_capacity(4);
        let old = store.push_tracked(500, name("first"));
        assert!(store.resolve(old, ProcessStatus::Exited(1)));
        let new = store.push_tracked(500, name("second"));

        assert_eq!(store.claim(500, ProcessStatus::Exited(2)), Some(new));
        assert_eq!(store.get(old).map(|r| r.status()), Some(ProcessStatus::Exited(1)));
        assert_eq!(store.claim(500, ProcessStatus::Exited(3)), None);
        assert_eq!(store.claim(999, ProcessStatus::Exited(0)), None);
    }

    #[test]
    fn orphans_are_resolved_and_unnamed() {
        let mut store = RecordStore::with_capacity(1);
        assert_eq!(store.push_orphan(700, ProcessStatus::Exited(0)), 0);
        assert_eq!(store.push_orphan(701, ProcessStatus::Signaled(15)), 1);

        let orphan = store.orphan(1).cloned();
        assert_eq!(orphan.as_ref().map(ProcessRecord::name), Some(ORPHAN_NAME));
        assert_eq!(orphan.map(|r| r.status().code()), Some(143));
        assert_eq!(store.tracked_len(), 0);
    }

    #[test]
    fn running_and_snapshot() {
        let mut store = RecordStore::with_capacity(2);
        store.push_tracked(1, name("a"));
        let b = store.push_tracked(2, name("b"));
        store.push_tracked(3, name("c"));
        store.resolve(b, ProcessStatus::Exited(0));
        store.push_orphan(4, ProcessStatus::Exited(0));

        assert_eq!(store.running(), vec![(0, 1), (2, 3)]);

        let snap = store.snapshot();
        assert_eq!(snap.tracked().len(), 3);
        assert_eq!(snap.orphans().len(), 1);
        let pids: Vec<i32> = snap.records().map(ProcessRecord::pid).collect();
        assert_eq!(pids, vec![1, 2, 3, 4]);
    }
}
