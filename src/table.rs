//! # Status table renderer.
//!
//! Pure formatting over a [`Snapshot`]: one header row, then one row per
//! tracked record and one per orphan.
//!
//! ```text
//!     PID CMD       STATUS
//!   41230 sleep     -1
//!   41231 sh        137
//!   41240 <unknown> 0
//! ```
//!
//! `PID` is right-aligned in 7 columns; `CMD` is left-aligned and as wide as
//! the longest name (at least `"CMD"`); `STATUS` is the numeric code.

use std::fmt::Write;

use crate::core::Snapshot;

const PID_WIDTH: usize = 7;

/// Renders `snapshot` as a status table.
pub fn render(snapshot: &Snapshot) -> String {
    let width = snapshot
        .records()
        .map(|rec| rec.name().chars().count())
        .fold("CMD".len(), usize::max);

    let mut out = String::new();
    let _ = writeln!(out, "{:>PID_WIDTH$} {:<width$} STATUS", "PID", "CMD");
    for rec in snapshot.records() {
        let _ = writeln!(
            out,
            "{:>PID_WIDTH$} {:<width$} {}",
            rec.pid(),
            rec.name(),
            rec.status().code()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{ProcessStatus, RecordStore};

    #[test]
    fn empty_table_is_header_only() {
        assert_eq!(render(&Snapshot::default()), "    PID CMD STATUS\n");
    }

    #[test]
    fn cmd_column_fits_longest_name() {
        let mut store = RecordStore::with_capacity(4);
        let a = store.push_tracked(12, Arc::from("sleep"));
        store.push_tracked(345, Arc::from("sh"));
        store.resolve(a, ProcessStatus::Signaled(9));
        store.push_orphan(6789, ProcessStatus::Exited(0));

        let expected = concat!(
            "    PID CMD       STATUS\n",
            "     12 sleep     137\n",
            "    345 sh        -1\n",
            "   6789 <unknown> 0\n",
        );
        assert_eq!(render(&store.snapshot()), expected);
    }

    #[test]
    fn display_matches_render() {
        let mut store = RecordStore::with_capacity(1);
        store.push_tracked(1, Arc::from("a-rather-long-command"));
        let snap = store.snapshot();
        assert_eq!(snap.to_string(), render(&snap));
        assert!(render(&snap).starts_with("    PID CMD                   STATUS\n"));
    }
}
