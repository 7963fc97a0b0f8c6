//! Many children exiting together: every one resolved exactly once.

use std::collections::HashSet;
use std::time::Duration;

use procvisor::{EventKind, Supervisor, SupervisorConfig};
use tokio::sync::broadcast::error::TryRecvError;

const CHILDREN: usize = 128;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_exits_resolve_each_child_once() {
    let cfg = SupervisorConfig {
        bus_capacity: 4 * CHILDREN,
        ..SupervisorConfig::default()
    };
    let sup = Supervisor::builder(cfg).build().expect("build supervisor");
    let mut rx = sup.subscribe();

    let ids: Vec<usize> = (0..CHILDREN)
        .map(|_| sup.spawn(["sleep", "0.3"]).unwrap())
        .collect();
    assert_eq!(ids, (0..CHILDREN).collect::<Vec<_>>());

    tokio::time::timeout(Duration::from_secs(30), sup.wait_all())
        .await
        .expect("wait_all timed out")
        .unwrap();

    let mut exited = HashSet::new();
    let mut orphans = 0;
    loop {
        match rx.try_recv() {
            Ok(ev) if ev.kind == EventKind::ProcessExited => {
                assert!(exited.insert(ev.id.unwrap()), "id resolved twice");
            }
            Ok(ev) if ev.kind == EventKind::OrphanReaped => orphans += 1,
            Ok(_) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(n)) => panic!("lost {n} events"),
        }
    }

    assert_eq!(exited.len(), CHILDREN);
    assert_eq!(orphans, 0);

    let snap = sup.snapshot();
    assert!(snap.orphans().is_empty());
    for id in ids {
        assert_eq!(sup.status_code(id).unwrap(), 0);
    }
}
