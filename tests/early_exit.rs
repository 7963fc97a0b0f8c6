//! Children that exit before `create` returns must still resolve their own
//! tracked record. Own binary so no other test's children can turn into orphans.

use std::time::Duration;

use procvisor::{Supervisor, SupervisorConfig};

const ROUNDS: usize = 200;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn instant_exits_are_never_orphans() {
    let sup = Supervisor::builder(SupervisorConfig::default())
        .build()
        .expect("build supervisor");

    let ids: Vec<usize> = (0..ROUNDS)
        .map(|_| sup.spawn(["sh", "-c", "exit 5"]).unwrap())
        .collect();

    tokio::time::timeout(Duration::from_secs(30), sup.wait_all())
        .await
        .expect("wait_all timed out")
        .unwrap();

    let snap = sup.snapshot();
    assert!(snap.orphans().is_empty(), "{} exits went unclaimed", snap.orphans().len());
    assert_eq!(snap.tracked().len(), ROUNDS);
    for id in ids {
        assert_eq!(sup.status_code(id).unwrap(), 5);
    }
}
