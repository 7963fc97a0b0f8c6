//! Orphan adoption runs process-wide, so it lives in its own test binary.

use std::time::Duration;

use procvisor::{ORPHAN_NAME, ProcessStatus, Supervisor, SupervisorConfig};

#[tokio::test]
async fn background_grandchild_is_recorded_as_orphan() {
    let sup = Supervisor::builder(SupervisorConfig::default())
        .build()
        .expect("build supervisor");

    let id = sup.spawn(["sh", "-c", "sleep 0.2 & exit 0"]).unwrap();
    sup.wait_all().await.unwrap();
    assert_eq!(sup.status_code(id).unwrap(), 0);

    let snap = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let snap = sup.snapshot();
            if !snap.orphans().is_empty() {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("orphan was never reaped");

    assert_eq!(snap.tracked().len(), 1);
    assert_eq!(snap.tracked()[0].status(), ProcessStatus::Exited(0));

    let orphan = &snap.orphans()[0];
    assert_eq!(orphan.name(), ORPHAN_NAME);
    assert_eq!(orphan.status(), ProcessStatus::Exited(0));
    assert_ne!(orphan.pid(), snap.tracked()[0].pid());
    assert!(snap.tracked().iter().all(|rec| rec.pid() != orphan.pid()));

    let table = sup.render();
    assert!(table.lines().any(|l| l.contains(ORPHAN_NAME) && l.ends_with(" 0")));
}
