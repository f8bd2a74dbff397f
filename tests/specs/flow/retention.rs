//! Job retention specs
//!
//! Verify what happens to a succeeded flow's jobs under each retain policy.

use crate::prelude::*;
use crate::prelude::assert_eq;

async fn run_to_success(cluster: &Cluster, policy: RetainPolicy) {
    let steps = vec![Flow::new("a"), Flow::depending_on("b", ["a"])];
    cluster.submit("f1", steps, policy);
    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Completed);
    cluster.pass("f1").await;
    cluster.set_phase("f1-b", JobPhase::Completed);
    cluster.pass("f1").await;
    assert_eq!(cluster.phase("f1"), "Succeed");
}

#[tokio::test]
async fn delete_policy_removes_owned_jobs() {
    let cluster = Cluster::new();
    run_to_success(&cluster, RetainPolicy::Delete).await;
    let bystander = jobflow_core::test_support::unowned_job(NS, "bystander", JobPhase::Running);
    cluster.store.insert_job(bystander);
    let before = cluster.status("f1");

    cluster.pass("f1").await;

    assert_eq!(cluster.jobs(), vec!["bystander"]);
    assert_eq!(
        cluster.status("f1"),
        before,
        "retention does not touch the status"
    );
}

#[tokio::test]
async fn retain_policy_keeps_jobs() {
    let cluster = Cluster::new();
    run_to_success(&cluster, RetainPolicy::Retain).await;

    cluster.pass("f1").await;
    cluster.pass("f1").await;

    assert_eq!(cluster.jobs(), vec!["f1-a", "f1-b"]);
    assert_eq!(cluster.phase("f1"), "Succeed");
}
