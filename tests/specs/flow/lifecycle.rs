//! Flow phase specs
//!
//! Verify the phase a flow settles in and that terminal phases stop work.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn failed_first_job_fails_pending_flow() {
    let cluster = Cluster::new();
    let steps = vec![Flow::new("a"), Flow::depending_on("b", ["a"])];
    cluster.submit("f1", steps, RetainPolicy::Retain);

    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Failed);
    cluster.pass("f1").await;

    assert_eq!(cluster.phase("f1"), "Failed");
    assert_eq!(cluster.status("f1").failed_jobs, vec!["f1-a"]);
}

#[tokio::test]
async fn failed_flow_is_left_alone() {
    let cluster = Cluster::new();
    cluster.submit("f1", vec![Flow::new("a")], RetainPolicy::Delete);
    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Failed);
    cluster.pass("f1").await;
    let settled = cluster.flow("f1");

    cluster.set_phase("f1-a", JobPhase::Completed);
    cluster.pass("f1").await;

    assert_eq!(cluster.flow("f1"), settled);
    assert_eq!(cluster.jobs(), vec!["f1-a"]);
}

#[tokio::test]
async fn running_flow_waits_for_every_step() {
    let cluster = Cluster::new();
    let steps = vec![Flow::new("a"), Flow::new("b")];
    cluster.submit("f1", steps, RetainPolicy::Retain);

    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Completed);
    cluster.set_phase("f1-b", JobPhase::Running);
    cluster.pass("f1").await;
    assert_eq!(cluster.phase("f1"), "Running");

    cluster.set_phase("f1-b", JobPhase::Completed);
    cluster.pass("f1").await;
    assert_eq!(cluster.phase("f1"), "Succeed");
}

#[tokio::test]
async fn deleted_flow_is_a_no_op() {
    let cluster = Cluster::new();

    cluster.pass("ghost").await;

    assert!(cluster.jobs().is_empty());
    assert!(cluster.recorder.events().is_empty());
}
