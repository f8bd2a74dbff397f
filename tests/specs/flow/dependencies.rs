//! Dependency gating specs
//!
//! Verify jobs are created only once every step they depend on completed.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn independent_steps_start_in_one_pass() {
    let cluster = Cluster::new();
    let steps = vec![Flow::new("a"), Flow::new("b"), Flow::new("c")];
    cluster.submit("fan", steps, RetainPolicy::Retain);

    cluster.pass("fan").await;

    assert_eq!(cluster.jobs(), vec!["fan-a", "fan-b", "fan-c"]);
    assert_eq!(
        cluster.recorder.reasons(),
        vec!["Created", "Created", "Created"]
    );
}

#[tokio::test]
async fn two_step_flow_succeeds_over_three_passes() {
    let cluster = Cluster::new();
    let steps = vec![Flow::new("a"), Flow::depending_on("b", ["a"])];
    cluster.submit("f1", steps, RetainPolicy::Retain);

    cluster.pass("f1").await;
    assert_eq!(cluster.jobs(), vec!["f1-a"]);
    assert_eq!(cluster.phase("f1"), "Pending");

    cluster.set_phase("f1-a", JobPhase::Completed);
    cluster.pass("f1").await;
    assert_eq!(cluster.jobs(), vec!["f1-a", "f1-b"]);
    assert_eq!(cluster.phase("f1"), "Running");

    cluster.set_phase("f1-b", JobPhase::Completed);
    cluster.pass("f1").await;
    assert_eq!(cluster.phase("f1"), "Succeed");
    assert_eq!(cluster.status("f1").completed_jobs, vec!["f1-a", "f1-b"]);
}

#[tokio::test]
async fn chain_advances_one_edge_per_completion() {
    let cluster = Cluster::new();
    let steps = vec![
        Flow::new("a"),
        Flow::depending_on("b", ["a"]),
        Flow::depending_on("c", ["b"]),
    ];
    cluster.submit("chain", steps, RetainPolicy::Retain);

    cluster.pass("chain").await;
    assert_eq!(cluster.jobs(), vec!["chain-a"]);

    cluster.set_phase("chain-a", JobPhase::Running);
    cluster.pass("chain").await;
    assert_eq!(
        cluster.jobs(),
        vec!["chain-a"],
        "b must wait for a to complete"
    );

    cluster.set_phase("chain-a", JobPhase::Completed);
    cluster.pass("chain").await;
    assert_eq!(
        cluster.jobs(),
        vec!["chain-a", "chain-b"],
        "c must wait for b"
    );

    cluster.set_phase("chain-b", JobPhase::Completing);
    cluster.pass("chain").await;
    assert_eq!(
        cluster.jobs(),
        vec!["chain-a", "chain-b"],
        "completing is not completed"
    );

    cluster.set_phase("chain-b", JobPhase::Completed);
    cluster.pass("chain").await;
    assert_eq!(cluster.jobs(), vec!["chain-a", "chain-b", "chain-c"]);
}

#[tokio::test]
async fn join_waits_for_every_target() {
    let cluster = Cluster::new();
    let steps = vec![
        Flow::new("a"),
        Flow::new("b"),
        Flow::depending_on("join", ["a", "b"]),
    ];
    cluster.submit("dag", steps, RetainPolicy::Retain);

    cluster.pass("dag").await;
    cluster.set_phase("dag-a", JobPhase::Completed);
    cluster.set_phase("dag-b", JobPhase::Running);
    cluster.pass("dag").await;
    assert!(cluster.store.job(NS, "dag-join").is_none());

    cluster.set_phase("dag-b", JobPhase::Completed);
    cluster.pass("dag").await;
    assert!(cluster.store.job(NS, "dag-join").is_some());
}
