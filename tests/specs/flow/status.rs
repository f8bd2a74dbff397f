//! Flow status specs
//!
//! Verify the per-job timeline and the phase lists written to the flow status.

use crate::prelude::*;
use crate::prelude::assert_eq;
use chrono::DateTime;
use jobflow_core::RunningHistory;

const T0: i64 = 1_700_000_000_000;

fn at(ms: i64) -> Time {
    Time(DateTime::from_timestamp_millis(ms).unwrap())
}

fn closed(start: i64, end: i64, state: JobPhase) -> RunningHistory {
    RunningHistory {
        start_timestamp: Some(at(start)),
        end_timestamp: Some(at(end)),
        state,
    }
}

#[tokio::test]
async fn running_history_follows_phase_changes() {
    let cluster = Cluster::new();
    cluster.submit("f1", vec![Flow::new("a")], RetainPolicy::Retain);

    cluster.pass("f1").await;
    let record = cluster.status("f1").job_status("f1-a").cloned().unwrap();
    assert_eq!(record.start_timestamp, Some(at(T0 + 1_000)));
    assert!(
        record.running_histories.is_empty(),
        "no timeline before the first phase"
    );

    for phase in [JobPhase::Pending, JobPhase::Running, JobPhase::Completed] {
        cluster.set_phase("f1-a", phase);
        cluster.pass("f1").await;
    }

    let status = cluster.status("f1");
    let record = status.job_status("f1-a").unwrap();
    assert_eq!(
        record.running_histories,
        vec![
            closed(T0 + 2_000, T0 + 3_000, JobPhase::Pending),
            closed(T0 + 3_000, T0 + 4_000, JobPhase::Running),
            RunningHistory::open(at(T0 + 4_000), JobPhase::Completed),
        ]
    );
    assert_eq!(record.state, JobPhase::Completed);
    assert_eq!(status.completed_jobs, vec!["f1-a"]);
    assert!(status.pending_jobs.is_empty());
    assert!(status.running_jobs.is_empty());
}

#[tokio::test]
async fn unchanged_jobs_leave_the_status_unchanged() {
    let cluster = Cluster::new();
    let steps = vec![Flow::new("a"), Flow::new("b")];
    cluster.submit("f1", steps, RetainPolicy::Retain);
    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Running);
    cluster.set_phase("f1-b", JobPhase::Pending);
    cluster.pass("f1").await;
    let first = cluster.status("f1");

    cluster.pass("f1").await;

    assert_eq!(cluster.status("f1"), first);
}

#[tokio::test]
async fn status_serializes_with_cluster_field_names() {
    let cluster = Cluster::new();
    cluster.submit("f1", vec![Flow::new("a")], RetainPolicy::Retain);
    cluster.pass("f1").await;
    cluster.set_phase("f1-a", JobPhase::Running);
    cluster.pass("f1").await;

    let json = serde_json::to_value(cluster.status("f1")).unwrap();

    assert_eq!(json["state"]["phase"], "Running");
    assert_eq!(json["runningJobs"], serde_json::json!(["f1-a"]));
    assert_eq!(json["conditions"]["f1-a"]["phase"], "Running");
    let history = &json["jobStatusList"][0]["runningHistories"][0];
    assert_eq!(history["state"], "Running");
    assert_eq!(history["startTimestamp"], "2023-11-14T22:13:22Z");
}
