// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::jobflow::test_helpers::Harness;
use chrono::DateTime;
use jobflow_core::test_support::strategies::arb_job_phase;
use jobflow_core::test_support::{flow, job, unowned_job};
use jobflow_core::{Flow, FlowState};
use proptest::prelude::*;
use std::time::Duration;
use yare::parameterized;

const T0: i64 = 1_700_000_000_000;

/// `T0` shifted by `offset_ms`.
fn at(offset_ms: i64) -> Time {
    Time(DateTime::from_timestamp_millis(T0 + offset_ms).unwrap())
}

fn names(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn fresh(jobs: &[Job], now: &Time) -> JobFlowStatus {
    aggregate_status(&JobFlowStatus::default(), jobs, now)
}

#[parameterized(
    pending = { JobPhase::Pending, PhaseBucket::Pending },
    running = { JobPhase::Running, PhaseBucket::Running },
    completing = { JobPhase::Completing, PhaseBucket::Completed },
    completed = { JobPhase::Completed, PhaseBucket::Completed },
    terminating = { JobPhase::Terminating, PhaseBucket::Terminated },
    terminated = { JobPhase::Terminated, PhaseBucket::Terminated },
    failed = { JobPhase::Failed, PhaseBucket::Failed },
    restarting = { JobPhase::Restarting, PhaseBucket::Unknown },
    aborted = { JobPhase::Aborted, PhaseBucket::Unknown },
    unset = { JobPhase::Unset, PhaseBucket::Unknown },
)]
fn job_lands_in_phase_bucket(phase: JobPhase, bucket: PhaseBucket) {
    let status = fresh(&[job("ns", "f1", "a", phase)], &at(0));

    for b in PhaseBucket::ALL {
        let expected = if b == bucket {
            names(&["f1-a"])
        } else {
            Vec::new()
        };
        assert_eq!(status.bucket(b), &expected, "bucket {b:?}");
    }
}

#[test]
fn condition_mirrors_job() {
    let mut j = job("ns", "f1", "a", JobPhase::Running);
    j.metadata.creation_timestamp = Some(at(-5_000));
    j.status.running_duration = Some(Duration::from_secs(3).into());
    let worker = j
        .status
        .task_status_count
        .entry("worker".to_string())
        .or_default();
    worker.phase.insert("Running".to_string(), 2);

    let status = fresh(&[j.clone()], &at(0));

    let condition = &status.conditions["f1-a"];
    assert_eq!(condition.phase, JobPhase::Running);
    assert_eq!(condition.create_timestamp, Some(at(-5_000)));
    assert_eq!(condition.running_duration, j.status.running_duration);
    assert_eq!(condition.task_status_count, j.status.task_status_count);
}

#[test]
fn job_status_record_tracks_timestamps_and_restarts() {
    let mut j = job("ns", "f1", "a", JobPhase::Completed);
    j.metadata.creation_timestamp = Some(at(-10_000));
    j.status.running_duration = Some(Duration::from_secs(4).into());
    j.status.retry_count = 2;

    let status = fresh(&[j], &at(0));

    let record = status.job_status("f1-a").unwrap();
    assert_eq!(record.state, JobPhase::Completed);
    assert_eq!(record.start_timestamp, Some(at(-10_000)));
    assert_eq!(record.end_timestamp, Some(at(-6_000)));
    assert_eq!(record.restart_count, 2);
    assert_eq!(
        record.running_histories,
        vec![RunningHistory::open(at(0), JobPhase::Completed)]
    );
}

#[test]
fn record_without_running_duration_has_no_end() {
    let mut j = job("ns", "f1", "a", JobPhase::Running);
    j.metadata.creation_timestamp = Some(at(-10_000));

    let status = fresh(&[j], &at(0));

    let record = status.job_status("f1-a").unwrap();
    assert_eq!(record.start_timestamp, Some(at(-10_000)));
    assert_eq!(record.end_timestamp, None);
}

#[test]
fn history_waits_for_first_phase() {
    let status = fresh(&[job("ns", "f1", "a", JobPhase::Unset)], &at(0));

    let record = status.job_status("f1-a").unwrap();
    assert!(record.running_histories.is_empty());
    assert_eq!(status.unknown_jobs, names(&["f1-a"]));
}

#[test]
fn phase_change_closes_and_opens_history() {
    let first = fresh(&[job("ns", "f1", "a", JobPhase::Pending)], &at(0));
    let running = [job("ns", "f1", "a", JobPhase::Running)];
    let second = aggregate_status(&first, &running, &at(1_000));

    assert_eq!(
        second.job_status("f1-a").unwrap().running_histories,
        vec![
            RunningHistory {
                start_timestamp: Some(at(0)),
                end_timestamp: Some(at(1_000)),
                state: JobPhase::Pending,
            },
            RunningHistory::open(at(1_000), JobPhase::Running),
        ]
    );
    assert!(second.pending_jobs.is_empty());
    assert_eq!(second.running_jobs, names(&["f1-a"]));
}

#[test]
fn repeated_observation_is_idempotent() {
    let jobs = vec![
        job("ns", "f1", "a", JobPhase::Completed),
        job("ns", "f1", "b", JobPhase::Running),
        job("ns", "f1", "c", JobPhase::Unset),
    ];
    let once = fresh(&jobs, &at(0));
    let twice = aggregate_status(&once, &jobs, &at(60_000));

    assert_eq!(once, twice);
    assert_eq!(
        serde_json::to_vec(&once).unwrap(),
        serde_json::to_vec(&twice).unwrap()
    );
}

#[test]
fn vanished_jobs_are_kept() {
    let first = fresh(
        &[
            job("ns", "f1", "a", JobPhase::Completed),
            job("ns", "f1", "b", JobPhase::Running),
        ],
        &at(0),
    );
    let completed = [job("ns", "f1", "a", JobPhase::Completed)];
    let second = aggregate_status(&first, &completed, &at(1));

    assert_eq!(second.running_jobs, names(&["f1-b"]));
    assert!(second.conditions.contains_key("f1-b"));
    assert!(second.job_status("f1-b").is_some());
    assert_eq!(second, first);
}

#[test]
fn previous_flow_phase_is_carried() {
    let previous = JobFlowStatus {
        state: FlowState {
            phase: "Running".to_string(),
        },
        ..Default::default()
    };

    let running = [job("ns", "f1", "a", JobPhase::Running)];
    let status = aggregate_status(&previous, &running, &at(0));

    assert_eq!(status.state.phase, "Running");
}

#[test]
fn existing_record_is_updated_in_place() {
    let first = fresh(
        &[
            job("ns", "f1", "a", JobPhase::Running),
            job("ns", "f1", "b", JobPhase::Running),
        ],
        &at(0),
    );
    let failed = [job("ns", "f1", "a", JobPhase::Failed)];
    let second = aggregate_status(&first, &failed, &at(5));

    let order: Vec<&str> = second
        .job_status_list
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(order, vec!["f1-a", "f1-b"]);
    assert_eq!(second.job_status("f1-a").unwrap().state, JobPhase::Failed);
    assert_eq!(second.failed_jobs, names(&["f1-a"]));
    assert_eq!(second.running_jobs, names(&["f1-b"]));
}

#[test]
fn empty_history_in_record_opens_fresh() {
    let previous = JobFlowStatus {
        job_status_list: vec![JobStatus {
            name: "f1-a".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let pending = [job("ns", "f1", "a", JobPhase::Pending)];
    let status = aggregate_status(&previous, &pending, &at(0));

    assert_eq!(
        status.job_status("f1-a").unwrap().running_histories,
        vec![RunningHistory::open(at(0), JobPhase::Pending)]
    );
}

#[tokio::test]
async fn aggregate_only_sees_owned_jobs() {
    let f = flow("ns", "f1", vec![Flow::new("a")]);
    let h = Harness::with_flow(&f);
    let store = &h.store;
    store.insert_job(job("ns", "f1", "a", JobPhase::Running));
    store.insert_job(job("ns", "f2", "a", JobPhase::Running));
    store.insert_job(job("other", "f1", "a", JobPhase::Running));
    store.insert_job(unowned_job("ns", "stray", JobPhase::Running));

    let status = h.reconciler.aggregate(&f).await.unwrap();

    assert_eq!(status.running_jobs, names(&["f1-a"]));
    assert_eq!(status.job_status_list.len(), 1);
    assert_eq!(
        status.job_status("f1-a").unwrap().running_histories,
        vec![RunningHistory::open(h.clock.now(), JobPhase::Running)]
    );
}

fn expected_entries(phases: &[JobPhase]) -> usize {
    let mut seen: Vec<&JobPhase> = Vec::new();
    for phase in phases.iter().skip_while(|p| p.is_unset()) {
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
    }
    seen.len()
}

proptest! {
    #[test]
    fn history_has_one_open_entry_per_phase_run(
        phases in proptest::collection::vec(arb_job_phase(), 0..24),
    ) {
        let mut histories = Vec::new();
        for (i, phase) in phases.iter().enumerate() {
            histories = advance_history(histories, phase, &at(i as i64 * 1_000));
        }

        let open = histories.iter().filter(|h| h.is_open()).count();
        prop_assert!(open <= 1);
        if let Some(last) = histories.last() {
            prop_assert!(last.is_open());
        }
        prop_assert_eq!(histories.len(), expected_entries(&phases));
        for pair in histories.windows(2) {
            prop_assert_eq!(&pair[0].end_timestamp, &pair[1].start_timestamp);
            prop_assert_ne!(&pair[0].state, &pair[1].state);
        }
    }

    #[test]
    fn aggregation_is_idempotent(phases in proptest::collection::vec(arb_job_phase(), 1..6)) {
        let jobs: Vec<Job> = phases
            .into_iter()
            .enumerate()
            .map(|(i, phase)| job("ns", "f1", &format!("s{i}"), phase))
            .collect();

        let once = fresh(&jobs, &at(0));
        let twice = aggregate_status(&once, &jobs, &at(1_000));
        prop_assert_eq!(once, twice);
    }
}
