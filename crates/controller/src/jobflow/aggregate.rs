// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status aggregation: fold the observed jobs of a flow into its status.
//!
//! Nothing is ever pruned. A job that disappears from the store keeps its
//! bucket membership, condition and status record from the last time it was
//! seen, so the flow status stays a full account of every job it ever owned.

use super::JobFlowReconciler;
use crate::adapters::{EventRecorder, JobFilter, JobStore};
use crate::error::ReconcileError;
use jobflow_core::{
    Clock, Condition, Job, JobFlow, JobFlowStatus, JobPhase, JobStatus, MetaExt, PhaseBucket,
    RunningHistory, Time,
};

impl<S, R, C> JobFlowReconciler<S, R, C>
where
    S: JobStore,
    R: EventRecorder,
    C: Clock,
{
    /// List the jobs owned by `flow` and fold them into a new status.
    ///
    /// The returned status carries the flow's previous phase unchanged.
    pub async fn aggregate(&self, flow: &JobFlow) -> Result<JobFlowStatus, ReconcileError> {
        let owned = JobFilter::OwnedByFlow(flow.metadata.name_str().to_string());
        let namespace = flow.metadata.namespace_str();
        let jobs = self.store.list_jobs(namespace, &owned).await?;
        tracing::debug!(flow = %flow.key(), jobs = jobs.len(), "aggregating job status");
        Ok(aggregate_status(&flow.status, &jobs, &self.clock.now()))
    }
}

/// Fold `jobs` into a copy of `previous`, stamping history changes at `now`.
///
/// Repeating the call with the same jobs and phases returns the same status.
pub fn aggregate_status(previous: &JobFlowStatus, jobs: &[Job], now: &Time) -> JobFlowStatus {
    let mut status = previous.clone();
    for job in jobs {
        observe(&mut status, job, now);
    }
    status
}

fn observe(status: &mut JobFlowStatus, job: &Job, now: &Time) {
    let name = job.name();
    let phase = job.phase();

    let bucket = PhaseBucket::of(phase);
    for other in PhaseBucket::ALL {
        if other != bucket {
            status.bucket_mut(other).retain(|n| n != name);
        }
    }
    let members = status.bucket_mut(bucket);
    if !members.iter().any(|n| n == name) {
        members.push(name.to_string());
    }

    status.conditions.insert(
        name.to_string(),
        Condition {
            phase: phase.clone(),
            create_timestamp: job.metadata.creation_timestamp.clone(),
            running_duration: job.status.running_duration,
            task_status_count: job.status.task_status_count.clone(),
        },
    );

    let histories = status
        .job_status(name)
        .map(|s| s.running_histories.clone())
        .unwrap_or_default();
    let record = JobStatus {
        name: name.to_string(),
        state: phase.clone(),
        start_timestamp: job.metadata.creation_timestamp.clone(),
        end_timestamp: job.end_timestamp(),
        restart_count: job.status.retry_count,
        running_histories: advance_history(histories, phase, now),
    };
    match status.job_status_list.iter_mut().find(|s| s.name == name) {
        Some(existing) => *existing = record,
        None => status.job_status_list.push(record),
    }
}

/// Extend a job's running history with the phase observed at `now`.
///
/// An empty history opens its first entry once the job reports a phase. A
/// changed phase closes the open entry at `now` and opens the next one.
pub fn advance_history(
    mut histories: Vec<RunningHistory>,
    phase: &JobPhase,
    now: &Time,
) -> Vec<RunningHistory> {
    match histories.last_mut() {
        None if phase.is_unset() => {}
        None => histories.push(RunningHistory::open(now.clone(), phase.clone())),
        Some(last) if last.state != *phase => {
            last.end_timestamp = Some(now.clone());
            histories.push(RunningHistory::open(now.clone(), phase.clone()));
        }
        Some(_) => {}
    }
    histories
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
