// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow-level status: per-phase job buckets, per-job conditions and the
//! running-history timeline.

use crate::job::{JobPhase, TaskState};
use crate::meta::Time;
use kube::core::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    /// Raw phase string; see [`crate::JobFlow::phase`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phase: String,
}

/// Latest observation of one managed job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "JobPhase::is_unset")]
    pub phase: JobPhase,
    #[serde(default, rename = "createTime", skip_serializing_if = "Option::is_none")]
    pub create_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub task_status_count: BTreeMap<String, TaskState>,
}

/// One segment of a job's phase timeline. A segment without an end is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "JobPhase::is_unset")]
    pub state: JobPhase,
}

impl RunningHistory {
    pub fn open(at: Time, state: JobPhase) -> Self {
        Self {
            start_timestamp: Some(at),
            end_timestamp: None,
            state,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_timestamp.is_none()
    }
}

/// Per-job record kept in the flow status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "JobPhase::is_unset")]
    pub state: JobPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<Time>,
    #[serde(default)]
    pub restart_count: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub running_histories: Vec<RunningHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFlowStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub running_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminated_jobs: Vec<String>,
    #[serde(default, rename = "unKnowJobs", skip_serializing_if = "Vec::is_empty")]
    pub unknown_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_status_list: Vec<JobStatus>,
    #[serde(default)]
    pub conditions: BTreeMap<String, Condition>,
    #[serde(default)]
    pub state: FlowState,
}

/// Which name list of [`JobFlowStatus`] a job phase lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseBucket {
    Pending,
    Running,
    Completed,
    Terminated,
    Failed,
    Unknown,
}

impl PhaseBucket {
    pub const ALL: [PhaseBucket; 6] = [
        PhaseBucket::Pending,
        PhaseBucket::Running,
        PhaseBucket::Completed,
        PhaseBucket::Terminated,
        PhaseBucket::Failed,
        PhaseBucket::Unknown,
    ];

    pub fn of(phase: &JobPhase) -> Self {
        match phase {
            JobPhase::Pending => PhaseBucket::Pending,
            JobPhase::Running => PhaseBucket::Running,
            JobPhase::Completing | JobPhase::Completed => PhaseBucket::Completed,
            JobPhase::Terminating | JobPhase::Terminated => PhaseBucket::Terminated,
            JobPhase::Failed => PhaseBucket::Failed,
            _ => PhaseBucket::Unknown,
        }
    }
}

impl JobFlowStatus {
    pub fn bucket(&self, bucket: PhaseBucket) -> &Vec<String> {
        match bucket {
            PhaseBucket::Pending => &self.pending_jobs,
            PhaseBucket::Running => &self.running_jobs,
            PhaseBucket::Completed => &self.completed_jobs,
            PhaseBucket::Terminated => &self.terminated_jobs,
            PhaseBucket::Failed => &self.failed_jobs,
            PhaseBucket::Unknown => &self.unknown_jobs,
        }
    }

    pub fn bucket_mut(&mut self, bucket: PhaseBucket) -> &mut Vec<String> {
        match bucket {
            PhaseBucket::Pending => &mut self.pending_jobs,
            PhaseBucket::Running => &mut self.running_jobs,
            PhaseBucket::Completed => &mut self.completed_jobs,
            PhaseBucket::Terminated => &mut self.terminated_jobs,
            PhaseBucket::Failed => &mut self.failed_jobs,
            PhaseBucket::Unknown => &mut self.unknown_jobs,
        }
    }

    pub fn job_status(&self, name: &str) -> Option<&JobStatus> {
        self.job_status_list.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
