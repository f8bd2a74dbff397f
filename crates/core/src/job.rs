// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Managed batch job and its execution phase.

use crate::meta::{
    is_job_flow_ref, managed_job_name, template_link, MetaExt, ObjectMeta, OwnerReference, Time,
    CREATE_BY_JOB_TEMPLATE, FLOW_API_VERSION, JOB_FLOW_KIND,
};
use crate::{JobFlow, JobTemplate};
use kube::core::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Execution phase of a batch job, as reported by the job's own controller.
///
/// Unrecognized values (and the empty phase of a job nobody has looked at
/// yet) are preserved verbatim in [`JobPhase::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobPhase {
    #[default]
    Unset,
    Pending,
    Aborting,
    Aborted,
    Running,
    Restarting,
    Completing,
    Completed,
    Terminating,
    Terminated,
    Failed,
    Other(String),
}

impl JobPhase {
    pub fn is_unset(&self) -> bool {
        matches!(self, JobPhase::Unset)
    }

    /// The phase that satisfies a dependency edge.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, JobPhase::Completed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobPhase::Unset => "",
            JobPhase::Pending => "Pending",
            JobPhase::Aborting => "Aborting",
            JobPhase::Aborted => "Aborted",
            JobPhase::Running => "Running",
            JobPhase::Restarting => "Restarting",
            JobPhase::Completing => "Completing",
            JobPhase::Completed => "Completed",
            JobPhase::Terminating => "Terminating",
            JobPhase::Terminated => "Terminated",
            JobPhase::Failed => "Failed",
            JobPhase::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for JobPhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" => JobPhase::Unset,
            "Pending" => JobPhase::Pending,
            "Aborting" => JobPhase::Aborting,
            "Aborted" => JobPhase::Aborted,
            "Running" => JobPhase::Running,
            "Restarting" => JobPhase::Restarting,
            "Completing" => JobPhase::Completing,
            "Completed" => JobPhase::Completed,
            "Terminating" => JobPhase::Terminating,
            "Terminated" => JobPhase::Terminated,
            "Failed" => JobPhase::Failed,
            _ => JobPhase::Other(s),
        }
    }
}

impl From<&str> for JobPhase {
    fn from(s: &str) -> Self {
        JobPhase::from(s.to_string())
    }
}

impl From<JobPhase> for String {
    fn from(p: JobPhase) -> Self {
        match p {
            JobPhase::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    #[serde(default, skip_serializing_if = "JobPhase::is_unset")]
    pub phase: JobPhase,
}

/// Pod phase counts for one task of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phase: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunStatus {
    #[serde(default)]
    pub state: JobState,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub retry_count: i32,
    /// Go-notation duration, e.g. `"1m30s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub task_status_count: BTreeMap<String, TaskState>,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

/// A batch job. The spec is opaque to the controller and copied verbatim
/// from the template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
    #[serde(default)]
    pub status: JobRunStatus,
}

impl Job {
    pub fn name(&self) -> &str {
        self.metadata.name_str()
    }

    pub fn phase(&self) -> &JobPhase {
        &self.status.state.phase
    }

    fn owner_references(&self) -> impl Iterator<Item = &OwnerReference> {
        self.metadata.owner_references.iter().flatten()
    }

    /// Name of the JobFlow that owns this job, from the first JobFlow owner reference.
    pub fn owning_flow(&self) -> Option<&str> {
        self.owner_references()
            .find(|r| is_job_flow_ref(r))
            .map(|r| r.name.as_str())
    }

    pub fn is_owned_by_flow(&self, flow_name: &str) -> bool {
        self.owner_references()
            .any(|r| is_job_flow_ref(r) && r.name == flow_name)
    }

    /// Whether the controller owner reference is exactly a JobFlow of the flow API version.
    pub fn is_controlled_by_flow(&self) -> bool {
        let Some(owner) = self.metadata.controller_ref() else {
            return false;
        };
        owner.api_version == FLOW_API_VERSION && owner.kind == JOB_FLOW_KIND
    }

    pub fn template_link(&self) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()?
            .get(CREATE_BY_JOB_TEMPLATE)
            .map(String::as_str)
    }

    /// Materialize the job for `step` of `flow` from `template`.
    ///
    /// The result carries a controller back-reference to the flow and the
    /// template linkage annotation; its status is empty.
    pub fn from_template(flow: &JobFlow, step: &str, template: &JobTemplate) -> Job {
        let namespace = flow.metadata.namespace_str();
        let flow_name = flow.metadata.name_str();
        let annotations = BTreeMap::from([(
            CREATE_BY_JOB_TEMPLATE.to_string(),
            template_link(namespace, step),
        )]);

        Job {
            metadata: ObjectMeta {
                name: Some(managed_job_name(flow_name, step)),
                namespace: Some(namespace.to_string()),
                annotations: Some(annotations),
                owner_references: Some(vec![OwnerReference {
                    api_version: FLOW_API_VERSION.to_string(),
                    kind: JOB_FLOW_KIND.to_string(),
                    name: flow_name.to_string(),
                    uid: flow.metadata.uid.clone().unwrap_or_default(),
                    controller: Some(true),
                    block_owner_deletion: Some(true),
                }]),
                ..Default::default()
            },
            spec: template.spec.clone(),
            status: JobRunStatus::default(),
        }
    }

    /// Wall time the job stopped running: creation plus running duration.
    ///
    /// `None` without a creation time or a non-negative running duration.
    pub fn end_timestamp(&self) -> Option<Time> {
        let created = self.metadata.creation_timestamp.as_ref()?;
        let running = self.status.running_duration.filter(|d| !d.is_negative())?;
        let elapsed = chrono::Duration::from_std(running.into()).ok()?;
        created.0.checked_add_signed(elapsed).map(Time)
    }
}

crate::macros::namespaced_resource!(
    Job,
    group: "batch.volcano.sh",
    kind: "Job",
    plural: "jobs"
);

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
