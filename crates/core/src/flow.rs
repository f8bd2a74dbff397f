// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobFlow resource: a DAG of steps, each materialized from a JobTemplate.

use crate::meta::{managed_job_name, MetaExt, ObjectKey, ObjectMeta};
use crate::status::JobFlowStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Whether managed jobs are kept or deleted once the flow succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetainPolicy {
    #[default]
    #[serde(alias = "Retain")]
    Retain,
    #[serde(alias = "Delete")]
    Delete,
}

crate::simple_display! {
    RetainPolicy {
        Retain => "retain",
        Delete => "delete",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    /// Readiness probe; carried through but not evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<serde_json::Value>,
}

/// One step of a flow. `name` is also the name of the template it uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: None,
        }
    }

    pub fn depending_on<I, S>(name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            depends_on: Some(DependsOn {
                targets: targets.into_iter().map(Into::into).collect(),
                probe: None,
            }),
        }
    }

    /// Dependency targets; empty when the step has none.
    pub fn targets(&self) -> &[String] {
        self.depends_on
            .as_ref()
            .map(|d| d.targets.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFlowSpec {
    #[serde(default)]
    pub flows: Vec<Flow>,
    #[serde(default)]
    pub job_retain_policy: RetainPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFlow {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: JobFlowSpec,
    #[serde(default)]
    pub status: JobFlowStatus,
}

impl JobFlow {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// Managed job name for one of this flow's steps.
    pub fn job_name(&self, step: &str) -> String {
        managed_job_name(self.metadata.name_str(), step)
    }

    /// Parsed phase of the flow; an empty phase is `Pending`.
    pub fn phase(&self) -> Result<FlowPhase, InvalidPhase> {
        self.status.state.phase.parse()
    }

    /// Whether the retention reconciler owns this cycle.
    pub fn should_delete_jobs(&self) -> bool {
        self.spec.job_retain_policy == RetainPolicy::Delete
            && matches!(self.phase(), Ok(FlowPhase::Succeed))
    }
}

crate::macros::namespaced_resource!(
    JobFlow,
    group: "flow.volcano.sh",
    kind: "JobFlow",
    plural: "jobflows"
);

/// Phase of a flow as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowPhase {
    Pending,
    Running,
    Succeed,
    Failed,
    Terminating,
}

impl FlowPhase {
    /// Whether a sync action in this phase touches the store at all.
    pub fn syncs(self) -> bool {
        matches!(
            self,
            FlowPhase::Pending | FlowPhase::Running | FlowPhase::Succeed
        )
    }
}

crate::simple_display! {
    FlowPhase {
        Pending => "Pending",
        Running => "Running",
        Succeed => "Succeed",
        Failed => "Failed",
        Terminating => "Terminating",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid flow phase {0:?}")]
pub struct InvalidPhase(pub String);

impl FromStr for FlowPhase {
    type Err = InvalidPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "Pending" => Ok(FlowPhase::Pending),
            "Running" => Ok(FlowPhase::Running),
            "Succeed" => Ok(FlowPhase::Succeed),
            "Failed" => Ok(FlowPhase::Failed),
            "Terminating" => Ok(FlowPhase::Terminating),
            other => Err(InvalidPhase(other.to_string())),
        }
    }
}

/// Action carried by a reconcile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowAction {
    SyncJobFlow,
}

crate::simple_display! {
    FlowAction {
        SyncJobFlow => "SyncJobFlow",
    }
}

/// What made the request necessary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEvent {
    OutOfSync,
}

crate::simple_display! {
    FlowEvent {
        OutOfSync => "OutOfSync",
    }
}

/// Reconcile request for one flow, deduplicated by the work queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowRequest {
    pub key: ObjectKey,
    pub action: FlowAction,
    pub event: FlowEvent,
}

impl FlowRequest {
    pub fn sync(key: ObjectKey) -> Self {
        Self {
            key,
            action: FlowAction::SyncJobFlow,
            event: FlowEvent::OutOfSync,
        }
    }
}

impl std::fmt::Display for FlowRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.action, self.key, self.event)
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
