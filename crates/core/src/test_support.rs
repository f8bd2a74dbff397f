// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Flow, Job, JobFlow, JobFlowSpec, JobPhase, JobTemplate, ObjectMeta, RetainPolicy};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for job phases.
pub mod strategies {
    use crate::JobPhase;
    use proptest::prelude::*;

    pub fn arb_job_phase() -> impl Strategy<Value = JobPhase> {
        prop_oneof![
            Just(JobPhase::Unset),
            Just(JobPhase::Pending),
            Just(JobPhase::Running),
            Just(JobPhase::Restarting),
            Just(JobPhase::Completing),
            Just(JobPhase::Completed),
            Just(JobPhase::Terminated),
            Just(JobPhase::Failed),
        ]
    }
}

// ── Resource factory functions ──────────────────────────────────────────

/// A flow with the given steps, retain policy and an empty status.
pub fn flow(namespace: &str, name: &str, flows: Vec<Flow>) -> JobFlow {
    JobFlow {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{name}")),
            resource_version: Some("1".to_string()),
            generation: Some(1),
            ..Default::default()
        },
        spec: JobFlowSpec {
            flows,
            job_retain_policy: RetainPolicy::Retain,
        },
        status: Default::default(),
    }
}

/// A template whose spec records its own name, so materialized jobs can be traced back.
pub fn template(namespace: &str, name: &str) -> JobTemplate {
    JobTemplate {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: serde_json::json!({ "minAvailable": 1, "queue": "default", "template": name }),
        status: Default::default(),
    }
}

/// A job owned by `flow_name` for `step`, already in `phase`.
pub fn job(namespace: &str, flow_name: &str, step: &str, phase: JobPhase) -> Job {
    let owner = flow(namespace, flow_name, Vec::new());
    let mut job = Job::from_template(&owner, step, &template(namespace, step));
    job.metadata.resource_version = Some("1".to_string());
    job.status.state.phase = phase;
    job
}

/// A job with no owner references at all.
pub fn unowned_job(namespace: &str, name: &str, phase: JobPhase) -> Job {
    let mut job = Job {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    job.status.state.phase = phase;
    job
}
