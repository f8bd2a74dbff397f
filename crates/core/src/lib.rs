// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobflow-core: domain model for the JobFlow controller.
//!
//! Types mirror the JSON schema of the JobFlow, JobTemplate and Job custom
//! resources so that conversion to and from the cluster is a serde round trip.
//! Metadata, timestamps and durations are the upstream k8s-openapi and kube
//! types.

pub mod macros;

pub mod clock;
pub mod flow;
pub mod job;
pub mod meta;
pub mod status;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use flow::{
    DependsOn, Flow, FlowAction, FlowEvent, FlowPhase, FlowRequest, InvalidPhase, JobFlow,
    JobFlowSpec, RetainPolicy,
};
pub use job::{Job, JobPhase, JobRunStatus, JobState, TaskState};
pub use meta::{
    is_job_flow_ref, managed_job_name, parse_template_link, template_link, MetaExt, ObjectKey,
    ObjectMeta, OwnerReference, Time,
};
pub use status::{Condition, FlowState, JobFlowStatus, JobStatus, PhaseBucket, RunningHistory};
pub use template::{JobTemplate, JobTemplateStatus};
