// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation of watch notifications into reconcile requests.

use jobflow_core::{FlowPhase, FlowRequest, Job, JobFlow, MetaExt, ObjectKey, RetainPolicy};

pub fn on_flow_added(flow: &JobFlow) -> Option<FlowRequest> {
    Some(FlowRequest::sync(flow.key()))
}

/// A flow update is worth a pass when the spec changed or the flow just
/// reached a state where its jobs must be cleaned up.
///
/// Status writes by the controller itself bump the resource version but not
/// the generation, so they are ignored.
pub fn on_flow_updated(old: &JobFlow, new: &JobFlow) -> Option<FlowRequest> {
    if old.metadata.resource_version == new.metadata.resource_version {
        return None;
    }
    let spec_changed = old.metadata.generation != new.metadata.generation;
    let needs_cleanup = new.spec.job_retain_policy == RetainPolicy::Delete
        && matches!(new.phase(), Ok(FlowPhase::Succeed));
    if !spec_changed && !needs_cleanup {
        return None;
    }
    Some(FlowRequest::sync(new.key()))
}

/// A job update wakes its owning flow, provided a JobFlow controls the job.
pub fn on_job_updated(old: &Job, new: &Job) -> Option<FlowRequest> {
    if old.metadata.resource_version == new.metadata.resource_version {
        return None;
    }
    if !new.is_controlled_by_flow() {
        return None;
    }
    let flow = new.owning_flow()?;
    let key = ObjectKey::new(new.metadata.namespace_str(), flow);
    Some(FlowRequest::sync(key))
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
