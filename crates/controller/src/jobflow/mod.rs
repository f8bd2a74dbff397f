// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobFlow reconciliation.
//!
//! One pass of [`JobFlowReconciler::sync`] runs, in order:
//!
//! 1. [`deploy`](JobFlowReconciler::deploy): create jobs whose dependencies completed
//! 2. [`aggregate`](JobFlowReconciler::aggregate): fold owned jobs into the status
//! 3. [`next_phase`]: advance the flow phase from the aggregated status
//! 4. persist the status
//!
//! A succeeded flow with `delete` retention instead runs
//! [`reconcile_retention`](JobFlowReconciler::reconcile_retention) and nothing else.

mod aggregate;
mod deploy;
mod handler;
mod phase;
mod retention;

pub use aggregate::{advance_history, aggregate_status};
pub use deploy::Deferral;
pub use handler::{on_flow_added, on_flow_updated, on_job_updated};
pub use phase::next_phase;

use crate::adapters::{EventRecorder, EventType, JobStore, ObjectRef};
use crate::error::ReconcileError;
use crate::runtime::Reconcile;
use async_trait::async_trait;
use jobflow_core::meta::JOB_FLOW_KIND;
use jobflow_core::{Clock, FlowRequest};

/// Drives JobFlows toward their declared DAG.
pub struct JobFlowReconciler<S, R, C> {
    store: S,
    recorder: R,
    clock: C,
}

impl<S, R, C> JobFlowReconciler<S, R, C>
where
    S: JobStore,
    R: EventRecorder,
    C: Clock,
{
    pub fn new(store: S, recorder: R, clock: C) -> Self {
        Self {
            store,
            recorder,
            clock,
        }
    }

    /// Run one reconcile pass for the flow named by `request`.
    ///
    /// A flow that no longer exists is not an error. Failed and Terminating
    /// flows are left alone entirely.
    pub async fn sync(&self, request: &FlowRequest) -> Result<(), ReconcileError> {
        let key = &request.key;
        let flow = match self.store.get_flow(&key.namespace, &key.name).await {
            Ok(flow) => flow,
            Err(e) if e.is_not_found() => {
                tracing::debug!(flow = %key, "jobflow has been deleted");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let phase = flow.phase().map_err(|e| ReconcileError::InvalidPhase {
            flow: key.clone(),
            phase: e.0,
        })?;

        if flow.should_delete_jobs() {
            self.reconcile_retention(&flow).await?;
            return Ok(());
        }
        if !phase.syncs() {
            tracing::debug!(flow = %key, %phase, "nothing to do in phase");
            return Ok(());
        }

        self.deploy(&flow).await?;
        let mut status = self.aggregate(&flow).await?;
        let next = next_phase(phase, &status, flow.spec.flows.len());
        if next != phase {
            tracing::info!(flow = %key, from = %phase, to = %next, "jobflow phase changed");
        }
        status.state.phase = next.to_string();
        self.store.update_flow_status(&flow, &status).await?;
        Ok(())
    }

    /// Record a Warning event against the flow of a request that exhausted its retries.
    async fn record_dropped(&self, request: &FlowRequest, err: &ReconcileError) {
        let key = &request.key;
        let object = match self.store.get_flow(&key.namespace, &key.name).await {
            Ok(flow) => ObjectRef::for_flow(&flow),
            Err(e) => {
                tracing::error!(flow = %key, error = %e, "get jobflow failed, event not recorded");
                return;
            }
        };
        let reason = request.action.to_string();
        let message = format!("{} JobFlow failed for {}", request.action, err);
        self.recorder
            .record(&object, EventType::Warning, &reason, &message)
            .await;
    }
}

#[async_trait]
impl<S, R, C> Reconcile for JobFlowReconciler<S, R, C>
where
    S: JobStore,
    R: EventRecorder,
    C: Clock,
{
    type Request = FlowRequest;

    const KIND: &'static str = JOB_FLOW_KIND;

    async fn reconcile(&self, request: &FlowRequest) -> Result<(), ReconcileError> {
        self.sync(request).await
    }

    async fn report_dropped(&self, request: &FlowRequest, err: &ReconcileError) {
        self.record_dropped(request, err).await
    }
}

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
