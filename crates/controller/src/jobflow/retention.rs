// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job cleanup for succeeded flows with `delete` retention.

use super::JobFlowReconciler;
use crate::adapters::{EventRecorder, JobFilter, JobStore};
use crate::error::ReconcileError;
use jobflow_core::{Clock, JobFlow, MetaExt};

impl<S, R, C> JobFlowReconciler<S, R, C>
where
    S: JobStore,
    R: EventRecorder,
    C: Clock,
{
    /// Delete every job owned by `flow`. Jobs already gone are skipped.
    ///
    /// Returns how many jobs this call deleted.
    pub async fn reconcile_retention(&self, flow: &JobFlow) -> Result<usize, ReconcileError> {
        let namespace = flow.metadata.namespace_str();
        let owned = JobFilter::OwnedByFlow(flow.metadata.name_str().to_string());
        let jobs = self.store.list_jobs(namespace, &owned).await?;

        let mut deleted = 0;
        for job in &jobs {
            match self.store.delete_job(namespace, job.name()).await {
                Ok(()) => deleted += 1,
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    tracing::error!(
                        flow = %flow.key(),
                        job = %job.name(),
                        error = %e,
                        "failed to delete job"
                    );
                    return Err(e.into());
                }
            }
        }
        if deleted > 0 {
            tracing::info!(flow = %flow.key(), deleted, "deleted jobs of succeeded flow");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
