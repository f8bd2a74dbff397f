// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency-gated job creation.

use super::JobFlowReconciler;
use crate::adapters::{EventRecorder, EventType, JobStore, ObjectRef};
use crate::error::ReconcileError;
use jobflow_core::{Clock, Flow, Job, JobFlow, MetaExt};

/// Why a step's job was not created on this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferral {
    /// A dependency has no job yet.
    MissingTarget(String),
    /// A dependency's job exists but has not completed.
    TargetNotCompleted(String),
}

impl<S, R, C> JobFlowReconciler<S, R, C>
where
    S: JobStore,
    R: EventRecorder,
    C: Clock,
{
    /// Create the job of every step whose dependencies have completed.
    ///
    /// Steps are visited in declared order, so a chain advances one edge per
    /// pass. Existing jobs are never touched and a create that loses a race
    /// counts as done. Returns the names of the jobs created.
    pub async fn deploy(&self, flow: &JobFlow) -> Result<Vec<String>, ReconcileError> {
        let namespace = flow.metadata.namespace_str();
        let mut created = Vec::new();

        for step in &flow.spec.flows {
            let job_name = flow.job_name(&step.name);
            match self.store.get_job(namespace, &job_name).await {
                Ok(_) => continue,
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            if let Some(deferral) = self.check_dependencies(flow, step).await? {
                tracing::debug!(flow = %flow.key(), job = %job_name, ?deferral, "step deferred");
                continue;
            }

            if self.create_step_job(flow, step, &job_name).await? {
                created.push(job_name);
            }
        }
        Ok(created)
    }

    async fn check_dependencies(
        &self,
        flow: &JobFlow,
        step: &Flow,
    ) -> Result<Option<Deferral>, ReconcileError> {
        let namespace = flow.metadata.namespace_str();
        for target in step.targets() {
            let target_job = flow.job_name(target);
            let job = match self.store.get_job(namespace, &target_job).await {
                Ok(job) => job,
                Err(e) if e.is_not_found() => {
                    tracing::info!(flow = %flow.key(), job = %target_job, "target job not found");
                    return Ok(Some(Deferral::MissingTarget(target.clone())));
                }
                Err(e) => return Err(e.into()),
            };
            if !job.phase().is_terminal_success() {
                return Ok(Some(Deferral::TargetNotCompleted(target.clone())));
            }
        }
        Ok(None)
    }

    /// Materialize and create the job for `step`. `Ok(false)` when it already existed.
    async fn create_step_job(
        &self,
        flow: &JobFlow,
        step: &Flow,
        job_name: &str,
    ) -> Result<bool, ReconcileError> {
        let namespace = flow.metadata.namespace_str();
        let template = self.store.get_job_template(namespace, &step.name).await?;
        let job = Job::from_template(flow, &step.name, &template);

        match self.store.create_job(&job).await {
            Ok(_) => {}
            Err(e) if e.is_already_exists() => {
                tracing::debug!(flow = %flow.key(), job = %job_name, "job already exists");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(flow = %flow.key(), job = %job_name, step = %step.name, "created job");
        self.recorder
            .record(
                &ObjectRef::for_flow(flow),
                EventType::Normal,
                "Created",
                &format!("create a job named {job_name}!"),
            )
            .await;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
