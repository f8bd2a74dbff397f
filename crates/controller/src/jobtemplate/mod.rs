// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobTemplate reconciliation: record which jobs were materialized from
//! each template in its status.

use crate::adapters::{EventRecorder, EventType, JobFilter, JobStore, ObjectRef};
use crate::error::ReconcileError;
use crate::runtime::Reconcile;
use async_trait::async_trait;
use jobflow_core::meta::JOB_TEMPLATE_KIND;
use jobflow_core::{
    parse_template_link, template_link, Job, JobTemplate, JobTemplateStatus, ObjectKey,
};

/// Reason recorded when a template request is dropped.
pub const SYNC_JOB_TEMPLATE: &str = "SyncJobTemplate";

pub struct JobTemplateReconciler<S, R> {
    store: S,
    recorder: R,
}

impl<S, R> JobTemplateReconciler<S, R>
where
    S: JobStore,
    R: EventRecorder,
{
    pub fn new(store: S, recorder: R) -> Self {
        Self { store, recorder }
    }

    /// Refresh `status.jobDependsOnList` of the template at `key`.
    ///
    /// Leaves the status alone when no job links back to the template.
    pub async fn sync(&self, key: &ObjectKey) -> Result<(), ReconcileError> {
        let template = match self.store.get_job_template(&key.namespace, &key.name).await {
            Ok(template) => template,
            Err(e) if e.is_not_found() => {
                tracing::debug!(template = %key, "jobtemplate has been deleted");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let link = JobFilter::CreatedByTemplate(template_link(&key.namespace, &key.name));
        let jobs = self.store.list_jobs(&key.namespace, &link).await?;
        if jobs.is_empty() {
            return Ok(());
        }

        let status = JobTemplateStatus {
            job_depends_on_list: jobs.iter().map(|j| j.name().to_string()).collect(),
        };
        self.store.update_template_status(&template, &status).await?;
        tracing::debug!(template = %key, jobs = jobs.len(), "updated jobtemplate status");
        Ok(())
    }
}

#[async_trait]
impl<S, R> Reconcile for JobTemplateReconciler<S, R>
where
    S: JobStore,
    R: EventRecorder,
{
    type Request = ObjectKey;

    const KIND: &'static str = JOB_TEMPLATE_KIND;

    async fn reconcile(&self, key: &ObjectKey) -> Result<(), ReconcileError> {
        self.sync(key).await
    }

    async fn report_dropped(&self, key: &ObjectKey, err: &ReconcileError) {
        let template = match self.store.get_job_template(&key.namespace, &key.name).await {
            Ok(template) => template,
            Err(e) => {
                tracing::error!(
                    template = %key,
                    error = %e,
                    "get jobtemplate failed, event not recorded"
                );
                return;
            }
        };
        let message = format!("{SYNC_JOB_TEMPLATE} JobTemplate failed for {err}");
        let object = ObjectRef::for_template(&template);
        self.recorder
            .record(&object, EventType::Warning, SYNC_JOB_TEMPLATE, &message)
            .await;
    }
}

pub fn on_template_added(template: &JobTemplate) -> Option<ObjectKey> {
    Some(template.key())
}

/// A new job names its template through the linkage annotation.
pub fn on_job_added(job: &Job) -> Option<ObjectKey> {
    let (namespace, name) = parse_template_link(job.template_link()?)?;
    Some(ObjectKey::new(namespace, name))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
