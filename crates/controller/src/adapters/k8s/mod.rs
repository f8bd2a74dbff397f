// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes adapters: the job store over the volcano custom resources and
//! an event recorder writing `core/v1` Events.
//!
//! # Module layout
//!
//! - [`resources`]: resource descriptors and `DynamicObject` conversion

pub(crate) mod resources;

use self::resources::{from_dynamic, status_body, to_dynamic, Resource};
use super::{EventRecorder, EventType, JobFilter, JobStore, ObjectRef, StoreError};
use async_trait::async_trait;
use jobflow_core::{
    Job, JobFlow, JobFlowStatus, JobTemplate, JobTemplateStatus, MetaExt, ObjectKey, ObjectMeta,
    Time,
};
use k8s_openapi::api::core::v1::{Event, ObjectReference};
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::Client;

/// Component name stamped on recorded events.
pub const REPORTING_COMPONENT: &str = "jobflow-controller";

/// Map a kube error onto the store's error kinds.
pub(crate) fn store_error(err: kube::Error, kind: &'static str, key: ObjectKey) -> StoreError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => StoreError::not_found(kind, key),
        kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
            StoreError::already_exists(kind, key)
        }
        kube::Error::SerdeError(e) => StoreError::Invalid(e.to_string()),
        other => StoreError::Transient(format!("{kind} {key}: {other}")),
    }
}

/// [`JobStore`] over `kube::Api<DynamicObject>`.
#[derive(Clone)]
pub struct KubeJobStore {
    client: Client,
}

impl KubeJobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: Resource, namespace: &str) -> Api<DynamicObject> {
        let ar = resource.api_resource();
        Api::namespaced_with(self.client.clone(), namespace, &ar)
    }
}

#[async_trait]
impl JobStore for KubeJobStore {
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let obj = self
            .api(Resource::Job, namespace)
            .get(name)
            .await
            .map_err(|e| store_error(e, Resource::Job.kind(), key))?;
        from_dynamic(obj)
    }

    async fn list_jobs(&self, namespace: &str, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        let key = ObjectKey::new(namespace, "");
        let list = self
            .api(Resource::Job, namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| store_error(e, Resource::Job.kind(), key))?;

        let mut jobs = Vec::with_capacity(list.items.len());
        for obj in list.items {
            let job: Job = from_dynamic(obj)?;
            if filter.matches(&job) {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn create_job(&self, job: &Job) -> Result<Job, StoreError> {
        let key = job.metadata.key();
        let obj = to_dynamic(job, Resource::Job)?;
        let created = self
            .api(Resource::Job, &key.namespace)
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|e| store_error(e, Resource::Job.kind(), key))?;
        from_dynamic(created)
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = ObjectKey::new(namespace, name);
        self.api(Resource::Job, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| store_error(e, Resource::Job.kind(), key))?;
        Ok(())
    }

    async fn get_job_template(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<JobTemplate, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let obj = self
            .api(Resource::JobTemplate, namespace)
            .get(name)
            .await
            .map_err(|e| store_error(e, Resource::JobTemplate.kind(), key))?;
        from_dynamic(obj)
    }

    async fn update_template_status(
        &self,
        template: &JobTemplate,
        status: &JobTemplateStatus,
    ) -> Result<JobTemplate, StoreError> {
        let key = template.key();
        let mut updated = template.clone();
        updated.status = status.clone();
        let body = status_body(&updated, Resource::JobTemplate)?;
        let obj = self
            .api(Resource::JobTemplate, &key.namespace)
            .replace_status(&key.name, &PostParams::default(), body)
            .await
            .map_err(|e| store_error(e, Resource::JobTemplate.kind(), key))?;
        from_dynamic(obj)
    }

    async fn get_flow(&self, namespace: &str, name: &str) -> Result<JobFlow, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let obj = self
            .api(Resource::JobFlow, namespace)
            .get(name)
            .await
            .map_err(|e| store_error(e, Resource::JobFlow.kind(), key))?;
        from_dynamic(obj)
    }

    async fn update_flow_status(
        &self,
        flow: &JobFlow,
        status: &JobFlowStatus,
    ) -> Result<JobFlow, StoreError> {
        let key = flow.key();
        let mut updated = flow.clone();
        updated.status = status.clone();
        let body = status_body(&updated, Resource::JobFlow)?;
        let obj = self
            .api(Resource::JobFlow, &key.namespace)
            .replace_status(&key.name, &PostParams::default(), body)
            .await
            .map_err(|e| store_error(e, Resource::JobFlow.kind(), key))?;
        from_dynamic(obj)
    }
}

/// [`EventRecorder`] creating `core/v1` Event objects.
#[derive(Clone)]
pub struct KubeEventRecorder {
    client: Client,
}

impl KubeEventRecorder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Build the Event object for one recording.
pub(crate) fn build_event(
    object: &ObjectRef,
    kind: EventType,
    reason: &str,
    message: &str,
    now: Time,
) -> Event {
    Event {
        metadata: ObjectMeta {
            generate_name: Some(format!("{}.", object.name)),
            namespace: Some(object.namespace.clone()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            api_version: Some(object.api_version.clone()),
            kind: Some(object.kind.clone()),
            name: Some(object.name.clone()),
            namespace: Some(object.namespace.clone()),
            uid: non_empty(&object.uid),
            resource_version: non_empty(&object.resource_version),
            ..Default::default()
        },
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        type_: Some(kind.to_string()),
        count: Some(1),
        first_timestamp: Some(now.clone()),
        last_timestamp: Some(now),
        reporting_component: Some(REPORTING_COMPONENT.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl EventRecorder for KubeEventRecorder {
    async fn record(&self, object: &ObjectRef, kind: EventType, reason: &str, message: &str) {
        let event = build_event(object, kind, reason, message, Time(chrono::Utc::now()));
        let events: Api<Event> = Api::namespaced(self.client.clone(), &object.namespace);
        if let Err(e) = events.create(&PostParams::default(), &event).await {
            tracing::warn!(
                object = %ObjectKey::new(&object.namespace, &object.name),
                %reason,
                error = %e,
                "failed to record event"
            );
        }
    }
}

#[cfg(test)]
#[path = "k8s_tests.rs"]
mod tests;
