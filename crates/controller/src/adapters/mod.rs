// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters to the cluster: the object store and the event sink.
//!
//! The reconcilers only see the [`JobStore`] and [`EventRecorder`] traits.
//! [`KubeJobStore`] / [`KubeEventRecorder`] talk to a live API server;
//! the fakes keep everything in memory for tests.

pub(crate) mod k8s;

pub use k8s::{KubeEventRecorder, KubeJobStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobStore, FakeRecorder, RecordedEvent, StoreCall, StoreOp};

use async_trait::async_trait;
use jobflow_core::{Job, JobFlow, JobFlowStatus, JobTemplate, JobTemplateStatus, ObjectKey};
use kube::Resource;
use thiserror::Error;

/// Errors from store operations.
///
/// Reconcilers branch on the first two; everything else is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },
    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: &'static str, key: ObjectKey },
    #[error("store unavailable: {0}")]
    Transient(String),
    #[error("invalid object: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, key: ObjectKey) -> Self {
        StoreError::NotFound { kind, key }
    }

    pub fn already_exists(kind: &'static str, key: ObjectKey) -> Self {
        StoreError::AlreadyExists { kind, key }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Which jobs of a namespace a list call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFilter {
    /// Jobs carrying a JobFlow owner reference with this flow name.
    OwnedByFlow(String),
    /// Jobs whose template linkage annotation equals this value.
    CreatedByTemplate(String),
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        match self {
            JobFilter::OwnedByFlow(flow) => job.is_owned_by_flow(flow),
            JobFilter::CreatedByTemplate(link) => job.template_link() == Some(link.as_str()),
        }
    }
}

/// Access to Job, JobTemplate and JobFlow objects.
#[async_trait]
pub trait JobStore: Send + Sync + 'static {
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, StoreError>;

    /// List jobs of a namespace matching `filter`, in store order.
    async fn list_jobs(&self, namespace: &str, filter: &JobFilter) -> Result<Vec<Job>, StoreError>;

    async fn create_job(&self, job: &Job) -> Result<Job, StoreError>;

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    async fn get_job_template(&self, namespace: &str, name: &str)
        -> Result<JobTemplate, StoreError>;

    /// Replace the status subresource of a template.
    async fn update_template_status(
        &self,
        template: &JobTemplate,
        status: &JobTemplateStatus,
    ) -> Result<JobTemplate, StoreError>;

    async fn get_flow(&self, namespace: &str, name: &str) -> Result<JobFlow, StoreError>;

    /// Replace the status subresource of a flow.
    async fn update_flow_status(
        &self,
        flow: &JobFlow,
        status: &JobFlowStatus,
    ) -> Result<JobFlow, StoreError>;
}

/// Severity of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

jobflow_core::simple_display! {
    EventType {
        Normal => "Normal",
        Warning => "Warning",
    }
}

/// Identity of the object an event is recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: String,
    pub resource_version: String,
}

impl ObjectRef {
    fn of<K: Resource<DynamicType = ()>>(object: &K) -> Self {
        let meta = object.meta();
        Self {
            api_version: K::api_version(&()).into_owned(),
            kind: K::kind(&()).into_owned(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            name: meta.name.clone().unwrap_or_default(),
            uid: meta.uid.clone().unwrap_or_default(),
            resource_version: meta.resource_version.clone().unwrap_or_default(),
        }
    }

    pub fn for_flow(flow: &JobFlow) -> Self {
        Self::of(flow)
    }

    pub fn for_template(template: &JobTemplate) -> Self {
        Self::of(template)
    }
}

/// Sink for human-readable diagnostic events.
///
/// Recording is best effort: failures are logged by the implementation and
/// never surface to the reconciler.
#[async_trait]
pub trait EventRecorder: Send + Sync + 'static {
    async fn record(&self, object: &ObjectRef, kind: EventType, reason: &str, message: &str);
}
