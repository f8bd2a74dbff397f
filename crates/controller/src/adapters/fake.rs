// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store and recorder for tests.

use super::{EventRecorder, EventType, JobFilter, JobStore, ObjectRef, StoreError};
use async_trait::async_trait;
use jobflow_core::meta::{JOB_FLOW_KIND, JOB_KIND, JOB_TEMPLATE_KIND};
use jobflow_core::{
    Clock, FakeClock, Job, JobFlow, JobFlowStatus, JobPhase, JobTemplate, JobTemplateStatus,
    MetaExt, ObjectKey,
};
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

/// Recorded store call, for asserting what a reconciler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetJob(ObjectKey),
    ListJobs {
        namespace: String,
        filter: JobFilter,
    },
    CreateJob(ObjectKey),
    DeleteJob(ObjectKey),
    GetJobTemplate(ObjectKey),
    UpdateTemplateStatus(ObjectKey),
    GetFlow(ObjectKey),
    UpdateFlowStatus(ObjectKey),
}

/// Operation selector for injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetJob,
    ListJobs,
    CreateJob,
    DeleteJob,
    GetJobTemplate,
    UpdateTemplateStatus,
    GetFlow,
    UpdateFlowStatus,
}

#[derive(Default)]
struct FakeState {
    jobs: BTreeMap<ObjectKey, Job>,
    templates: BTreeMap<ObjectKey, JobTemplate>,
    flows: BTreeMap<ObjectKey, JobFlow>,
    calls: Vec<StoreCall>,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    next_version: u64,
}

impl FakeState {
    // Fixtures start at resourceVersion "1", so the first bump yields "2".
    fn bump_version(&mut self) -> Option<String> {
        self.next_version += 1;
        Some((self.next_version + 1).to_string())
    }

    fn take_failure(&mut self, op: StoreOp) -> Option<StoreError> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// Job store backed by in-memory maps.
///
/// Lists come back ordered by name. Creation stamps the job with the
/// store's clock, a uid and a resource version, the way an API server would.
#[derive(Clone, Default)]
pub struct FakeJobStore {
    inner: Arc<Mutex<FakeState>>,
    clock: FakeClock,
}

impl FakeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a clock with the reconciler so creation stamps line up.
    pub fn with_clock(mut self, clock: FakeClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn insert_flow(&self, flow: JobFlow) {
        self.inner.lock().flows.insert(flow.key(), flow);
    }

    pub fn insert_template(&self, template: JobTemplate) {
        self.inner.lock().templates.insert(template.key(), template);
    }

    pub fn insert_job(&self, job: Job) {
        self.inner.lock().jobs.insert(job.metadata.key(), job);
    }

    /// Simulate the job's own controller moving it to `phase`.
    ///
    /// Returns `false` if the job does not exist.
    pub fn set_job_phase(&self, namespace: &str, name: &str, phase: JobPhase) -> bool {
        let mut state = self.inner.lock();
        let version = state.bump_version();
        match state.jobs.get_mut(&ObjectKey::new(namespace, name)) {
            Some(job) => {
                job.status.state.phase = phase;
                job.metadata.resource_version = version;
                true
            }
            None => false,
        }
    }

    /// Remove a job behind the controller's back.
    pub fn remove_job(&self, namespace: &str, name: &str) -> Option<Job> {
        let key = ObjectKey::new(namespace, name);
        self.inner.lock().jobs.remove(&key)
    }

    pub fn job(&self, namespace: &str, name: &str) -> Option<Job> {
        let key = ObjectKey::new(namespace, name);
        self.inner.lock().jobs.get(&key).cloned()
    }

    pub fn jobs(&self, namespace: &str) -> Vec<Job> {
        let state = self.inner.lock();
        state
            .jobs
            .values()
            .filter(|j| j.metadata.namespace_str() == namespace)
            .cloned()
            .collect()
    }

    pub fn job_names(&self, namespace: &str) -> Vec<String> {
        self.jobs(namespace)
            .iter()
            .map(|j| j.name().to_string())
            .collect()
    }

    pub fn flow(&self, namespace: &str, name: &str) -> Option<JobFlow> {
        let key = ObjectKey::new(namespace, name);
        self.inner.lock().flows.get(&key).cloned()
    }

    pub fn template(&self, namespace: &str, name: &str) -> Option<JobTemplate> {
        let key = ObjectKey::new(namespace, name);
        self.inner.lock().templates.get(&key).cloned()
    }

    /// Make the next call of `op` fail with `err`. Failures queue up per operation.
    pub fn fail_next(&self, op: StoreOp, err: StoreError) {
        let mut state = self.inner.lock();
        state.failures.entry(op).or_default().push_back(err);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn begin(&self, op: StoreOp, call: StoreCall) -> Result<MutexGuard<'_, FakeState>, StoreError> {
        let mut state = self.inner.lock();
        state.calls.push(call);
        match state.take_failure(op) {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let state = self.begin(StoreOp::GetJob, StoreCall::GetJob(key.clone()))?;
        match state.jobs.get(&key) {
            Some(job) => Ok(job.clone()),
            None => Err(StoreError::not_found(JOB_KIND, key)),
        }
    }

    async fn list_jobs(&self, namespace: &str, filter: &JobFilter) -> Result<Vec<Job>, StoreError> {
        let call = StoreCall::ListJobs {
            namespace: namespace.to_string(),
            filter: filter.clone(),
        };
        let state = self.begin(StoreOp::ListJobs, call)?;
        Ok(state
            .jobs
            .values()
            .filter(|j| j.metadata.namespace_str() == namespace)
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    async fn create_job(&self, job: &Job) -> Result<Job, StoreError> {
        let key = job.metadata.key();
        let mut state = self.begin(StoreOp::CreateJob, StoreCall::CreateJob(key.clone()))?;
        if state.jobs.contains_key(&key) {
            return Err(StoreError::already_exists(JOB_KIND, key));
        }
        let mut created = job.clone();
        created.metadata.uid = Some(format!("uid-{}", key.name));
        created.metadata.resource_version = state.bump_version();
        created.metadata.creation_timestamp = Some(self.clock.now());
        state.jobs.insert(key, created.clone());
        Ok(created)
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = ObjectKey::new(namespace, name);
        let mut state = self.begin(StoreOp::DeleteJob, StoreCall::DeleteJob(key.clone()))?;
        match state.jobs.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(JOB_KIND, key)),
        }
    }

    async fn get_job_template(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<JobTemplate, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let call = StoreCall::GetJobTemplate(key.clone());
        let state = self.begin(StoreOp::GetJobTemplate, call)?;
        match state.templates.get(&key) {
            Some(template) => Ok(template.clone()),
            None => Err(StoreError::not_found(JOB_TEMPLATE_KIND, key)),
        }
    }

    async fn update_template_status(
        &self,
        template: &JobTemplate,
        status: &JobTemplateStatus,
    ) -> Result<JobTemplate, StoreError> {
        let key = template.key();
        let call = StoreCall::UpdateTemplateStatus(key.clone());
        let mut state = self.begin(StoreOp::UpdateTemplateStatus, call)?;
        let version = state.bump_version();
        let Some(stored) = state.templates.get_mut(&key) else {
            return Err(StoreError::not_found(JOB_TEMPLATE_KIND, key));
        };
        stored.status = status.clone();
        stored.metadata.resource_version = version;
        Ok(stored.clone())
    }

    async fn get_flow(&self, namespace: &str, name: &str) -> Result<JobFlow, StoreError> {
        let key = ObjectKey::new(namespace, name);
        let state = self.begin(StoreOp::GetFlow, StoreCall::GetFlow(key.clone()))?;
        match state.flows.get(&key) {
            Some(flow) => Ok(flow.clone()),
            None => Err(StoreError::not_found(JOB_FLOW_KIND, key)),
        }
    }

    async fn update_flow_status(
        &self,
        flow: &JobFlow,
        status: &JobFlowStatus,
    ) -> Result<JobFlow, StoreError> {
        let key = flow.key();
        let call = StoreCall::UpdateFlowStatus(key.clone());
        let mut state = self.begin(StoreOp::UpdateFlowStatus, call)?;
        let version = state.bump_version();
        let Some(stored) = state.flows.get_mut(&key) else {
            return Err(StoreError::not_found(JOB_FLOW_KIND, key));
        };
        if stored.metadata.resource_version != flow.metadata.resource_version {
            let message = format!("conflict: {key} has a newer resourceVersion");
            return Err(StoreError::Transient(message));
        }
        stored.status = status.clone();
        stored.metadata.resource_version = version;
        Ok(stored.clone())
    }
}

/// An event captured by [`FakeRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub object: ObjectKey,
    pub kind: EventType,
    pub reason: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct FakeRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn reasons(&self) -> Vec<String> {
        let events = self.events.lock();
        events.iter().map(|e| e.reason.clone()).collect()
    }
}

#[async_trait]
impl EventRecorder for FakeRecorder {
    async fn record(&self, object: &ObjectRef, kind: EventType, reason: &str, message: &str) {
        self.events.lock().push(RecordedEvent {
            object: ObjectKey::new(&object.namespace, &object.name),
            kind,
            reason: reason.to_string(),
            message: message.to_string(),
        });
    }
}
