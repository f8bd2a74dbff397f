//! Shared scenario fixtures.

pub use jobflow_controller::adapters::{FakeJobStore, FakeRecorder};
pub use jobflow_controller::{JobFlowReconciler, JobTemplateReconciler};
pub use jobflow_core::test_support::template;
pub use jobflow_core::{
    FakeClock, Flow, FlowRequest, JobFlow, JobFlowStatus, JobPhase, ObjectKey, RetainPolicy, Time,
};
pub use similar_asserts::assert_eq;

use std::time::Duration;

pub const NS: &str = "batch";

/// A store, recorder and clock shared by both reconcilers.
pub struct Cluster {
    pub store: FakeJobStore,
    pub recorder: FakeRecorder,
    pub clock: FakeClock,
    pub flows: JobFlowReconciler<FakeJobStore, FakeRecorder, FakeClock>,
    pub templates: JobTemplateReconciler<FakeJobStore, FakeRecorder>,
}

impl Cluster {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        let store = FakeJobStore::new().with_clock(clock.clone());
        let recorder = FakeRecorder::new();
        Self {
            flows: JobFlowReconciler::new(store.clone(), recorder.clone(), clock.clone()),
            templates: JobTemplateReconciler::new(store.clone(), recorder.clone()),
            store,
            recorder,
            clock,
        }
    }

    /// Submit a flow, with a template per step.
    pub fn submit(&self, name: &str, steps: Vec<Flow>, policy: RetainPolicy) -> JobFlow {
        let mut flow = jobflow_core::test_support::flow(NS, name, steps);
        flow.spec.job_retain_policy = policy;
        for step in &flow.spec.flows {
            if self.store.template(NS, &step.name).is_none() {
                self.store.insert_template(template(NS, &step.name));
            }
        }
        self.store.insert_flow(flow.clone());
        flow
    }

    /// One reconcile pass, one second after the previous.
    pub async fn pass(&self, flow: &str) {
        self.clock.advance(Duration::from_secs(1));
        let request = FlowRequest::sync(ObjectKey::new(NS, flow));
        self.flows.sync(&request).await.unwrap();
    }

    /// What the scheduler does to a job between passes.
    pub fn set_phase(&self, job: &str, phase: JobPhase) {
        assert!(
            self.store.set_job_phase(NS, job, phase),
            "job {job} does not exist"
        );
    }

    pub fn flow(&self, name: &str) -> JobFlow {
        self.store.flow(NS, name).unwrap()
    }

    pub fn status(&self, name: &str) -> JobFlowStatus {
        self.flow(name).status
    }

    pub fn phase(&self, name: &str) -> String {
        self.status(name).state.phase
    }

    pub fn jobs(&self) -> Vec<String> {
        self.store.job_names(NS)
    }
}
