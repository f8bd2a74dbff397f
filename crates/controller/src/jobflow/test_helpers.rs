// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler wired to in-memory fakes.

use super::JobFlowReconciler;
use crate::adapters::{FakeJobStore, FakeRecorder};
use jobflow_core::test_support::template;
use jobflow_core::{FakeClock, FlowRequest, JobFlow, MetaExt};

pub(crate) struct Harness {
    pub store: FakeJobStore,
    pub recorder: FakeRecorder,
    pub clock: FakeClock,
    pub reconciler: JobFlowReconciler<FakeJobStore, FakeRecorder, FakeClock>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        let store = FakeJobStore::new().with_clock(clock.clone());
        let recorder = FakeRecorder::new();
        let reconciler = JobFlowReconciler::new(store.clone(), recorder.clone(), clock.clone());
        Self {
            store,
            recorder,
            clock,
            reconciler,
        }
    }

    /// Store `flow` plus a template named after each of its steps.
    pub fn with_flow(flow: &JobFlow) -> Self {
        let harness = Self::new();
        let store = &harness.store;
        let namespace = flow.metadata.namespace_str();
        for step in &flow.spec.flows {
            store.insert_template(template(namespace, &step.name));
        }
        store.insert_flow(flow.clone());
        harness
    }

    pub fn stored_flow(&self, flow: &JobFlow) -> JobFlow {
        let key = flow.key();
        self.store
            .flow(&key.namespace, &key.name)
            .unwrap_or_else(|| panic!("flow {} missing from store", flow.key()))
    }

    pub fn request(flow: &JobFlow) -> FlowRequest {
        FlowRequest::sync(flow.key())
    }
}
