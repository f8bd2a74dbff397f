// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch streams feeding the work queues.
//!
//! Each stream keeps the last object it saw per key so an update can be
//! compared against its predecessor, the way informer update handlers get
//! both the old and the new object.

use super::WorkQueue;
use crate::adapters::k8s::resources::{from_dynamic, Resource};
use crate::jobflow::{on_flow_added, on_flow_updated, on_job_updated};
use crate::jobtemplate::{on_job_added, on_template_added};
use futures_util::TryStreamExt;
use jobflow_core::{FlowRequest, Job, JobFlow, JobTemplate, MetaExt, ObjectKey};
use kube::api::{Api, DynamicObject};
use kube::runtime::watcher::{self, Event};
use kube::runtime::WatchStreamExt;
use kube::Client;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::pin::pin;
use tokio_util::sync::CancellationToken;

/// An object a watch stream can cache by key.
pub trait Watched: DeserializeOwned + Clone + Send + 'static {
    fn watch_key(&self) -> ObjectKey;
}

impl Watched for JobFlow {
    fn watch_key(&self) -> ObjectKey {
        self.key()
    }
}

impl Watched for JobTemplate {
    fn watch_key(&self) -> ObjectKey {
        self.key()
    }
}

impl Watched for Job {
    fn watch_key(&self) -> ObjectKey {
        self.metadata.key()
    }
}

/// What a watch event meant relative to the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Added(T),
    Updated { old: T, new: T },
    Deleted(T),
}

/// Last-seen objects of one watch stream.
pub struct WatchCache<T> {
    objects: HashMap<ObjectKey, T>,
    relist: Option<HashSet<ObjectKey>>,
}

impl<T: Watched> Default for WatchCache<T> {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            relist: None,
        }
    }
}

impl<T: Watched> WatchCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, obj: T) -> Change<T> {
        let key = obj.watch_key();
        if let Some(seen) = self.relist.as_mut() {
            seen.insert(key.clone());
        }
        match self.objects.insert(key, obj.clone()) {
            Some(old) => Change::Updated { old, new: obj },
            None => Change::Added(obj),
        }
    }

    pub fn delete(&mut self, obj: T) -> Change<T> {
        self.objects.remove(&obj.watch_key());
        Change::Deleted(obj)
    }

    /// A relist started; objects not re-announced before [`Self::finish_relist`] are dropped.
    pub fn begin_relist(&mut self) {
        self.relist = Some(HashSet::new());
    }

    /// Drop objects missing from the relist, returning them as deletions.
    pub fn finish_relist(&mut self) -> Vec<Change<T>> {
        let Some(seen) = self.relist.take() else {
            return Vec::new();
        };
        let gone: Vec<ObjectKey> = self
            .objects
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();
        gone.into_iter()
            .filter_map(|k| self.objects.remove(&k))
            .map(Change::Deleted)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Translate a JobFlow change into a reconcile request.
pub fn flow_request(change: &Change<JobFlow>) -> Option<FlowRequest> {
    match change {
        Change::Added(flow) => on_flow_added(flow),
        Change::Updated { old, new } => on_flow_updated(old, new),
        Change::Deleted(_) => None,
    }
}

/// Translate a Job change into requests for the flow and template queues.
pub fn job_requests(change: &Change<Job>) -> (Option<FlowRequest>, Option<ObjectKey>) {
    match change {
        Change::Added(job) => (None, on_job_added(job)),
        Change::Updated { old, new } => (on_job_updated(old, new), None),
        Change::Deleted(_) => (None, None),
    }
}

/// Translate a JobTemplate change into a template request.
pub fn template_request(change: &Change<JobTemplate>) -> Option<ObjectKey> {
    match change {
        Change::Added(template) => on_template_added(template),
        Change::Updated { .. } | Change::Deleted(_) => None,
    }
}

fn dynamic_api(client: &Client, resource: Resource, namespace: Option<&str>) -> Api<DynamicObject> {
    let ar = resource.api_resource();
    match namespace {
        Some(ns) => Api::namespaced_with(client.clone(), ns, &ar),
        None => Api::all_with(client.clone(), &ar),
    }
}

/// Run one watch stream until `cancel` fires, handing every change to `on_change`.
pub(crate) async fn watch<T, F>(
    client: Client,
    resource: Resource,
    namespace: Option<String>,
    cancel: CancellationToken,
    mut on_change: F,
) where
    T: Watched,
    F: FnMut(Change<T>) + Send,
{
    let api = dynamic_api(&client, resource, namespace.as_deref());
    let stream = watcher::watcher(api, watcher::Config::default()).default_backoff();
    let mut stream = pin!(stream);
    let mut cache = WatchCache::<T>::new();
    let kind = resource.kind();
    tracing::info!(
        kind,
        namespace = namespace.as_deref().unwrap_or("*"),
        "watch started"
    );

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.try_next() => next,
        };
        let event = match event {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(kind, error = %e, "watch stream error");
                continue;
            }
        };
        match event {
            Event::Init => cache.begin_relist(),
            Event::InitDone => {
                for change in cache.finish_relist() {
                    on_change(change);
                }
                tracing::debug!(kind, objects = cache.len(), "watch relist done");
            }
            Event::Apply(obj) | Event::InitApply(obj) => match from_dynamic::<T>(obj) {
                Ok(obj) => on_change(cache.apply(obj)),
                Err(e) => tracing::warn!(kind, error = %e, "skipping undecodable object"),
            },
            Event::Delete(obj) => match from_dynamic::<T>(obj) {
                Ok(obj) => on_change(cache.delete(obj)),
                Err(e) => tracing::warn!(kind, error = %e, "skipping undecodable object"),
            },
        }
    }
    tracing::info!(kind, "watch stopped");
}

/// Watch JobFlows into the flow queue.
pub async fn watch_flows(
    client: Client,
    namespace: Option<String>,
    flows: WorkQueue<FlowRequest>,
    cancel: CancellationToken,
) {
    watch::<JobFlow, _>(client, Resource::JobFlow, namespace, cancel, move |change| {
        if let Some(request) = flow_request(&change) {
            flows.add(request);
        }
    })
    .await
}

/// Watch Jobs into the flow and template queues.
pub async fn watch_jobs(
    client: Client,
    namespace: Option<String>,
    flows: WorkQueue<FlowRequest>,
    templates: WorkQueue<ObjectKey>,
    cancel: CancellationToken,
) {
    watch::<Job, _>(client, Resource::Job, namespace, cancel, move |change| {
        let (flow, template) = job_requests(&change);
        if let Some(request) = flow {
            flows.add(request);
        }
        if let Some(key) = template {
            templates.add(key);
        }
    })
    .await
}

/// Watch JobTemplates into the template queue.
pub async fn watch_templates(
    client: Client,
    namespace: Option<String>,
    templates: WorkQueue<ObjectKey>,
    cancel: CancellationToken,
) {
    watch::<JobTemplate, _>(client, Resource::JobTemplate, namespace, cancel, move |change| {
        if let Some(key) = template_request(&change) {
            templates.add(key);
        }
    })
    .await
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
