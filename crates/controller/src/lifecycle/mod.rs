// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller lifecycle: configuration, startup and shutdown.

use crate::adapters::{EventRecorder, JobStore, KubeEventRecorder, KubeJobStore};
use crate::jobflow::JobFlowReconciler;
use crate::jobtemplate::JobTemplateReconciler;
use crate::runtime::watch::{watch_flows, watch_jobs, watch_templates};
use crate::runtime::{run_workers, Backoff, RequeueLimit, WorkQueue};
use jobflow_core::{Clock, FlowRequest, ObjectKey, SystemClock};
use kube::Client;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Controller configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Workers per queue
    pub workers: usize,
    /// Retry budget for failing requests
    pub requeue_limit: RequeueLimit,
    /// Delay schedule for rate-limited requeues
    pub backoff: Backoff,
    /// Directory for the rolling log file
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `JOBFLOW_*` environment variables.
    pub fn load() -> Result<Self, LifecycleError> {
        let base = crate::env::backoff_base();
        let max = crate::env::backoff_max();
        if base > max {
            return Err(LifecycleError::Config(format!(
                "backoff base {base:?} exceeds backoff max {max:?}"
            )));
        }
        Ok(Self {
            namespace: crate::env::namespace(),
            workers: crate::env::workers(),
            requeue_limit: RequeueLimit::from_config(crate::env::max_requeue()),
            backoff: Backoff::new(base, max),
            log_dir: crate::env::log_dir(),
        })
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to create kubernetes client: {0}")]
    Client(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The two queues every watcher and worker pool share.
#[derive(Clone)]
pub struct Queues {
    pub flows: WorkQueue<FlowRequest>,
    pub templates: WorkQueue<ObjectKey>,
}

impl Queues {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            flows: WorkQueue::new(backoff),
            templates: WorkQueue::new(backoff),
        }
    }
}

/// Start the JobFlow and JobTemplate worker pools over `store`.
///
/// Both pools stop once `cancel` fires and their queues drain.
pub fn spawn_workers<S, R, C>(
    store: S,
    recorder: R,
    clock: C,
    config: &Config,
    queues: &Queues,
    cancel: &CancellationToken,
) -> JoinSet<()>
where
    S: JobStore + Clone,
    R: EventRecorder + Clone,
    C: Clock,
{
    let flows = JobFlowReconciler::new(store.clone(), recorder.clone(), clock);
    let flows = Arc::new(flows);
    let templates = Arc::new(JobTemplateReconciler::new(store, recorder));

    let mut tasks = JoinSet::new();
    tasks.spawn(join_all(run_workers(
        flows,
        queues.flows.clone(),
        config.workers,
        config.requeue_limit,
        cancel.clone(),
    )));
    tasks.spawn(join_all(run_workers(
        templates,
        queues.templates.clone(),
        config.workers,
        config.requeue_limit,
        cancel.clone(),
    )));
    tasks
}

/// Run the controller against the cluster until `cancel` fires.
pub async fn run(config: Config, cancel: CancellationToken) -> Result<(), LifecycleError> {
    let client = Client::try_default().await?;
    let queues = Queues::new(config.backoff);

    let mut tasks = spawn_workers(
        KubeJobStore::new(client.clone()),
        KubeEventRecorder::new(client.clone()),
        SystemClock,
        &config,
        &queues,
        &cancel,
    );
    let ns = config.namespace.clone();
    tasks.spawn(watch_flows(
        client.clone(),
        ns.clone(),
        queues.flows.clone(),
        cancel.clone(),
    ));
    tasks.spawn(watch_jobs(
        client.clone(),
        ns.clone(),
        queues.flows.clone(),
        queues.templates.clone(),
        cancel.clone(),
    ));
    let templates = watch_templates(client, ns, queues.templates.clone(), cancel.clone());
    tasks.spawn(templates);

    info!(
        namespace = config.namespace.as_deref().unwrap_or("*"),
        workers = config.workers,
        "jobflow controller started"
    );

    join_all(tasks).await;
    info!("jobflow controller stopped");
    Ok(())
}

async fn join_all(mut set: JoinSet<()>) {
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            warn!(error = %e, "controller task failed");
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
