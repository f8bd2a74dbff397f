// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pool draining a [`WorkQueue`].

use super::{Reconcile, WorkQueue};
use crate::error::ReconcileError;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// How many times a failing request is retried before it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueLimit {
    Unbounded,
    Max(u32),
}

impl RequeueLimit {
    /// Negative values mean unbounded.
    pub fn from_config(value: i64) -> Self {
        if value < 0 {
            RequeueLimit::Unbounded
        } else {
            RequeueLimit::Max(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }

    pub fn allows(self, requeues: u32) -> bool {
        match self {
            RequeueLimit::Unbounded => true,
            RequeueLimit::Max(max) => requeues < max,
        }
    }
}

/// Spawn `workers` tasks draining `queue` into `reconciler`.
///
/// The queue is shut down when `cancel` fires; the returned set completes
/// once every worker has seen the queue drain.
pub fn run_workers<K: Reconcile>(
    reconciler: Arc<K>,
    queue: WorkQueue<K::Request>,
    workers: usize,
    limit: RequeueLimit,
    cancel: CancellationToken,
) -> JoinSet<()> {
    let mut set = JoinSet::new();
    for id in 0..workers.max(1) {
        let reconciler = Arc::clone(&reconciler);
        let queue = queue.clone();
        set.spawn(async move {
            while process_next(reconciler.as_ref(), &queue, limit).await {}
            tracing::debug!(kind = K::KIND, worker = id, "worker stopped");
        });
    }
    set.spawn(async move {
        cancel.cancelled().await;
        tracing::info!(kind = K::KIND, "shutting down work queue");
        queue.shutdown();
    });
    set
}

/// Take one item off the queue and reconcile it. Returns `false` once the
/// queue has shut down.
pub async fn process_next<K: Reconcile>(
    reconciler: &K,
    queue: &WorkQueue<K::Request>,
    limit: RequeueLimit,
) -> bool {
    let Some(request) = queue.get().await else {
        return false;
    };

    let start = Instant::now();
    let result = reconciler.reconcile(&request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(kind = K::KIND, %request, elapsed_ms, "finished syncing");

    handle_result(reconciler, queue, limit, &request, result).await;
    queue.done(&request);
    true
}

async fn handle_result<K: Reconcile>(
    reconciler: &K,
    queue: &WorkQueue<K::Request>,
    limit: RequeueLimit,
    request: &K::Request,
    result: Result<(), ReconcileError>,
) {
    let err = match result {
        Ok(()) => {
            queue.forget(request);
            return;
        }
        Err(err) => err,
    };

    let requeues = queue.num_requeues(request);
    if limit.allows(requeues) {
        tracing::debug!(kind = K::KIND, %request, requeues, error = %err, "error syncing request");
        queue.add_rate_limited(request.clone());
        return;
    }

    reconciler.report_dropped(request, &err).await;
    tracing::warn!(kind = K::KIND, %request, error = %err, "dropping request out of the queue");
    queue.forget(request);
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
