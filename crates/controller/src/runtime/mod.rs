// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller runtime: work queues, worker pools and watch streams.
//!
//! # Module layout
//!
//! - [`queue`]: deduplicating, rate-limited [`WorkQueue`]
//! - [`worker`]: worker pool draining a queue into a [`Reconcile`] implementation
//! - [`watch`]: watch streams translating cluster changes into queue items

pub mod queue;
pub mod watch;
pub mod worker;

pub use queue::{Backoff, WorkQueue};
pub use worker::{process_next, run_workers, RequeueLimit};

use crate::error::ReconcileError;
use async_trait::async_trait;
use std::fmt::Display;
use std::hash::Hash;

/// A reconciler driven by a worker pool.
#[async_trait]
pub trait Reconcile: Send + Sync + 'static {
    /// Queue item identifying what to reconcile.
    type Request: Clone + Eq + Hash + Display + Send + Sync + 'static;

    /// Resource kind, for logs.
    const KIND: &'static str;

    async fn reconcile(&self, request: &Self::Request) -> Result<(), ReconcileError>;

    /// Called once when `request` is dropped after exhausting its retries.
    async fn report_dropped(&self, request: &Self::Request, err: &ReconcileError);
}
