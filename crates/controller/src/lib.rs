// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jobflow-controller: reconcilers, cluster adapters and the controller runtime.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod env;
pub mod error;
pub mod jobflow;
pub mod jobtemplate;
pub mod lifecycle;
pub mod runtime;

pub use adapters::{EventRecorder, EventType, JobFilter, JobStore, ObjectRef, StoreError};
pub use error::ReconcileError;
pub use jobflow::JobFlowReconciler;
pub use jobtemplate::JobTemplateReconciler;
pub use lifecycle::{Config, LifecycleError};
pub use runtime::{Backoff, Reconcile, RequeueLimit, WorkQueue};
