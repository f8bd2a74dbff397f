// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconcile errors

use crate::adapters::StoreError;
use jobflow_core::ObjectKey;
use thiserror::Error;

/// Error returned from a reconcile pass. The worker decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("jobflow {flow} state {phase:?} is invalid")]
    InvalidPhase { flow: ObjectKey, phase: String },
}
