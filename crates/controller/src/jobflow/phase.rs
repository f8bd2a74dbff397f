// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow phase transitions.

use jobflow_core::{FlowPhase, JobFlowStatus};

/// Phase a flow moves to given its freshly aggregated status.
///
/// Succeed, Failed and Terminating are sinks. Running succeeds only when the
/// completed list holds exactly one entry per step.
pub fn next_phase(current: FlowPhase, status: &JobFlowStatus, total_steps: usize) -> FlowPhase {
    match current {
        FlowPhase::Pending => {
            if !status.completed_jobs.is_empty() || !status.running_jobs.is_empty() {
                FlowPhase::Running
            } else if !status.failed_jobs.is_empty() {
                FlowPhase::Failed
            } else {
                FlowPhase::Pending
            }
        }
        FlowPhase::Running => {
            if status.completed_jobs.len() == total_steps {
                FlowPhase::Succeed
            } else {
                FlowPhase::Running
            }
        }
        FlowPhase::Succeed | FlowPhase::Failed | FlowPhase::Terminating => current,
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
