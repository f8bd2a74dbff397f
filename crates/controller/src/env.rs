// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the controller.

use std::path::PathBuf;
use std::time::Duration;

/// Number of workers per queue (default 4, minimum 1).
pub fn workers() -> usize {
    std::env::var("JOBFLOW_WORKERS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(4)
}

/// Requeues allowed per failing item before it is dropped. Negative means unbounded.
pub fn max_requeue() -> i64 {
    std::env::var("JOBFLOW_MAX_REQUEUE")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(15)
}

/// Namespace to watch. Unset or empty watches all namespaces.
pub fn namespace() -> Option<String> {
    std::env::var("JOBFLOW_NAMESPACE")
        .ok()
        .filter(|s| !s.is_empty())
}

/// First retry delay of the rate-limited requeue.
pub fn backoff_base() -> Duration {
    std::env::var("JOBFLOW_BACKOFF_BASE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(5))
}

/// Cap on the rate-limited requeue delay.
pub fn backoff_max() -> Duration {
    std::env::var("JOBFLOW_BACKOFF_MAX_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(1000))
}

/// Directory for the rolling log file. Unset logs to stderr only.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("JOBFLOW_LOG_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
