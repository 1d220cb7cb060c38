//! Observable sync outcomes

use crate::merge::MergeStats;
use serde::Serialize;
use snowmap_types::Timestamp;

/// Which operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Initialize,
    Refresh,
}

/// Last fetch failure, kept in the reconciler's error slot for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub phase: SyncPhase,
    pub message: String,
    pub at: Timestamp,

    /// Failures in a row, including this one
    pub consecutive: u32,
}

/// Result of a `refresh` call that did not error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Batch merged into the dataset
    Applied(MergeStats),
    /// Another refresh was already in flight
    Skipped,
    /// Fetched after the session was closed, result dropped
    Discarded,
}

/// Events broadcast by the reconciler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    Initialized {
        segments: usize,
        contributions: usize,
        as_of: Timestamp,
    },
    Refreshed {
        stats: MergeStats,
        as_of: Timestamp,
    },
    RefreshSkipped,
    Failed(SyncFailure),
    Closed,
}
