//! Decision-engine domain types.

use serde::{Deserialize, Serialize};

/// A point-in-time view of the job queue and the provisioned fleet.
///
/// Read fresh on every decision and discarded afterwards. Staleness only
/// costs a redundant scaling call, never an invalid one, so snapshots are
/// never cached across decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Jobs queued and eligible to run now. Excludes permanently-failed
    /// jobs and jobs scheduled for future execution.
    pub pending_jobs: u64,
    /// Workers currently provisioned by the fleet controller.
    pub active_workers: u32,
}

impl QueueSnapshot {
    pub fn new(pending_jobs: u64, active_workers: u32) -> Self {
        Self {
            pending_jobs,
            active_workers,
        }
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Set the fleet to exactly this many workers. Always an absolute
    /// assignment, never a delta.
    ScaleTo(u32),
    /// The fleet is already where the policy wants it.
    NoChange,
}

impl ScaleDecision {
    /// The target worker count, if this decision carries one.
    pub fn target(&self) -> Option<u32> {
        match self {
            ScaleDecision::ScaleTo(n) => Some(*n),
            ScaleDecision::NoChange => None,
        }
    }
}
