//! The metrics-provider contract implemented per job-store technology.

use async_trait::async_trait;

use crate::error::MetricsError;

/// Read-side view of a job store.
///
/// Each adapter runs a count query against its store and returns two
/// integers; everything else about the store stays behind this seam.
/// Implementations must be cheap enough to call once per decision;
/// results are never cached by the engine.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Jobs queued and eligible to run now. Must exclude permanently
    /// failed jobs and jobs scheduled for future execution.
    async fn pending_jobs(&self) -> Result<u64, MetricsError>;

    /// Count of in-progress job leases. A liveness signal only: the
    /// fleet gateway, not this, is the source of truth for how many
    /// workers are provisioned.
    async fn active_workers(&self) -> Result<u64, MetricsError>;
}
