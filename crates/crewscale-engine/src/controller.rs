//! The control loop: hire/fire entry points and the worker poll cycle.
//!
//! Every entry point is independently idempotent and safe to call
//! redundantly from any number of processes; no cross-process lock
//! exists or is needed. Gateway failures are contained here, logged
//! and degraded to no-change, because a failed scale request must
//! never propagate into the job-processing path. Job-store failures
//! do propagate: the engine will not guess a queue depth.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crewscale_core::{
    MetricsError, MetricsProvider, QueueSnapshot, ScaleDecision, ScalePolicy,
};
use crewscale_gateway::WorkerGateway;

use crate::policy::{evaluate, evaluate_drain};

/// Pause between empty poll iterations of the worker loop.
const IDLE_SLEEP: Duration = Duration::from_secs(1);

/// One job-processing step supplied by the host worker. Returns the
/// number of jobs worked off in this iteration.
pub type JobStep = Box<dyn Fn() -> BoxFuture + Send + Sync>;

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<u64>> + Send>>;

/// Orchestrates metrics provider, policy, and scaling gateway.
pub struct Controller {
    provider: Arc<dyn MetricsProvider>,
    gateway: Arc<dyn WorkerGateway>,
    policy: ScalePolicy,
}

impl Controller {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        gateway: Arc<dyn WorkerGateway>,
        policy: ScalePolicy,
    ) -> Self {
        Self {
            provider,
            gateway,
            policy,
        }
    }

    /// Raise the fleet toward the policy target for the current backlog.
    ///
    /// Invoked when a job is enqueued and at the top of every worker
    /// poll cycle. Returns the decision that was applied; gateway
    /// failures degrade to `NoChange`.
    pub async fn hire(&self) -> Result<ScaleDecision, MetricsError> {
        let pending = self.provider.pending_jobs().await?;
        let Some(current) = self.read_current().await else {
            return Ok(ScaleDecision::NoChange);
        };

        let snapshot = QueueSnapshot::new(pending, current);
        match evaluate(&snapshot, &self.policy) {
            ScaleDecision::ScaleTo(target) => {
                info!(pending, current, target, "hiring workers");
                Ok(self.apply(target).await)
            }
            ScaleDecision::NoChange => {
                debug!(pending, current, "fleet already sized for backlog");
                Ok(ScaleDecision::NoChange)
            }
        }
    }

    /// Drain the fleet to the configured floor once the queue is empty.
    ///
    /// Invoked when a job is destroyed or marked failed, and by the
    /// worker loop on its way out.
    pub async fn fire(&self) -> Result<ScaleDecision, MetricsError> {
        let pending = self.provider.pending_jobs().await?;
        let Some(current) = self.read_current().await else {
            return Ok(ScaleDecision::NoChange);
        };

        let snapshot = QueueSnapshot::new(pending, current);
        match evaluate_drain(&snapshot, &self.policy) {
            ScaleDecision::ScaleTo(floor) => {
                info!(current, floor, "queue drained, scaling fleet to floor");
                Ok(self.apply(floor).await)
            }
            ScaleDecision::NoChange => Ok(ScaleDecision::NoChange),
        }
    }

    /// Post-enqueue hire that skips the whole evaluation when a worker
    /// is already active: that worker will re-run `hire` on its own
    /// poll cycle, so the enqueueing process saves a gateway round-trip.
    pub async fn hire_after_enqueue(&self) -> Result<ScaleDecision, MetricsError> {
        if self.provider.active_workers().await? > 0 {
            debug!("worker already active, deferring hire to its poll cycle");
            return Ok(ScaleDecision::NoChange);
        }
        self.hire().await
    }

    /// Drive a worker's own processing loop.
    ///
    /// Each iteration hires first (so an active worker self-corrects the
    /// fleet even if upstream hooks were missed), runs the host's job
    /// step, and once the queue is observed empty fires and exits,
    /// unconditionally, regardless of what the gateway said.
    pub async fn run_worker_loop(
        &self,
        job_step: JobStep,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), MetricsError> {
        info!("worker poll loop started");

        loop {
            if *shutdown.borrow() {
                info!("worker poll loop interrupted");
                break;
            }

            self.hire().await?;

            let worked = match (job_step)().await {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "job step failed");
                    0
                }
            };
            if worked > 0 {
                debug!(worked, "jobs processed");
            }

            if self.provider.pending_jobs().await? == 0 {
                self.fire().await?;
                info!("queue empty, worker poll loop exiting");
                break;
            }

            if worked == 0 {
                // Backlog exists but nothing was leased to us; yield.
                tokio::select! {
                    _ = tokio::time::sleep(IDLE_SLEEP) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }

        Ok(())
    }

    async fn read_current(&self) -> Option<u32> {
        match self.gateway.current_workers().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(gateway = self.gateway.name(), error = %e, "worker count query failed");
                None
            }
        }
    }

    async fn apply(&self, target: u32) -> ScaleDecision {
        match self.gateway.set_workers(target).await {
            Ok(()) => ScaleDecision::ScaleTo(target),
            Err(e) => {
                warn!(gateway = self.gateway.name(), target, error = %e, "scale request failed");
                ScaleDecision::NoChange
            }
        }
    }
}
