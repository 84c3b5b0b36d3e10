//! Job lifecycle hooks.
//!
//! The thin surface a host job framework calls into: one method per
//! lifecycle event, each mapping to the controller entry point the
//! event warrants. The host owns hook registration; this module only
//! defines what each event means for the fleet.

use std::sync::Arc;

use crewscale_core::{MetricsError, ScaleDecision};

use crate::controller::Controller;

/// Framework-facing lifecycle callbacks.
pub struct JobEventHooks {
    controller: Arc<Controller>,
}

impl JobEventHooks {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }

    /// A job row was created: the backlog may now warrant more workers.
    pub async fn after_job_created(&self) -> Result<ScaleDecision, MetricsError> {
        self.controller.hire().await
    }

    /// A job was removed (completed and deleted): the queue may be empty.
    pub async fn after_job_destroyed(&self) -> Result<ScaleDecision, MetricsError> {
        self.controller.fire().await
    }

    /// A job was updated. Only a permanent failure changes the pending
    /// count, so anything else is a no-op.
    pub async fn after_job_updated(&self, failed: bool) -> Result<ScaleDecision, MetricsError> {
        if failed {
            self.controller.fire().await
        } else {
            Ok(ScaleDecision::NoChange)
        }
    }

    /// A job was pushed onto the queue. Uses the optimized hire path:
    /// an already-active worker will correct the fleet on its own poll.
    pub async fn after_job_enqueued(&self) -> Result<ScaleDecision, MetricsError> {
        self.controller.hire_after_enqueue().await
    }

    /// A worker finished an empty poll and is checking in.
    pub async fn worker_idle_poll(&self) -> Result<ScaleDecision, MetricsError> {
        self.controller.hire().await
    }
}
