//! The no-op gateway.

use async_trait::async_trait;

use crewscale_core::GatewayError;

use crate::gateway::WorkerGateway;

/// Scaling backend that does nothing.
///
/// The safe default when no fleet-control backend is configured:
/// development setups run their workers by hand, and a test stub is
/// expected to behave exactly like this.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGateway;

#[async_trait]
impl WorkerGateway for NoopGateway {
    async fn current_workers(&self) -> Result<u32, GatewayError> {
        Ok(0)
    }

    async fn set_workers(&self, _n: u32) -> Result<(), GatewayError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
