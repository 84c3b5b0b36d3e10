//! The scaling-gateway contract.

use async_trait::async_trait;

use crewscale_core::GatewayError;

/// Queries and sets the worker count on one execution environment.
///
/// The fleet's worker count is the single piece of shared mutable state
/// in the system. It is mutated by any process and observed by all, so
/// implementations treat it as eventually consistent: callers re-read
/// [`current_workers`](WorkerGateway::current_workers) fresh on every
/// decision instead of caching it.
#[async_trait]
pub trait WorkerGateway: Send + Sync + std::fmt::Debug {
    /// Number of workers currently provisioned.
    async fn current_workers(&self) -> Result<u32, GatewayError>;

    /// Set the fleet to exactly `n` workers. Idempotent: applying the
    /// same target twice is a no-op the second time.
    async fn set_workers(&self, n: u32) -> Result<(), GatewayError>;

    /// Short backend name for log lines.
    fn name(&self) -> &'static str;
}
