//! crewscale-gateway — scaling backends for the crewscale control loop.
//!
//! A gateway realizes a scaling target against a concrete execution
//! environment. `set_workers(n)` is always an idempotent absolute
//! assignment, never a delta, so racing callers cannot corrupt fleet
//! state; the last write wins.
//!
//! # Backends
//!
//! - [`FleetGateway`] — remote fleet-control HTTP API, bounded timeouts.
//! - [`LocalGateway`] — local OS process pool; kills peers before self
//!   on scale-down so the caller can finish its own shutdown cleanly.
//! - [`NoopGateway`] — silent sink, the safe development default.
//!
//! [`resolve`] binds exactly one backend per process: explicit
//! configuration wins, ambient fleet credentials imply the fleet
//! backend, and the destructive local backend is never inferred.

pub mod fleet;
pub mod gateway;
pub mod local;
pub mod noop;
pub mod resolve;

pub use fleet::FleetGateway;
pub use gateway::WorkerGateway;
pub use local::LocalGateway;
pub use noop::NoopGateway;
pub use resolve::{AmbientSignals, resolve, resolve_with};
