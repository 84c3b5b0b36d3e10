//! crewscale-core — shared types for the crewscale autoscaler.
//!
//! Holds everything the decision engine and the gateways agree on:
//! queue snapshots, scaling decisions, rule tables, the validated
//! scaling policy, file/programmatic configuration, and the
//! [`MetricsProvider`] contract that job-store adapters implement.
//!
//! # Architecture
//!
//! ```text
//! Configuration (loaded once, immutable)
//!   ├── ScalePolicy  → consumed by crewscale-engine
//!   └── GatewayKind  → consumed by crewscale-gateway::resolve
//!
//! MetricsProvider (per job-store adapter)
//!   ├── pending_jobs()   → queue backlog, read fresh per decision
//!   └── active_workers() → in-progress lease count (liveness only)
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod rules;
pub mod types;

pub use config::{Configuration, GatewayKind, ScalePolicy, WorkerCommand};
pub use error::{ConfigError, GatewayError, MetricsError};
pub use metrics::MetricsProvider;
pub use rules::{PredicateRule, RuleSpec, RuleTable, ThresholdRule};
pub use types::{QueueSnapshot, ScaleDecision};
