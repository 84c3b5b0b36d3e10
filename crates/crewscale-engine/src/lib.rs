//! crewscale-engine — the autoscaling decision engine and control loop.
//!
//! Turns a fresh queue snapshot into a scaling action and applies it
//! through the bound gateway. Decisions are pure functions of a
//! point-in-time snapshot; application is an idempotent absolute
//! assignment, so concurrent callers need no coordination: the last
//! write wins and a stale snapshot costs at most a redundant call.
//!
//! # Architecture
//!
//! ```text
//! JobEventHooks (host framework callbacks)
//!   ├── after_job_created / worker_idle_poll → Controller::hire
//!   ├── after_job_enqueued                   → Controller::hire_after_enqueue
//!   └── after_job_destroyed / after_job_updated(failed) → Controller::fire
//!
//! Controller
//!   ├── hire()  → pending jobs + current workers → evaluate → set_workers
//!   ├── fire()  → queue empty? → evaluate_drain  → set_workers(floor)
//!   └── run_worker_loop() → hire, work jobs, fire-and-exit when drained
//! ```
//!
//! Hiring is monotonic: the policy never lowers the worker count, because
//! the fleet controller cannot be told which worker to stop and might
//! terminate one mid-job. The only scale-down is `fire`'s binary
//! drain-to-floor once the queue is empty.

pub mod controller;
pub mod hooks;
pub mod policy;

pub use controller::{Controller, JobStep};
pub use hooks::JobEventHooks;
pub use policy::{evaluate, evaluate_drain};
