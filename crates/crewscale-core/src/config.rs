//! Process configuration: scaling policy, gateway selection, and the
//! local worker command.
//!
//! Loaded once at startup (from a TOML file or built programmatically)
//! and immutable afterwards. All validation happens here; an invalid
//! policy aborts initialization instead of surfacing mid-decision.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::{RuleTable, ThresholdRule};

/// Which scaling gateway to bind.
///
/// `Local` is never inferred from the environment: it takes destructive
/// action (killing local processes) and must be asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    /// Remote fleet-control HTTP API.
    Fleet,
    /// Local OS process pool.
    Local,
    /// Silent sink; the safe default for development.
    Noop,
}

/// How to spawn and recognize a local worker process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCommand {
    /// Executable to spawn.
    pub program: String,
    /// Arguments, which must embed `marker` so spawned workers are
    /// recognizable in the process table.
    #[serde(default)]
    pub args: Vec<String>,
    /// Substring matched against a process cmdline to identify workers.
    pub marker: String,
}

impl WorkerCommand {
    /// Whether a process cmdline belongs to one of our workers.
    pub fn matches(&self, cmdline: &str) -> bool {
        cmdline.contains(&self.marker)
    }

    /// The full cmdline this command will produce, for marker validation.
    pub fn cmdline(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// A validated scaling policy: one rule table plus fleet bounds.
///
/// Immutable once constructed; the control loop never mutates it.
#[derive(Debug, Clone)]
pub struct ScalePolicy {
    pub rules: RuleTable,
    /// Hard ceiling on every decision.
    pub max_workers: u32,
    /// Floor the fleet drains to when the queue empties. May be zero.
    pub min_workers: u32,
}

impl ScalePolicy {
    pub fn new(rules: RuleTable, max_workers: u32, min_workers: u32) -> Result<Self, ConfigError> {
        if max_workers == 0 {
            return Err(ConfigError::ZeroMaxWorkers);
        }
        if min_workers > max_workers {
            return Err(ConfigError::FloorAboveCeiling {
                min: min_workers,
                max: max_workers,
            });
        }
        Ok(Self {
            rules,
            max_workers,
            min_workers,
        })
    }
}

impl Default for ScalePolicy {
    /// One worker max, drain to zero, and the stock job/worker ratio.
    fn default() -> Self {
        let rules = RuleTable::Thresholds(vec![
            ThresholdRule { jobs: 1, workers: 1 },
            ThresholdRule {
                jobs: 25,
                workers: 2,
            },
            ThresholdRule {
                jobs: 50,
                workers: 3,
            },
            ThresholdRule {
                jobs: 75,
                workers: 4,
            },
            ThresholdRule {
                jobs: 100,
                workers: 5,
            },
        ]);
        Self {
            rules,
            max_workers: 1,
            min_workers: 0,
        }
    }
}

/// Top-level crewscale configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Explicit gateway selection. `None` means infer fleet vs. noop from
    /// ambient deployment signals at resolve time.
    pub environment: Option<GatewayKind>,
    /// Application identifier passed to the fleet-control API.
    pub app_name: String,
    pub policy: ScalePolicy,
    /// Required only by the local gateway.
    pub worker: Option<WorkerCommand>,
}

impl Configuration {
    pub fn new(app_name: impl Into<String>, policy: ScalePolicy) -> Self {
        Self {
            environment: None,
            app_name: app_name.into(),
            policy,
            worker: None,
        }
    }

    pub fn with_environment(mut self, kind: GatewayKind) -> Self {
        self.environment = Some(kind);
        self
    }

    pub fn with_worker_command(mut self, worker: WorkerCommand) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Load and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML configuration content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;

        let rules = match file.ratio {
            Some(ratio) => RuleTable::thresholds(ratio)?,
            None => ScalePolicy::default().rules,
        };
        let policy = ScalePolicy::new(
            rules,
            file.max_workers.unwrap_or(1),
            file.min_workers.unwrap_or(0),
        )?;

        let config = Self {
            environment: file.environment,
            app_name: file.app_name,
            policy,
            worker: file.worker,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that individual constructors cannot see.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Some(GatewayKind::Local) {
            let worker = self
                .worker
                .as_ref()
                .ok_or(ConfigError::MissingWorkerCommand)?;
            if !worker.matches(&worker.cmdline()) {
                return Err(ConfigError::UnmatchableWorkerMarker {
                    marker: worker.marker.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Raw TOML shape. Only the threshold rule form is expressible in a
/// file; predicate tables are built programmatically.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    app_name: String,
    environment: Option<GatewayKind>,
    max_workers: Option<u32>,
    min_workers: Option<u32>,
    ratio: Option<Vec<ThresholdRule>>,
    worker: Option<WorkerCommand>,
}
