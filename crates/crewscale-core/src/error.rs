//! Error types for the crewscale crates.

use thiserror::Error;

/// Configuration problems. Fatal at load time: a process must not start
/// with an invalid policy or an unresolvable gateway selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_workers must be at least 1")]
    ZeroMaxWorkers,

    #[error("min_workers ({min}) exceeds max_workers ({max})")]
    FloorAboveCeiling { min: u32, max: u32 },

    #[error("rule table is empty")]
    EmptyRuleTable,

    #[error("rule table mixes threshold and predicate rules")]
    MixedRuleForms,

    #[error("rule thresholds must be strictly ascending (rule {index})")]
    UnorderedThresholds { index: usize },

    #[error("rule {index} requests zero workers")]
    ZeroWorkerRule { index: usize },

    #[error("missing environment variable {0}")]
    MissingEnvVar(&'static str),

    #[error("invalid fleet API URL: {0}")]
    InvalidApiUrl(String),

    #[error("local gateway selected but no worker command configured")]
    MissingWorkerCommand,

    #[error("worker command does not contain its own marker {marker:?}")]
    UnmatchableWorkerMarker { marker: String },
}

/// Failures talking to the job store. Propagated out of `hire`/`fire`:
/// the engine never guesses a queue depth, since a wrong guess could
/// trigger a harmful scale action.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("job store query failed: {0}")]
    Query(String),

    #[error("job store unavailable: {0}")]
    Unavailable(String),
}

/// Failures talking to the fleet-control backend. Contained at the
/// control-loop boundary: logged and degraded to no-change, never
/// allowed into the job-processing path.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("fleet API request failed: {0}")]
    Transport(String),

    #[error("fleet API rejected the request: {status}")]
    Api { status: u16 },

    #[error("fleet API response could not be decoded: {0}")]
    Decode(String),

    #[error("fleet API request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("process inspection failed: {0}")]
    Process(String),
}
