//! Gateway binding.
//!
//! Exactly one scaling backend is bound per process, once, at startup.
//! Explicit configuration always wins; without it, the presence of
//! fleet API credentials in the environment selects the fleet backend,
//! and anything else falls back to the safe no-op. The local backend is
//! never guessed: it kills processes, so it must be asked for.

use std::sync::Arc;

use tracing::info;

use crewscale_core::{ConfigError, Configuration, GatewayKind};

use crate::fleet::{API_TOKEN_VAR, API_URL_VAR, FleetGateway};
use crate::gateway::WorkerGateway;
use crate::local::LocalGateway;
use crate::noop::NoopGateway;

/// Deployment signals consulted when no gateway is configured
/// explicitly. Split out from process environment so binding logic is
/// testable without mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct AmbientSignals {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

impl AmbientSignals {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var(API_URL_VAR).ok(),
            api_token: std::env::var(API_TOKEN_VAR).ok(),
        }
    }

    fn fleet_configured(&self) -> bool {
        self.api_url.is_some() && self.api_token.is_some()
    }
}

/// Bind the scaling gateway for this process from configuration and
/// the ambient environment.
pub fn resolve(config: &Configuration) -> Result<Arc<dyn WorkerGateway>, ConfigError> {
    resolve_with(config, &AmbientSignals::from_env())
}

/// [`resolve`] against explicit ambient signals.
pub fn resolve_with(
    config: &Configuration,
    signals: &AmbientSignals,
) -> Result<Arc<dyn WorkerGateway>, ConfigError> {
    let kind = match config.environment {
        Some(kind) => kind,
        None if signals.fleet_configured() => GatewayKind::Fleet,
        None => GatewayKind::Noop,
    };

    let gateway: Arc<dyn WorkerGateway> = match kind {
        GatewayKind::Fleet => {
            let api_url = signals
                .api_url
                .as_deref()
                .ok_or(ConfigError::MissingEnvVar(API_URL_VAR))?;
            let token = signals
                .api_token
                .clone()
                .ok_or(ConfigError::MissingEnvVar(API_TOKEN_VAR))?;
            Arc::new(FleetGateway::new(&config.app_name, api_url, token)?)
        }
        GatewayKind::Local => {
            config.validate()?;
            let worker = config
                .worker
                .clone()
                .ok_or(ConfigError::MissingWorkerCommand)?;
            Arc::new(LocalGateway::new(worker))
        }
        GatewayKind::Noop => Arc::new(NoopGateway),
    };

    info!(gateway = gateway.name(), app = %config.app_name, "scaling gateway bound");
    Ok(gateway)
}
