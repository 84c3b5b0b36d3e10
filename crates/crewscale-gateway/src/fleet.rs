//! Remote fleet-control gateway.
//!
//! Talks to an external fleet API over plain HTTP/1.1:
//!
//! ```text
//! GET  {base}/apps/{app}        → {"workers": n}
//! POST {base}/apps/{app}/scale    {"workers": n}
//! ```
//!
//! Credentials come from the environment and are treated as opaque
//! secrets: they go into the `authorization` header and nowhere else,
//! never into log lines. Every request runs under a bounded timeout so
//! a stuck scaling call can never stall job processing.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use serde::{Deserialize, Serialize};
use tracing::debug;

use async_trait::async_trait;
use crewscale_core::{ConfigError, GatewayError};

use crate::gateway::WorkerGateway;

/// Environment variable holding the fleet API base URL.
pub const API_URL_VAR: &str = "CREWSCALE_API_URL";
/// Environment variable holding the fleet API bearer token.
pub const API_TOKEN_VAR: &str = "CREWSCALE_API_TOKEN";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape shared by the formation query response and the scale
/// request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    pub workers: u32,
}

/// Scaling backend for a remote fleet-control HTTP API.
#[derive(Debug)]
pub struct FleetGateway {
    /// `host:port` the API listens on.
    authority: String,
    app_name: String,
    token: String,
    timeout: Duration,
}

impl FleetGateway {
    /// Create a gateway against an explicit API URL and token.
    pub fn new(
        app_name: impl Into<String>,
        api_url: &str,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            authority: parse_authority(api_url)?,
            app_name: app_name.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Create a gateway from the ambient deployment environment.
    pub fn from_env(app_name: impl Into<String>) -> Result<Self, ConfigError> {
        let api_url =
            std::env::var(API_URL_VAR).map_err(|_| ConfigError::MissingEnvVar(API_URL_VAR))?;
        let token =
            std::env::var(API_TOKEN_VAR).map_err(|_| ConfigError::MissingEnvVar(API_TOKEN_VAR))?;
        Self::new(app_name, &api_url, token)
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Bytes,
    ) -> Result<(http::StatusCode, Bytes), GatewayError> {
        tokio::time::timeout(self.timeout, self.request_inner(method, path, body))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
    }

    async fn request_inner(
        &self,
        method: &str,
        path: &str,
        body: Bytes,
    ) -> Result<(http::StatusCode, Bytes), GatewayError> {
        let stream = tokio::net::TcpStream::connect(&self.authority)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method(method)
            .uri(path)
            .header("host", &self.authority)
            .header("authorization", format!("Bearer {}", self.token))
            .header("content-type", "application/json")
            .header("user-agent", "crewscale/0.1")
            .body(Full::new(body))
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .to_bytes();

        Ok((status, bytes))
    }
}

#[async_trait]
impl WorkerGateway for FleetGateway {
    async fn current_workers(&self) -> Result<u32, GatewayError> {
        let path = format!("/apps/{}", self.app_name);
        let (status, body) = self.request("GET", &path, Bytes::new()).await?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
            });
        }

        let formation: Formation =
            serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        debug!(app = %self.app_name, workers = formation.workers, "fleet formation read");
        Ok(formation.workers)
    }

    async fn set_workers(&self, n: u32) -> Result<(), GatewayError> {
        let path = format!("/apps/{}/scale", self.app_name);
        let body = serde_json::to_vec(&Formation { workers: n })
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        let (status, _) = self.request("POST", &path, Bytes::from(body)).await?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
            });
        }

        debug!(app = %self.app_name, workers = n, "fleet scale request accepted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fleet"
    }
}

/// Extract `host:port` from the configured API URL. Only plain `http`
/// is spoken here; the fleet API is expected to sit on an internal
/// network or behind a terminating proxy.
fn parse_authority(api_url: &str) -> Result<String, ConfigError> {
    let uri: http::Uri = api_url
        .parse()
        .map_err(|_| ConfigError::InvalidApiUrl(api_url.to_string()))?;

    match uri.scheme_str() {
        Some("http") | None => {}
        Some(_) => return Err(ConfigError::InvalidApiUrl(api_url.to_string())),
    }

    let authority = uri
        .authority()
        .ok_or_else(|| ConfigError::InvalidApiUrl(api_url.to_string()))?;

    Ok(match authority.port_u16() {
        Some(_) => authority.to_string(),
        None => format!("{}:80", authority.host()),
    })
}
