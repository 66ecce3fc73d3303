//! Deployment detection.
//!
//! A serverless deployment has no database, so history must live on the
//! client. Detection runs once per process and is best-effort: any failure
//! falls back to [`Deployment::Server`].

use crate::api::ApiClient;
use crate::config::schema::DeploymentMode;

/// Where the backend keeps its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Server-backed: `/history` and `/dashboard/data` are authoritative.
    Server,
    /// Serverless/static: the backend is stateless; the local store is used.
    Serverless,
}

impl Deployment {
    pub fn is_serverless(self) -> bool {
        matches!(self, Self::Serverless)
    }
}

impl std::fmt::Display for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Serverless => write!(f, "serverless"),
        }
    }
}

/// Ask the backend which deployment it is running in.
///
/// Never fails: transport errors, non-success statuses and malformed
/// payloads are logged and resolve to [`Deployment::Server`].
pub fn detect(client: &ApiClient) -> Deployment {
    match client.environment() {
        Ok(info) => {
            let deployment = if info.is_vercel {
                Deployment::Serverless
            } else {
                Deployment::Server
            };
            log::info!("detected {deployment} deployment at {}", client.base_url());
            deployment
        }
        Err(e) => {
            log::warn!("could not detect deployment, assuming server-backed: {e}");
            Deployment::Server
        }
    }
}

/// Resolve the deployment from config, detecting only in `auto` mode.
pub fn resolve(mode: DeploymentMode, client: &ApiClient) -> Deployment {
    match mode {
        DeploymentMode::Auto => detect(client),
        DeploymentMode::Server => Deployment::Server,
        DeploymentMode::Serverless => Deployment::Serverless,
    }
}
