use crate::api::ApiClient;
use crate::config::TriageConfig;
use crate::environment::{self, Deployment};

/// Session-wide settings, resolved once at startup and passed to the
/// store and the submission flow.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: TriageConfig,
    pub deployment: Deployment,
}

impl AppContext {
    pub fn new(config: TriageConfig, deployment: Deployment) -> Self {
        Self { config, deployment }
    }

    /// Resolve the deployment (detecting it in `auto` mode) and build the
    /// context together with the client it was detected through.
    pub fn initialize(config: TriageConfig) -> (Self, ApiClient) {
        let client = ApiClient::from_config(&config.server);
        let deployment = environment::resolve(config.environment.deployment, &client);
        (Self::new(config, deployment), client)
    }
}
