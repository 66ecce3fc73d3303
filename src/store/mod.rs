//! History Store Adapter.
//!
//! Two backends behind one [`HistoryStore`] trait:
//!
//! - [`RemoteStore`]: the backend database, read via `/history` and
//!   `/dashboard/data`. Written implicitly by `/classify`.
//! - [`LocalStore`]: a JSON file on this machine, used when the backend is
//!   serverless and keeps nothing.
//!
//! The concrete store is picked once from the [`AppContext`] and handed to
//! whoever needs it.

mod local;
mod remote;

use anyhow::{Context, Result};

pub use local::{LocalStore, MAX_HISTORY_ITEMS};
pub use remote::RemoteStore;

use crate::api::ApiClient;
use crate::config;
use crate::context::AppContext;
use crate::model::{ClassificationRecord, DashboardPayload};

/// Which backend a store reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Remote,
    Local,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Uniform read/append contract over the history backends.
pub trait HistoryStore {
    fn kind(&self) -> StoreKind;

    /// Most-recent-first history. Failures read as an empty history.
    fn load(&self) -> Vec<ClassificationRecord>;

    /// Record a freshly classified email.
    ///
    /// Only the local store persists anything; the backend already stored
    /// the record while classifying it.
    fn append(&self, record: ClassificationRecord) -> Result<()>;

    /// Input for the dashboard views.
    fn dashboard(&self) -> Result<DashboardPayload>;
}

/// Pick the store matching the context's deployment.
pub fn for_context(ctx: &AppContext, client: ApiClient) -> Result<Box<dyn HistoryStore>> {
    if ctx.deployment.is_serverless() {
        let path = config::local_history_path(&ctx.config)
            .context("could not determine local history path (no home directory)")?;
        log::debug!("using local history at {}", path.display());
        Ok(Box::new(LocalStore::new(path)))
    } else {
        Ok(Box::new(RemoteStore::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriageConfig;
    use crate::environment::Deployment;

    #[test]
    fn serverless_context_selects_local_store() {
        let mut config = TriageConfig::default();
        config.history.local_path = "/tmp/mailtriage-test-history.json".to_string();
        let ctx = AppContext::new(config, Deployment::Serverless);
        let client = ApiClient::from_config(&ctx.config.server);

        let store = for_context(&ctx, client).unwrap();
        assert_eq!(store.kind(), StoreKind::Local);
    }

    #[test]
    fn server_context_selects_remote_store() {
        let ctx = AppContext::new(TriageConfig::default(), Deployment::Server);
        let client = ApiClient::from_config(&ctx.config.server);

        let store = for_context(&ctx, client).unwrap();
        assert_eq!(store.kind(), StoreKind::Remote);
    }
}
