use anyhow::{Context, Result};

use super::{HistoryStore, StoreKind};
use crate::api::ApiClient;
use crate::model::{ClassificationRecord, DashboardPayload};

/// History kept by the backend database.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: ApiClient,
}

impl RemoteStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl HistoryStore for RemoteStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }

    /// `GET /history`. Any failure is logged and reads as "no history yet".
    fn load(&self) -> Vec<ClassificationRecord> {
        match self.client.history() {
            Ok(records) => records,
            Err(e) => {
                log::error!("Falha ao buscar histórico do servidor: {e}");
                Vec::new()
            }
        }
    }

    /// The backend stored the record while classifying it.
    fn append(&self, _record: ClassificationRecord) -> Result<()> {
        Ok(())
    }

    fn dashboard(&self) -> Result<DashboardPayload> {
        self.client
            .dashboard_data()
            .context("Não foi possível carregar os dados do dashboard.")
    }
}
