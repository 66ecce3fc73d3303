use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{HistoryStore, StoreKind};
use crate::model::{ClassificationRecord, DashboardPayload};

/// Maximum number of records the local history keeps.
pub const MAX_HISTORY_ITEMS: usize = 20;

/// History persisted as a JSON array in a local file, most recent first.
///
/// Bounded FIFO with head insertion: once [`MAX_HISTORY_ITEMS`] is
/// exceeded the oldest entries are dropped. The file is read-modify-written
/// without locking; concurrent writers can lose entries.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[ClassificationRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string(records).context("failed to serialize history")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl HistoryStore for LocalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }

    /// Read the history file. Absent or malformed files read as empty.
    fn load(&self) -> Vec<ClassificationRecord> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("ignoring malformed history file {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    fn append(&self, record: ClassificationRecord) -> Result<()> {
        let mut history = self.load();
        history.insert(0, record);
        history.truncate(MAX_HISTORY_ITEMS);
        self.write(&history)
    }

    fn dashboard(&self) -> Result<DashboardPayload> {
        Ok(DashboardPayload::raw(self.load()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(topic: &str) -> ClassificationRecord {
        ClassificationRecord {
            classification: Some("Produtivo".to_string()),
            key_topic: Some(topic.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("absent.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        assert!(LocalStore::new(&path).load().is_empty());

        fs::write(&path, r#"{"all_data": []}"#).unwrap();
        assert!(LocalStore::new(&path).load().is_empty());
    }

    #[test]
    fn append_prepends_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested").join("history.json"));

        store.append(record("first")).unwrap();
        store.append(record("second")).unwrap();

        let history = store.load();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].key_topic.as_deref(), Some("second"));
        assert_eq!(history[1].key_topic.as_deref(), Some("first"));
    }

    #[test]
    fn dashboard_is_raw_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("history.json"));
        store.append(record("a")).unwrap();

        let payload = store.dashboard().unwrap();
        assert_eq!(payload.all_data.len(), 1);
        assert!(payload.sentiments_over_time.is_none());
        assert!(payload.classifications_over_time.is_none());
    }
}
