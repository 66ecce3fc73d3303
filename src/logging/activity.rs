//! Submission activity log: one JSON line per `classify` submission.
//!
//! Records what was sent and how it ended, never the email content itself.
//!
//! Log file: `~/.mailtriage/activity.jsonl`

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{self, TriageConfig};

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    /// `"text"` or `"files"`.
    pub input_kind: String,
    /// Number of results returned (0 on failure).
    pub item_count: usize,
    /// `"success"` or `"failure"`.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivityEvent {
    pub fn success(input_kind: &str, item_count: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            input_kind: input_kind.to_string(),
            item_count,
            outcome: "success".to_string(),
            error: None,
        }
    }

    pub fn failure(input_kind: &str, error: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            input_kind: input_kind.to_string(),
            item_count: 0,
            outcome: "failure".to_string(),
            error: Some(error.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append-only JSONL writer.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log at `~/.mailtriage/activity.jsonl`, or `None` when disabled
    /// or there is no home directory.
    pub fn from_config(config: &TriageConfig) -> Option<Self> {
        if !config.logging.activity_log {
            return None;
        }
        config::app_file("activity.jsonl").map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort: failures are logged at debug level and otherwise ignored.
    pub fn record(&self, event: &ActivityEvent) {
        if let Err(e) = self.append(event) {
            log::debug!("activity log write to {} failed: {e}", self.path.display());
        }
    }

    fn append(&self, event: &ActivityEvent) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("nested").join("activity.jsonl"));

        log.record(&ActivityEvent::success("text", 1));
        log.record(&ActivityEvent::failure("files", "Ocorreu um erro no servidor."));

        let content = std::fs::read_to_string(log.path()).unwrap();
        let events: Vec<ActivityEvent> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, "success");
        assert_eq!(events[0].item_count, 1);
        assert!(events[0].error.is_none());
        assert_eq!(events[1].input_kind, "files");
        assert_eq!(events[1].error.as_deref(), Some("Ocorreu um erro no servidor."));
    }

    #[test]
    fn unwritable_path_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        // The directory itself cannot be opened as a file.
        let log = ActivityLog::new(dir.path());
        log.record(&ActivityEvent::success("text", 1));
    }

    #[test]
    fn disabled_in_config() {
        let mut config = TriageConfig::default();
        config.logging.activity_log = false;
        assert!(ActivityLog::from_config(&config).is_none());
    }
}
