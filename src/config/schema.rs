/// Configuration schema and defaults for mailtriage.
///
/// Sections: `[server]`, `[environment]`, `[history]`, `[logging]` and
/// `[web]`. Every field has a built-in default; users only set what they
/// want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps directly to `~/.mailtriage/config.toml` and `.mailtriage.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub server: ServerConfig,
    pub environment: EnvironmentConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Classification backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the backend (no trailing slash needed).
    pub base_url: String,
    /// Per-request timeout in milliseconds. Classification of large PDFs is
    /// slow, so this is generous.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [environment]
// ---------------------------------------------------------------------------

/// How the deployment kind is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// Ask `GET /api/environment` (default).
    #[default]
    Auto,
    /// Server-backed: history lives in the backend database.
    Server,
    /// Serverless/static: history lives in the local file.
    Serverless,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Server => write!(f, "server"),
            Self::Serverless => write!(f, "serverless"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub deployment: DeploymentMode,
}

// ---------------------------------------------------------------------------
// [history]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Local history file. Empty means `~/.mailtriage/history.json`.
    pub local_path: String,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub level: String,
    /// Append one JSONL line per submission to `~/.mailtriage/activity.jsonl`.
    pub activity_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            activity_log: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `mailtriage web`.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl TriageConfig {
    /// Annotated default config file, written by `mailtriage config init`.
    pub fn default_toml() -> String {
        r#"# mailtriage configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MAILTRIAGE_*)
#   2. Project config (.mailtriage.toml in current directory)
#   3. User global config (~/.mailtriage/config.toml)
#   4. Built-in defaults

[server]
base_url = "http://127.0.0.1:5000"
timeout_ms = 30000

[environment]
deployment = "auto"   # auto | server | serverless

[history]
local_path = ""       # empty = ~/.mailtriage/history.json

[logging]
level = "warn"        # RUST_LOG overrides this
activity_log = true

[web]
addr = "127.0.0.1:9747"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
