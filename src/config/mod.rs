/// Configuration system for mailtriage.
///
/// Layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::TriageConfig::default()`]
/// 2. **User global config**: `~/.mailtriage/config.toml`
/// 3. **Project local config**: `.mailtriage.toml` in the current directory
/// 4. **Environment variables**: `MAILTRIAGE_*` overrides (highest precedence)
///
/// Each TOML file is deserialized with `serde(default)`, so a layer that
/// exists replaces the previous one wholesale; unset keys carry defaults.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::TriageConfig;

/// Directory holding the global config, local history and activity log.
const APP_DIR: &str = ".mailtriage";

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> TriageConfig {
    let mut config = TriageConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file. Missing or malformed files yield `None`.
fn load_toml_file(path: Option<PathBuf>) -> Option<TriageConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.mailtriage/<name>`.
pub fn app_file(name: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join(name))
}

fn global_config_path() -> Option<PathBuf> {
    app_file("config.toml")
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".mailtriage.toml"))
}

/// Path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Resolve the local history file: the configured path, or
/// `~/.mailtriage/history.json`.
pub fn local_history_path(config: &TriageConfig) -> Option<PathBuf> {
    if config.history.local_path.trim().is_empty() {
        app_file("history.json")
    } else {
        Some(PathBuf::from(config.history.local_path.trim()))
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `MAILTRIAGE_BASE_URL`: backend base URL
/// - `MAILTRIAGE_TIMEOUT_MS`: request timeout
/// - `MAILTRIAGE_DEPLOYMENT`: `auto`, `server` or `serverless`
/// - `MAILTRIAGE_HISTORY_PATH`: local history file
/// - `MAILTRIAGE_LOG_LEVEL`: default log filter
/// - `MAILTRIAGE_ACTIVITY_LOG`: activity log on/off
/// - `MAILTRIAGE_WEB_ADDR`: dashboard listen address
fn apply_env_overrides(config: &mut TriageConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Split out so tests don't have
/// to mutate the process environment.
fn apply_overrides(config: &mut TriageConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("MAILTRIAGE_BASE_URL")
        && !val.is_empty()
    {
        config.server.base_url = val;
    }
    if let Some(val) = lookup("MAILTRIAGE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = ms;
    }
    if let Some(val) = lookup("MAILTRIAGE_DEPLOYMENT")
        && let Some(mode) = parse_deployment(&val)
    {
        config.environment.deployment = mode;
    }
    if let Some(val) = lookup("MAILTRIAGE_HISTORY_PATH") {
        config.history.local_path = val;
    }
    if let Some(val) = lookup("MAILTRIAGE_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
    if let Some(val) = lookup("MAILTRIAGE_ACTIVITY_LOG") {
        config.logging.activity_log = is_truthy(&val);
    }
    if let Some(val) = lookup("MAILTRIAGE_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a deployment mode string.
pub fn parse_deployment(val: &str) -> Option<schema::DeploymentMode> {
    match val.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(schema::DeploymentMode::Auto),
        "server" | "local" => Some(schema::DeploymentMode::Server),
        "serverless" | "static" | "vercel" => Some(schema::DeploymentMode::Serverless),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.mailtriage/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.mailtriage/ directory")?;
    }

    fs::write(&path, TriageConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config(config: &TriageConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
