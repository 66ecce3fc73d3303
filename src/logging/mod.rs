//! Diagnostics and the submission activity log.
//!
//! Diagnostics go through the `log` macros and are printed by `env_logger`
//! on stderr. `RUST_LOG` takes precedence over the configured level.

pub mod activity;

pub use activity::{ActivityEvent, ActivityLog};

/// Initialize the global logger. Call once, from `main`.
pub fn init(level: &str) {
    let level = if level.trim().is_empty() { "warn" } else { level };

    // try_init: a second call (tests, embedding) keeps the first logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init();
}
