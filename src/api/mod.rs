//! Blocking HTTP client for the classification backend.
//!
//! Wraps a `ureq` agent and exposes one method per backend call:
//!
//! - `GET /api/environment`: deployment kind
//! - `GET /history`: recent classifications
//! - `GET /dashboard/data`: dashboard payload
//! - `POST /classify`: multipart submission
//!
//! Every method returns a typed [`ClientError`] so callers can tell a
//! transport failure from a server-reported one. Nothing is retried.

pub mod multipart;

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::schema::ServerConfig;
use crate::error::{ClientError, ClientResult, GENERIC_SERVER_ERROR};
use crate::model::{ClassificationRecord, ClassifyResponse, DashboardPayload};

pub use multipart::MultipartForm;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Body of `GET /api/environment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EnvironmentInfo {
    pub is_vercel: bool,
}

/// Error envelope the backend uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Build a client from the `[server]` config section.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/environment`.
    pub fn environment(&self) -> ClientResult<EnvironmentInfo> {
        self.get_json("/api/environment")
    }

    /// `GET /history`.
    pub fn history(&self) -> ClientResult<Vec<ClassificationRecord>> {
        self.get_json("/history")
    }

    /// `GET /dashboard/data`.
    pub fn dashboard_data(&self) -> ClientResult<DashboardPayload> {
        self.get_json("/dashboard/data")
    }

    /// `POST /classify` with a prepared multipart body.
    pub fn classify(&self, form: &MultipartForm) -> ClientResult<ClassifyResponse> {
        let url = self.url("/classify");
        log::debug!("POST {url} ({} parts)", form.len());

        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", &form.content_type())
            .send_bytes(&form.to_bytes())
            .map_err(map_ureq_error)?;

        resp.into_json()
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        log::debug!("GET {url}");

        let resp = self.agent.get(&url).call().map_err(map_ureq_error)?;
        resp.into_json()
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        // "localhost" may resolve to ::1 first while the backend only binds IPv4.
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }
}

/// Translate a ureq failure into the client taxonomy.
///
/// Non-success statuses keep the server's `error` message when the body
/// carries one.
fn map_ureq_error(err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Status(status, resp) => {
            let message = resp
                .into_json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
            ClientError::Server { status, message }
        }
        ureq::Error::Transport(transport) => ClientError::Transport(transport.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
