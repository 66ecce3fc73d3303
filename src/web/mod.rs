//! Local dashboard server.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves, from the
//! active history store:
//! - `GET /`: dashboard page with charts and topic list
//! - `GET /history`: history page
//! - `GET /api/dashboard`: the aggregated views as JSON
//! - `GET /api/history`: the stored records as JSON
//!
//! Launched via `mailtriage web` (default: `http://127.0.0.1:9747`).

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::aggregate;
use crate::render::html;
use crate::store::HistoryStore;

const JSON: &str = "application/json; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled sequentially; a failing
/// handler answers 500 without stopping the server.
pub fn serve(addr: &str, store: &dyn HistoryStore) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("mailtriage dashboard running at http://{addr} ({} history)", store.kind());
    println!("Press Ctrl+C to stop.\n");

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = match dispatch(&method, &url, store) {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("{method} {url} failed: {e:#}");
                Reply::error(&format!("{e:#}"))
            }
        };

        let status = reply.status;
        if let Err(e) = request.respond(reply.into_response()) {
            log::debug!("failed to send response for {url}: {e}");
        }

        log::info!("{method} {url} {status}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// A rendered response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: HTML,
            body,
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: JSON,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: JSON,
            body: r#"{"error": "not found"}"#.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: 500,
            content_type: JSON,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let resp = Response::from_data(self.body.into_bytes())
            .with_status_code(StatusCode(self.status));
        match Header::from_bytes("Content-Type", self.content_type) {
            Ok(header) => resp.with_header(header),
            Err(()) => resp,
        }
    }
}

/// Dispatch a request to its handler.
pub fn dispatch(method: &Method, url: &str, store: &dyn HistoryStore) -> Result<Reply> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => dashboard_page(store),
        (&Method::Get, "/history") => Ok(Reply::html(html::history_page(&store.load()))),
        (&Method::Get, "/api/dashboard") => dashboard_json(store),
        (&Method::Get, "/api/history") => {
            let body = serde_json::to_string(&store.load()).context("failed to serialize history")?;
            Ok(Reply::json(body))
        }
        _ => Ok(Reply::not_found()),
    }
}

fn dashboard_page(store: &dyn HistoryStore) -> Result<Reply> {
    let payload = store.dashboard()?;
    let views = aggregate::build_views(&payload);
    Ok(Reply::html(html::dashboard_page(&views)))
}

fn dashboard_json(store: &dyn HistoryStore) -> Result<Reply> {
    let payload = store.dashboard()?;
    let views = aggregate::build_views(&payload);
    let body = serde_json::to_string(&views).context("failed to serialize dashboard views")?;
    Ok(Reply::json(body))
}
