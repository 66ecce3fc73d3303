//! Shared fixtures: an in-process mock of the classification backend.
#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use mailtriage::api::ApiClient;
use tiny_http::{Header, Response, Server, StatusCode};

/// A request as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A canned response for one `METHOD path` pair.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

pub fn route(method: &'static str, path: &'static str, status: u16, body: &str) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// Backend double bound to `127.0.0.1:0`. Unrouted requests get 404.
pub struct MockBackend {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub base_url: String,
}

impl MockBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock backend"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("mock backend has an IP address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            std::thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let method = request.method().to_string();
                    let path = request.url().to_string();
                    let content_type = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Content-Type"))
                        .map(|h| h.value.as_str().to_string());
                    let mut body = Vec::new();
                    let _ = request.as_reader().read_to_end(&mut body);

                    requests.lock().unwrap().push(RecordedRequest {
                        method: method.clone(),
                        path: path.clone(),
                        content_type,
                        body,
                    });

                    let (status, body) = routes
                        .iter()
                        .find(|r| r.method == method && r.path == path)
                        .map(|r| (r.status, r.body.clone()))
                        .unwrap_or((404, r#"{"error": "not found"}"#.to_string()));

                    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("static header");
                    let response = Response::from_string(body)
                        .with_status_code(StatusCode(status))
                        .with_header(header);
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            requests,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5))
    }

    /// Everything received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A client for a port nothing listens on.
pub fn unreachable_client() -> ApiClient {
    ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500))
}
