//! In-process HTTP stub shared by the workspace's tests.
//!
//! Serves canned responses keyed by path prefix and records every request it
//! receives.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl StubResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn event_stream(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream".to_string(),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        let mut builder = Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, self.content_type);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
struct StubState {
    routes: Arc<Vec<(String, StubResponse)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn route(&self, path: &str) -> StubResponse {
        self.routes
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| StubResponse::json(404, r#"{"error": "not found"}"#))
    }
}

async fn answer(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StubResponse {
    let path = uri.path().to_string();
    let response = state.route(&path);

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.to_string(),
            path,
            query: uri.query().unwrap_or_default().to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).to_string(),
                    )
                })
                .collect(),
            body: String::from_utf8_lossy(&body).to_string(),
        });

    response
}

pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Starts serving on an ephemeral localhost port.
    ///
    /// A request is answered by the route with the longest matching path
    /// prefix; unmatched paths get a 404.
    pub async fn start(routes: Vec<(&str, StubResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");

        let state = StubState {
            routes: Arc::new(
                routes
                    .into_iter()
                    .map(|(prefix, response)| (prefix.to_string(), response))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);

        let app = Router::new().fallback(answer).with_state(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn requests_to(&self, path_prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path.starts_with(path_prefix))
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let server = StubServer::start(vec![
            ("/api", StubResponse::json(200, r#"{"route": "api"}"#)),
            (
                "/api/v1",
                StubResponse::json(201, r#"{"route": "v1"}"#).with_header("x-ratelimit-remaining", "9"),
            ),
        ])
        .await;

        let response = reqwest::get(server.url("/api/v1/things?limit=3"))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(
            response.headers().get("x-ratelimit-remaining").unwrap(),
            "9"
        );
        assert_eq!(response.text().await.unwrap(), r#"{"route": "v1"}"#);

        let recorded = server.requests_to("/api/v1");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, "GET");
        assert_eq!(recorded[0].query, "limit=3");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let server = StubServer::start(vec![("/api", StubResponse::json(200, "{}"))]).await;

        let response = reqwest::get(server.url("/other")).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_chunked_body_is_recorded_decoded() {
        let server = StubServer::start(vec![("/upload", StubResponse::json(200, "{}"))]).await;

        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![Ok("hello "), Ok("world")];
        let body = reqwest::Body::wrap_stream(futures::stream::iter(chunks));
        let response = reqwest::Client::new()
            .post(server.url("/upload"))
            .header("x-api-key", "secret")
            .body(body)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let recorded = server.requests_to("/upload");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, "POST");
        assert_eq!(recorded[0].body, "hello world");
        assert_eq!(recorded[0].header("X-Api-Key"), Some("secret"));
        assert_eq!(recorded[0].header("transfer-encoding"), Some("chunked"));
    }
}
