/*!
In-process HTTP client for service tests.

Drives a `Router` directly through `tower::ServiceExt::oneshot`, no socket
involved, and decodes every response body as JSON (plain text bodies come
back as a JSON string).
*/

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Asserts the status code and hands back the body
    pub fn expect(self, status: StatusCode) -> Value {
        assert_eq!(self.status, status, "unexpected status, body: {}", self.body);
        self.body
    }
}

#[derive(Clone)]
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn post<B: Serialize>(&self, uri: &str, body: &B) -> TestResponse {
        self.send(Method::POST, uri, Some(to_bytes(body))).await
    }

    pub async fn put<B: Serialize>(&self, uri: &str, body: &B) -> TestResponse {
        self.send(Method::PUT, uri, Some(to_bytes(body))).await
    }

    /// PUT without a body (status changes are driven by the query string)
    pub async fn put_empty(&self, uri: &str) -> TestResponse {
        self.send(Method::PUT, uri, None).await
    }

    /// POST with a raw, possibly broken, JSON payload
    pub async fn post_raw(&self, uri: &str, raw: &str) -> TestResponse {
        self.send(Method::POST, uri, Some(raw.as_bytes().to_vec())).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Vec<u8>>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid test request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable response body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }
}

fn to_bytes<B: Serialize>(body: &B) -> Vec<u8> {
    serde_json::to_vec(body).expect("serializable test payload")
}

/// Fresh directory for a test's data files, removed on drop
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}
