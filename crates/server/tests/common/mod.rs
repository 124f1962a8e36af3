//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the full router on top of
//! a SQLite database in a temporary directory, so requests go through the
//! same middleware, extractors and store as in production.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ticketdesk_core::{Config, DatabaseConfig, ServerConfig, SqliteTicketStore, TicketStore};
use ticketdesk_server::{api::create_router, state::AppState};

/// Public URL the fixture's pagination links are built from.
pub const BASE_URL: &str = "http://localhost";

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/ticket", json!({
///         "title": "VPN down",
///         "description": "Cannot connect from home"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Direct store access for seeding and assertions
    pub store: Arc<dyn TicketStore>,
    /// Temporary directory for the test database, removed on drop
    _temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 8080, // Not used for in-process testing
                public_url: BASE_URL.to_string(),
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
        };

        let store: Arc<dyn TicketStore> = Arc::new(
            SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"),
        );

        let state = Arc::new(AppState::new(config, Arc::clone(&store)));
        let router = create_router(state);

        Self {
            router,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Create `count` tickets through the API, numbered from 1.
    pub async fn seed_tickets(&self, count: usize) -> Vec<Value> {
        let mut created = Vec::with_capacity(count);
        for n in 1..=count {
            let response = self
                .post(
                    "/ticket",
                    serde_json::json!({
                        "title": format!("Ticket {}", n),
                        "description": format!("Description {}", n),
                    }),
                )
                .await;
            assert_eq!(response.status, StatusCode::CREATED);
            created.push(response.body);
        }
        created
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a PUT request without a body.
    pub async fn put_empty(&self, path: &str) -> TestResponse {
        self.request("PUT", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("POST", path, body, "application/json").await
    }

    /// Send a PUT request with raw string body (for testing malformed JSON).
    pub async fn put_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("PUT", path, body, "application/json").await
    }

    /// Fetch the raw text of the metrics endpoint.
    pub async fn metrics_text(&self) -> String {
        let request = Request::builder()
            .method("GET")
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("Metrics are not UTF-8")
    }

    /// Send a request with raw string body and custom content type.
    async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let request_builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json) => request_builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => request_builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
