use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use leads_api::{config::AppConfig, db, services::leads::LeadService, AppState};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub db: DatabaseConnection,
    pub database_url: String,
    _dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Construct a new test application with a fresh, initialized database.
    pub async fn new() -> Self {
        Self::with_pool_size(1).await
    }

    /// Same as [`TestApp::new`] but with `max_connections` pooled connections.
    pub async fn with_pool_size(max_connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("leads.db").display());

        let mut cfg = AppConfig::new(database_url.clone(), "127.0.0.1".to_string(), 18_000);
        cfg.db_max_connections = max_connections;
        cfg.db_min_connections = 1;
        cfg.sql_logging = false;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::initialize(&pool)
            .await
            .expect("failed to create lead table");

        let state = AppState::new(Arc::new(pool.clone()));
        let router = leads_api::app_router(state.clone());

        Self {
            router,
            state,
            db: pool,
            database_url,
            _dir: dir,
        }
    }

    pub fn leads(&self) -> &LeadService {
        &self.state.leads
    }

    /// Send a request, encoding `body` as JSON when present.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        match body {
            Some(json) => {
                let raw = serde_json::to_string(&json).expect("failed to serialize json request body");
                self.request_raw(method, uri, &raw, Some("application/json"), &[])
                    .await
            }
            None => self.request_raw(method, uri, "", None, &[]).await,
        }
    }

    /// Send a request with an arbitrary body, content type and extra headers.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        body: &str,
        content_type: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

/// Reads a response body as JSON.
#[allow(dead_code)]
pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
