//! Leads API
//!
//! A small CRUD service for sales leads backed by a single SQL table.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{
    db::DbPool, middleware_helpers::request_id::request_id_middleware,
    services::leads::LeadService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub leads: LeadService,
}

impl AppState {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            leads: LeadService::new(db),
        }
    }
}

/// Builds the full HTTP surface with tracing and request-id layers attached.
///
/// CORS is left to the binary since it depends on runtime configuration.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/leads", handlers::leads::lead_routes())
        .merge(openapi::openapi_routes())
        .fallback(handlers::not_found)
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
