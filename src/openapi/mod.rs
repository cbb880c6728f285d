use crate::handlers::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leads API",
        version = "0.1.0",
        description = "Create, read, update and delete sales leads."
    ),
    servers((url = "http://127.0.0.1:8000", description = "Local development")),
    tags(
        (name = "leads", description = "Lead management endpoints"),
        (name = "health", description = "Liveness endpoint")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::leads::create_lead,
        crate::handlers::leads::list_leads,
        crate::handlers::leads::get_lead,
        crate::handlers::leads::update_lead,
        crate::handlers::leads::delete_lead,
    ),
    components(schemas(
        crate::entities::lead::Model,
        crate::services::leads::LeadInput,
        crate::handlers::leads::DeletedResponse,
        crate::handlers::health::HealthResponse,
        crate::errors::ErrorResponse
    ))
)]
pub struct ApiDoc;

/// Serves the generated document at `/openapi.json`
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_lead_route() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Leads API"));
        assert!(json.contains("/leads/{id}"));
        assert!(json.contains("/health"));
        assert!(json.contains("\"Lead\""));
        assert!(json.contains("LeadInput"));
    }
}
