use super::{
    common::{decode_body, decode_id, success_response},
    AppState,
};
use crate::{
    entities::lead::Model as Lead,
    errors::{ApiError, ErrorResponse},
    services::leads::LeadInput,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgment returned after a delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    #[schema(example = "deleted")]
    pub detail: String,
}

impl DeletedResponse {
    fn deleted() -> Self {
        Self {
            detail: "deleted".to_string(),
        }
    }
}

/// Creates the router for lead endpoints
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/:id", get(get_lead).put(update_lead).delete(delete_lead))
}

/// Create a lead
#[utoipa::path(
    post,
    path = "/leads",
    tag = "leads",
    request_body = LeadInput,
    responses(
        (status = 200, description = "Lead created", body = Lead,
            headers(("x-request-id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn create_lead(
    State(state): State<AppState>,
    body: Result<Json<LeadInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = decode_body(body)?;
    let created = state.leads.insert(input).await?;
    Ok(success_response(created))
}

/// List all leads
#[utoipa::path(
    get,
    path = "/leads",
    tag = "leads",
    responses(
        (status = 200, description = "Every stored lead, ordered by id", body = [Lead]),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_leads(State(state): State<AppState>) -> Result<Response, ApiError> {
    let leads = state.leads.get_all().await?;
    Ok(success_response(leads))
}

/// Get a lead by id
#[utoipa::path(
    get,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead found", body = Lead),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse),
    )
)]
pub async fn get_lead(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = decode_id(id)?;
    let lead = state.leads.get_by_id(id).await?;
    Ok(success_response(lead))
}

/// Replace the fields of a lead
#[utoipa::path(
    put,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead id")),
    request_body = LeadInput,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse),
    )
)]
pub async fn update_lead(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<LeadInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = decode_id(id)?;
    let input = decode_body(body)?;
    let updated = state.leads.update(id, input).await?;
    Ok(success_response(updated))
}

/// Delete a lead
#[utoipa::path(
    delete,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead deleted", body = DeletedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse),
    )
)]
pub async fn delete_lead(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = decode_id(id)?;
    state.leads.delete_by_id(id).await?;
    Ok(success_response(DeletedResponse::deleted()))
}
