use crate::errors::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Turns a path extraction failure into a 400 with a readable detail
pub fn decode_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid lead id: {}", rejection.body_text())))
}

/// Turns a JSON body extraction failure into a 400 with a readable detail.
///
/// Covers a missing `Content-Type`, malformed JSON, missing fields and
/// wrongly typed fields alike.
pub fn decode_body<T: DeserializeOwned>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
