use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, mapping extractor rejections onto the API error format.
pub fn json_payload(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(ApiError::unsupported_media_type(
            "Request Content-Type must be application/json",
        )),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::payload_too_large("Request body is too large"))
        }
        Err(rejection) => Err(ApiError::invalid_json(format!(
            "JSON parse error - {}",
            rejection.body_text()
        ))),
    }
}

/// Integer path parameter; anything unparseable is simply not found.
pub fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        ApiError::not_found("Not found.")
    })
}
