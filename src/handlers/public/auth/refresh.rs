// handlers/public/auth/refresh.rs - POST /auth/refresh/ handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::error::{ApiError, ErrorBody};
use crate::handlers::utils::json_payload;
use crate::middleware::{ApiResponse, ApiResult, Envelope};
use crate::types::FieldErrors;
use crate::validation::{expect_object, required_string};

/// Documented body of /auth/refresh/
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

/// POST /auth/refresh/ - Exchange a refresh token for a new access token
///
/// Expected Input:
/// ```json
/// { "refresh": "string" }
/// ```
///
/// The refresh token stays valid until it expires; it is not rotated.
#[utoipa::path(
    post,
    path = "/auth/refresh/",
    operation_id = "createTokenRefresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = Envelope<AccessToken>),
        (status = 400, description = "Missing refresh field", body = ErrorBody),
        (status = 401, description = "Token is invalid or expired", body = ErrorBody)
    )
)]
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<AccessToken> {
    let payload = json_payload(payload)?;
    let object = expect_object(&payload).map_err(ApiError::invalid_fields)?;

    let mut errors = FieldErrors::new();
    let Some(refresh) = required_string(object, "refresh", false, &mut errors) else {
        return Err(ApiError::invalid_fields(errors));
    };

    let access = state.auth_service().refresh(&refresh)?;
    Ok(ApiResponse::success(AccessToken { access }))
}
