// handlers/public/auth/login.rs - POST /auth/login/ handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::auth::TokenPair;
use crate::error::{ApiError, ErrorBody};
use crate::handlers::utils::json_payload;
use crate::middleware::{ApiResponse, ApiResult, Envelope};
use crate::types::FieldErrors;
use crate::validation::{expect_object, required_string};

/// Documented body of /auth/login/; the handler reads it field by field
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    #[schema(write_only)]
    pub password: String,
}

/// POST /auth/login/ - Authenticate user and receive access + refresh tokens
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": { "access": "eyJhbGciOiJIUzI1NiI...", "refresh": "eyJhbGciOiJIUzI1NiI..." }
/// }
/// ```
///
/// Missing or blank fields are a 400 naming the field; bad credentials are a 401.
#[utoipa::path(
    post,
    path = "/auth/login/",
    operation_id = "createTokenObtainPair",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = Envelope<TokenPair>),
        (status = 400, description = "Missing or blank field", body = ErrorBody),
        (status = 401, description = "No active account found with the given credentials", body = ErrorBody)
    )
)]
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let payload = json_payload(payload)?;
    let object = expect_object(&payload).map_err(ApiError::invalid_fields)?;

    let mut errors = FieldErrors::new();
    let username = required_string(object, "username", true, &mut errors);
    let password = required_string(object, "password", false, &mut errors);

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::invalid_fields(errors));
    };

    let pair = state.auth_service().login(&username, &password).await?;
    Ok(ApiResponse::success(pair))
}
