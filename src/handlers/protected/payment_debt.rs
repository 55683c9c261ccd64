use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Uri},
    Extension, Json,
};
use serde_json::Value;

use crate::api::format::{request_base_url, resolve_page, Page, PageQuery};
use crate::app::AppState;
use crate::database::{DatabaseError, PaymentDebt};
use crate::error::{ApiError, ErrorBody};
use crate::handlers::utils::{json_payload, path_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Envelope};
use crate::validation::{validate_changes, validate_new, ValidationMode};

pub const DUPLICATE_DEBT_ID: &str = "payment debt with this debt id already exists.";

/// GET /payment-debt/ - Paginated list ordered by debt_id
#[utoipa::path(
    get,
    path = "/payment-debt/",
    operation_id = "listPaymentDebts",
    tag = "payment-debt",
    params(("page" = Option<String>, Query, description = "A page number within the paginated result set, or `last`.")),
    responses(
        (status = 200, description = "Paginated payment debts", body = Envelope<Page<PaymentDebt>>),
        (status = 404, description = "Invalid page.", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Page<PaymentDebt>> {
    let count = state.debts.count().await?;
    let window = resolve_page(query.page.as_deref(), count, state.config.api.page_size)?;
    let results = state.debts.select_page(window.limit, window.offset).await?;

    Ok(ApiResponse::success(Page::new(
        results,
        count,
        window,
        &request_base_url(&headers, &uri),
    )))
}

/// POST /payment-debt/ - Validate and insert a new record
#[utoipa::path(
    post,
    path = "/payment-debt/",
    operation_id = "createPaymentDebt",
    tag = "payment-debt",
    request_body = PaymentDebt,
    responses(
        (status = 201, description = "Created payment debt", body = Envelope<PaymentDebt>),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<PaymentDebt> {
    let payload = json_payload(payload)?;
    let debt = validate_new(&payload).map_err(ApiError::invalid_fields)?;

    let created = state.debts.insert(&debt).await.map_err(|e| match e {
        DatabaseError::Conflict(_) => ApiError::invalid_field("debt_id", DUPLICATE_DEBT_ID),
        other => other.into(),
    })?;

    tracing::info!("User '{}' created payment debt {}", user.username, created.debt_id);
    Ok(ApiResponse::created(created))
}

/// GET /payment-debt/:debt_id/ - Single record
#[utoipa::path(
    get,
    path = "/payment-debt/{debt_id}/",
    operation_id = "retrievePaymentDebt",
    tag = "payment-debt",
    params(("debt_id" = i32, Path, description = "A unique integer value identifying this payment debt.")),
    responses(
        (status = 200, description = "Payment debt", body = Envelope<PaymentDebt>),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn retrieve(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<PaymentDebt> {
    let debt_id = path_id(path)?;
    Ok(ApiResponse::success(state.debts.select_404(debt_id).await?))
}

/// PUT /payment-debt/:debt_id/ - Replace every field but the key
#[utoipa::path(
    put,
    path = "/payment-debt/{debt_id}/",
    operation_id = "updatePaymentDebt",
    tag = "payment-debt",
    params(("debt_id" = i32, Path, description = "A unique integer value identifying this payment debt.")),
    request_body = PaymentDebt,
    responses(
        (status = 200, description = "Updated payment debt", body = Envelope<PaymentDebt>),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<PaymentDebt> {
    change(state, path, payload, ValidationMode::Replace).await
}

/// PATCH /payment-debt/:debt_id/ - Change only the supplied fields
#[utoipa::path(
    patch,
    path = "/payment-debt/{debt_id}/",
    operation_id = "partialUpdatePaymentDebt",
    tag = "payment-debt",
    params(("debt_id" = i32, Path, description = "A unique integer value identifying this payment debt.")),
    request_body = PaymentDebt,
    responses(
        (status = 200, description = "Updated payment debt", body = Envelope<PaymentDebt>),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn partial_update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<PaymentDebt> {
    change(state, path, payload, ValidationMode::Partial).await
}

/// DELETE /payment-debt/:debt_id/
#[utoipa::path(
    delete,
    path = "/payment-debt/{debt_id}/",
    operation_id = "destroyPaymentDebt",
    tag = "payment-debt",
    params(("debt_id" = i32, Path, description = "A unique integer value identifying this payment debt.")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearerAuth" = []))
)]
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<()> {
    let debt_id = path_id(path)?;
    state.debts.delete(debt_id).await?;

    tracing::info!("User '{}' deleted payment debt {}", user.username, debt_id);
    Ok(ApiResponse::no_content())
}

async fn change(
    state: AppState,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
    mode: ValidationMode,
) -> ApiResult<PaymentDebt> {
    let debt_id = path_id(path)?;
    let payload = json_payload(payload)?;
    let changes = validate_changes(&payload, mode).map_err(ApiError::invalid_fields)?;

    let existing = state.debts.select_404(debt_id).await?;
    let updated = state.debts.update(&changes.apply(existing)).await?;

    Ok(ApiResponse::success(updated))
}
