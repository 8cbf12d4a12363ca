//! Account purpose API endpoints

pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::Router;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::query::{QueryConfig, parse_query};
use crate::api::types::{ApiError, ApiResponse};
use crate::core::constants::{MSG_CREATED, MSG_DELETED, MSG_OK, MSG_UPDATED};
use crate::data::SqliteService;
use crate::data::query::Paginated;
use crate::data::sqlite::repositories::account_purpose::{
    AccountPurposeChanges, NewAccountPurpose,
};
use crate::domain::account_purposes;

use types::{AccountPurposeBody, AccountPurposeDto};

/// Parser configuration for the list endpoint
const LIST_QUERY_CONFIG: QueryConfig = QueryConfig {
    allowed_filters: Some(&["code", "name", "is_active", "created_at"]),
    allowed_sort_fields: Some(&["code", "name", "is_active", "created_at"]),
    searchable_fields: &["code", "name"],
    max_page_size: crate::core::constants::MAX_PAGE_SIZE,
    default_page_size: crate::core::constants::DEFAULT_PAGE_SIZE,
    default_page: crate::core::constants::DEFAULT_PAGE,
};

/// Shared state for account purpose endpoints
#[derive(Clone)]
pub struct AccountPurposesApiState {
    pub database: Arc<SqliteService>,
}

/// Build account purpose routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = AccountPurposesApiState { database };

    Router::new()
        .route("/", get(list_account_purposes).post(create_account_purpose))
        .route("/active", get(list_active_account_purposes))
        .route(
            "/{id}",
            get(get_account_purpose)
                .put(update_account_purpose)
                .delete(delete_account_purpose),
        )
        .route("/{id}/toggle", patch(toggle_account_purpose))
        .with_state(state)
}

/// List account purposes with filtering, sorting, search and pagination
#[utoipa::path(
    get,
    path = "/api/v1/account-purposes",
    tag = "account-purposes",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("pageSize" = Option<u64>, Query, description = "Items per page (clamped to 100)"),
        ("sort" = Option<String>, Query, description = "Sort spec: field or field:desc, repeatable"),
        ("search" = Option<String>, Query, description = "Case-insensitive search over code and name"),
        ("code" = Option<String>, Query, description = "Filter value, optionally operator-prefixed (eq:, ne:, in:, between:, ...)")
    ),
    responses(
        (status = 200, description = "Paginated account purposes"),
        (status = 400, description = "Malformed pagination or filter value")
    )
)]
pub async fn list_account_purposes(
    State(state): State<AccountPurposesApiState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ApiResponse<Paginated<AccountPurposeDto>>, ApiError> {
    let parsed = parse_query(&params, &LIST_QUERY_CONFIG)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let page = account_purposes::list(state.database.pool(), &parsed).await?;

    Ok(ApiResponse::new(MSG_OK, page.map(AccountPurposeDto::from)))
}

/// List active account purposes without pagination
#[utoipa::path(
    get,
    path = "/api/v1/account-purposes/active",
    tag = "account-purposes",
    responses(
        (status = 200, description = "Active account purposes")
    )
)]
pub async fn list_active_account_purposes(
    State(state): State<AccountPurposesApiState>,
) -> Result<ApiResponse<Vec<AccountPurposeDto>>, ApiError> {
    let rows = account_purposes::list_active(state.database.pool()).await?;
    let data: Vec<AccountPurposeDto> = rows.into_iter().map(AccountPurposeDto::from).collect();

    Ok(ApiResponse::new(MSG_OK, data))
}

/// Get a single account purpose by id
#[utoipa::path(
    get,
    path = "/api/v1/account-purposes/{id}",
    tag = "account-purposes",
    params(("id" = i64, Path, description = "Account purpose id")),
    responses(
        (status = 200, description = "Account purpose details", body = AccountPurposeDto),
        (status = 404, description = "Account purpose not found")
    )
)]
pub async fn get_account_purpose(
    State(state): State<AccountPurposesApiState>,
    IdPath { id }: IdPath,
) -> Result<ApiResponse<AccountPurposeDto>, ApiError> {
    let row = account_purposes::get(state.database.pool(), id).await?;

    Ok(ApiResponse::new(MSG_OK, AccountPurposeDto::from(row)))
}

/// Create an account purpose
#[utoipa::path(
    post,
    path = "/api/v1/account-purposes",
    tag = "account-purposes",
    request_body = AccountPurposeBody,
    responses(
        (status = 201, description = "Account purpose created", body = AccountPurposeDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_account_purpose(
    State(state): State<AccountPurposesApiState>,
    ValidatedJson(body): ValidatedJson<AccountPurposeBody>,
) -> Result<(StatusCode, ApiResponse<AccountPurposeDto>), ApiError> {
    let row = account_purposes::create(
        state.database.pool(),
        &NewAccountPurpose {
            code: &body.code,
            name: &body.name,
            description: body.description.as_deref(),
            is_active: body.is_active.unwrap_or(false),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::new(MSG_CREATED, AccountPurposeDto::from(row)),
    ))
}

/// Update an account purpose
#[utoipa::path(
    put,
    path = "/api/v1/account-purposes/{id}",
    tag = "account-purposes",
    params(("id" = i64, Path, description = "Account purpose id")),
    request_body = AccountPurposeBody,
    responses(
        (status = 200, description = "Account purpose updated", body = AccountPurposeDto),
        (status = 404, description = "Account purpose not found"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn update_account_purpose(
    State(state): State<AccountPurposesApiState>,
    IdPath { id }: IdPath,
    ValidatedJson(body): ValidatedJson<AccountPurposeBody>,
) -> Result<ApiResponse<AccountPurposeDto>, ApiError> {
    let row = account_purposes::update(
        state.database.pool(),
        id,
        &AccountPurposeChanges {
            code: Some(&body.code),
            name: Some(&body.name),
            description: body.description.as_deref(),
            is_active: body.is_active,
        },
    )
    .await?;

    Ok(ApiResponse::new(MSG_UPDATED, AccountPurposeDto::from(row)))
}

/// Toggle the active flag of an account purpose
#[utoipa::path(
    patch,
    path = "/api/v1/account-purposes/{id}/toggle",
    tag = "account-purposes",
    params(("id" = i64, Path, description = "Account purpose id")),
    responses(
        (status = 200, description = "Account purpose toggled", body = AccountPurposeDto),
        (status = 404, description = "Account purpose not found")
    )
)]
pub async fn toggle_account_purpose(
    State(state): State<AccountPurposesApiState>,
    IdPath { id }: IdPath,
) -> Result<ApiResponse<AccountPurposeDto>, ApiError> {
    let row = account_purposes::toggle_status(state.database.pool(), id).await?;

    Ok(ApiResponse::new(MSG_UPDATED, AccountPurposeDto::from(row)))
}

/// Delete an account purpose
#[utoipa::path(
    delete,
    path = "/api/v1/account-purposes/{id}",
    tag = "account-purposes",
    params(("id" = i64, Path, description = "Account purpose id")),
    responses(
        (status = 200, description = "Account purpose deleted"),
        (status = 404, description = "Account purpose not found")
    )
)]
pub async fn delete_account_purpose(
    State(state): State<AccountPurposesApiState>,
    IdPath { id }: IdPath,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    account_purposes::remove(state.database.pool(), id).await?;

    Ok(ApiResponse::new(MSG_DELETED, serde_json::Value::Null))
}
