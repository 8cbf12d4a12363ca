//! OpenAPI specification

use axum::Json;
use axum::response::IntoResponse;
use utoipa::OpenApi;

use crate::api::routes::{account_purposes, health};
use crate::data::query::PageMeta;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Refdata API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Reference data service"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "account-purposes", description = "Account purpose lookup table")
    ),
    paths(
        health::health,
        account_purposes::list_account_purposes,
        account_purposes::list_active_account_purposes,
        account_purposes::get_account_purpose,
        account_purposes::create_account_purpose,
        account_purposes::update_account_purpose,
        account_purposes::toggle_account_purpose,
        account_purposes::delete_account_purpose,
    ),
    components(schemas(
        health::HealthResponse,
        account_purposes::types::AccountPurposeBody,
        account_purposes::types::AccountPurposeDto,
        PageMeta,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
