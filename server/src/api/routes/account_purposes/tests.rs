//! End-to-end tests for the account purpose endpoints: request → query
//! parser → predicate builder → SQLite → envelope.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use crate::api::build_router;
use crate::core::CoreApp;
use crate::core::config::{AppConfig, DatabaseConfig, ServerConfig};
use crate::core::shutdown::ShutdownService;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::account_purpose;

async fn test_router() -> Router {
    let database = Arc::new(SqliteService::connect_in_memory().await.unwrap());
    account_purpose::seed(database.pool()).await.unwrap();

    let app = CoreApp {
        shutdown: ShutdownService::new(database.clone()),
        config: AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
            },
        },
        database,
    };

    build_router(&app)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn list_applies_filter_sort_and_pagination() {
    let router = test_router().await;

    let response = router
        .oneshot(get(
            "/api/v1/account-purposes?code=eq:SAVINGS&page=1&pageSize=5&sort=code:asc",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data retrieved successfully");
    assert_eq!(body["data"]["meta"]["total"], 1);
    assert_eq!(body["data"]["meta"]["totalPages"], 1);
    assert_eq!(body["data"]["meta"]["currentPage"], 1);
    assert_eq!(body["data"]["meta"]["pageSize"], 5);
    assert_eq!(body["data"]["data"][0]["code"], "SAVINGS");
}

#[tokio::test]
async fn list_search_matches_case_insensitively() {
    let router = test_router().await;

    let response = router
        .oneshot(get("/api/v1/account-purposes?search=SAV"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // "Savings Account" matches on both code and name
    assert_eq!(body["data"]["meta"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["code"], "SAVINGS");
}

#[tokio::test]
async fn list_ignores_unknown_filter_fields() {
    let router = test_router().await;

    let response = router
        .oneshot(get("/api/v1/account-purposes?password=x"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // probing an unknown field filters nothing and leaks nothing
    assert_eq!(body["data"]["meta"]["total"], 5);
}

#[tokio::test]
async fn list_rejects_malformed_pagination() {
    let router = test_router().await;

    let response = router
        .oneshot(get("/api/v1/account-purposes?page=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "Invalid page number");
}

#[tokio::test]
async fn create_then_conflict_on_duplicate_code() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/account-purposes",
            serde_json::json!({"code": "ESCROW", "name": "Escrow Account"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Data created successfully");
    assert_eq!(body["data"]["code"], "ESCROW");
    assert_eq!(body["data"]["isActive"], false);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/account-purposes",
            serde_json::json!({"code": "ESCROW", "name": "Another"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_invalid_body_with_details() {
    let router = test_router().await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/account-purposes",
            serde_json::json!({"code": "", "name": "X"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Validation error");
    assert!(body["details"]["code"].is_array());
}

#[tokio::test]
async fn get_update_toggle_delete_round_trip() {
    let router = test_router().await;

    // find LOAN's id through the filter pipeline
    let response = router
        .clone()
        .oneshot(get("/api/v1/account-purposes?code=LOAN"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let id = body["data"]["data"][0]["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(get(&format!("/api/v1/account-purposes/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/account-purposes/{id}"),
            serde_json::json!({"code": "LOAN", "name": "Lending Account"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Lending Account");

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/account-purposes/{id}/toggle"),
            serde_json::Value::Null,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["isActive"], true);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/account-purposes/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get(&format!("/api/v1/account-purposes/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn active_listing_and_unknown_routes() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(get("/api/v1/account-purposes/active"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let response = router.oneshot(get("/api/v1/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}
