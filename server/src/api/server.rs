//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::openapi::openapi_json;
use super::routes::{account_purposes, health};
use crate::core::CoreApp;
use crate::core::constants::MSG_NOT_FOUND;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered; returns CoreApp for final cleanup.
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(&app);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Assemble the full application router
pub fn build_router(app: &CoreApp) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi_json))
        .nest(
            "/account-purposes",
            account_purposes::routes(app.database.clone()),
        );

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "statusCode": StatusCode::NOT_FOUND.as_u16(),
            "message": MSG_NOT_FOUND,
        })),
    )
}
