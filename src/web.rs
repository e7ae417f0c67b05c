//! Router assembly and the HTTP serve loop

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::config::WayfarerConfig;

pub async fn run(config: &WayfarerConfig, state: AppState) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(state))
        .route("/ping", get(ping))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Wayfarer server running at http://localhost:{}",
        config.server.port
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}
