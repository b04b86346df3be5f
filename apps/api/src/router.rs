use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::json;

use booking_cell::router::booking_routes;
use geo_cell::router::geo_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "TOT dispatch API is running!" }))
        .route("/health", get(health_check))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/geo", geo_routes(state.clone()))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
