// libs/geo-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::identity_middleware;

use crate::handlers;

pub fn geo_routes(state: Arc<AppConfig>) -> Router {
    // Lookups and search are read-only and served without identity headers.
    let public_routes = Router::new()
        .route("/doctors/nearby", get(handlers::find_nearby_doctors))
        .route("/location/{user_id}", get(handlers::get_user_location))
        .route("/doctors/{doctor_id}/location", get(handlers::get_doctor_location))
        .route("/history/{user_id}", get(handlers::get_location_history))
        .route("/geocode", post(handlers::geocode_address));

    let protected_routes = Router::new()
        .route("/track", post(handlers::track_location))
        .route("/availability", put(handlers::update_availability))
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
