// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::identity_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    // Aggregate count is served to dashboards without identity headers.
    let public_routes = Router::new().route("/count", get(handlers::count_bookings));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_booking))
        .route("/", get(handlers::list_bookings))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/assign", put(handlers::assign_doctor))
        .route("/{booking_id}/start", put(handlers::start_booking))
        .route("/{booking_id}/complete", put(handlers::complete_booking))
        .route("/{booking_id}/cancel", put(handlers::cancel_booking))
        .route("/{booking_id}/messages", post(handlers::send_message))
        .route("/{booking_id}/messages", get(handlers::get_messages))
        .route("/{booking_id}/history", get(handlers::get_status_history))
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
