// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::identity::Identity;

use crate::models::{
    BookingError, BookingStatus, CompleteBookingRequest, CreateBookingRequest, SendMessageRequest,
};
use crate::services::booking::BookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub status_filter: Option<BookingStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignQueryParams {
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelQueryParams {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQueryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::NotFound => AppError::NotFound("Booking not found".to_string()),
        BookingError::AccessDenied => AppError::AccessDenied("Access denied".to_string()),
        BookingError::InvalidTransition(status) => {
            AppError::Conflict(format!("Cannot transition booking with status: {}", status))
        }
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::Database(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .create_booking(&identity, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let bookings = service
        .list_bookings(&identity, params.status_filter, params.limit, params.offset)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(bookings)))
}

/// Aggregate count for dashboards; deliberately unauthenticated.
#[axum::debug_handler]
pub async fn count_bookings(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let count = service.count_bookings().await.map_err(map_booking_error)?;

    Ok(Json(json!({ "count": count })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .get_booking(&identity, &booking_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(booking)))
}

// ==============================================================================
// TRANSITION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn assign_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Query(params): Query<AssignQueryParams>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .assign_doctor(&identity, &booking_id, &params.doctor_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "booking": booking,
        "message": "Doctor assigned successfully"
    })))
}

#[axum::debug_handler]
pub async fn start_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .start_booking(&identity, &booking_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "booking": booking,
        "message": "Booking started successfully"
    })))
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CompleteBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .complete_booking(&identity, &booking_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "booking": booking,
        "message": "Booking completed successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Query(params): Query<CancelQueryParams>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let booking = service
        .cancel_booking(&identity, &booking_id, params.reason)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "booking": booking,
        "message": "Booking cancelled successfully"
    })))
}

// ==============================================================================
// MESSAGING AND AUDIT TRAIL
// ==============================================================================

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let message = service
        .send_message(&identity, &booking_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(message)))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Query(params): Query<MessagesQueryParams>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let messages = service
        .get_messages(&identity, &booking_id, params.limit, params.offset)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(messages)))
}

#[axum::debug_handler]
pub async fn get_status_history(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let history = service
        .get_status_history(&identity, &booking_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(history)))
}
