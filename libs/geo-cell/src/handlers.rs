// libs/geo-cell/src/handlers.rs
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

use crate::models::{GeoError, TrackLocationRequest, UpdateAvailabilityRequest};
use crate::services::search::{DEFAULT_RADIUS_KM, DEFAULT_SEARCH_LIMIT};
use crate::services::{AvailabilityService, LocationTrackingService, NearbySearchService};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct NearbyQueryParams {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<f64>,
    pub specialization: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQueryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

fn map_geo_error(e: GeoError) -> AppError {
    match e {
        GeoError::LocationNotFound => AppError::NotFound("Location not found".to_string()),
        GeoError::AccessDenied(msg) => AppError::AccessDenied(msg),
        GeoError::Validation(msg) => AppError::ValidationError(msg),
        GeoError::Geocoding(msg) => AppError::ExternalService(msg),
        GeoError::Database(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// TRACKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn track_location(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<TrackLocationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LocationTrackingService::new(&state);

    let location = service
        .track_location(&identity, request)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!({
        "location": location,
        "message": "Location tracked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_user_location(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = LocationTrackingService::new(&state);

    let location = service
        .get_user_location(&user_id)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!(location)))
}

#[axum::debug_handler]
pub async fn get_doctor_location(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = LocationTrackingService::new(&state);

    let location = service
        .get_doctor_location(&doctor_id)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!(location)))
}

#[axum::debug_handler]
pub async fn get_location_history(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Value>, AppError> {
    let service = LocationTrackingService::new(&state);

    let history = service
        .get_history(&user_id, params.limit, params.offset)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!(history)))
}

// ==============================================================================
// SEARCH HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn find_nearby_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<NearbyQueryParams>,
) -> Result<Json<Value>, AppError> {
    let service = NearbySearchService::new(&state);

    let doctors = service
        .find_nearby_doctors(
            params.lat,
            params.lon,
            params.radius.unwrap_or(DEFAULT_RADIUS_KM),
            params.specialization.as_deref(),
            params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        )
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!(doctors)))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let availability = service
        .update_availability(&identity, request)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!({
        "availability": availability,
        "message": "Availability updated successfully"
    })))
}

// ==============================================================================
// GEOCODING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn geocode_address(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LocationTrackingService::new(&state);

    let (latitude, longitude) = service
        .geocode_address(&request.address)
        .await
        .map_err(map_geo_error)?;

    Ok(Json(json!({
        "latitude": latitude,
        "longitude": longitude,
        "address": request.address
    })))
}
