// libs/geo-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// LOCATION MODELS
// ==============================================================================

/// Current position of a user. One active row per user; tracking calls
/// upsert it in place while the history table keeps the full trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub user_id: String,
    pub user_type: UserType,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Doctor,
    Patient,
    Clinic,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Doctor => write!(f, "doctor"),
            UserType::Patient => write!(f, "patient"),
            UserType::Clinic => write!(f, "clinic"),
        }
    }
}

/// Immutable history row, one per tracking call. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl LocationHistoryEntry {
    pub fn from_location(location: &Location) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: location.user_id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            address: location.address.clone(),
            accuracy: location.accuracy,
            recorded_at: Utc::now(),
        }
    }
}

// ==============================================================================
// DOCTOR AVAILABILITY
// ==============================================================================

/// One row per doctor, created lazily on the first availability update.
/// `current_location_id` is a weak reference; the location row moves
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub id: String,
    pub doctor_id: String,
    pub is_available: bool,
    pub current_location_id: Option<String>,
    pub specialization: Option<String>,
    pub rating: Option<f64>,
    pub experience_years: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_available: bool,
    pub specialization: Option<String>,
    pub rating: Option<f64>,
    pub experience_years: Option<i32>,
}

/// Ranked search hit. `distance` is km from the query point, rounded to two
/// decimals; `estimated_arrival_time` assumes 30 km/h average travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyDoctor {
    pub doctor_id: String,
    pub distance: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub specialization: Option<String>,
    pub rating: Option<f64>,
    pub experience_years: Option<i32>,
    pub estimated_arrival_time: i32,
}

/// An available doctor joined to their active location, as read from the
/// store before distance filtering.
#[derive(Debug, Clone)]
pub struct DoctorCandidate {
    pub availability: DoctorAvailability,
    pub location: Location,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Location not found")]
    LocationNotFound,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("Database error: {0}")]
    Database(String),
}
