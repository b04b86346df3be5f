// libs/geo-cell/src/repository.rs
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{
    DoctorAvailability, DoctorCandidate, GeoError, Location, LocationHistoryEntry,
    UpdateAvailabilityRequest, UserType,
};

#[async_trait]
pub trait GeoRepository: Send + Sync {
    /// Insert-or-update the single active location row for a user. The
    /// upsert is keyed on `user_id` at the store so two concurrent tracking
    /// calls cannot tear the record.
    async fn upsert_active_location(
        &self,
        user_id: &str,
        user_type: UserType,
        latitude: f64,
        longitude: f64,
        address: Option<String>,
        accuracy: Option<f64>,
    ) -> Result<Location, GeoError>;

    async fn fetch_active_location(&self, user_id: &str) -> Result<Option<Location>, GeoError>;

    /// Active location restricted to doctor-type users.
    async fn fetch_doctor_location(&self, doctor_id: &str) -> Result<Option<Location>, GeoError>;

    async fn append_history(&self, entry: &LocationHistoryEntry) -> Result<(), GeoError>;

    async fn list_history(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LocationHistoryEntry>, GeoError>;

    /// Merge-upsert keyed on `doctor_id`; only supplied fields are patched,
    /// `current_location_id` and `updated_at` are always refreshed.
    async fn upsert_availability(
        &self,
        doctor_id: &str,
        request: &UpdateAvailabilityRequest,
        current_location_id: Option<String>,
    ) -> Result<DoctorAvailability, GeoError>;

    /// Available doctors joined to their active doctor-type locations.
    async fn list_available_doctors(
        &self,
        specialization: Option<&str>,
    ) -> Result<Vec<DoctorCandidate>, GeoError>;
}

// ==============================================================================
// POSTGREST IMPLEMENTATION
// ==============================================================================

pub struct PostgrestGeoRepository {
    store: PostgrestClient,
}

impl PostgrestGeoRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: PostgrestClient::new(config),
        }
    }
}

fn db_err(e: anyhow::Error) -> GeoError {
    GeoError::Database(e.to_string())
}

/// Availability row with its location embedded through the
/// `current_location_id` foreign key.
#[derive(Deserialize)]
struct CandidateRow {
    #[serde(flatten)]
    availability: DoctorAvailability,
    location: Option<Location>,
}

#[async_trait]
impl GeoRepository for PostgrestGeoRepository {
    async fn upsert_active_location(
        &self,
        user_id: &str,
        user_type: UserType,
        latitude: f64,
        longitude: f64,
        address: Option<String>,
        accuracy: Option<f64>,
    ) -> Result<Location, GeoError> {
        // `id` and `created_at` are left to store defaults so the merge
        // cannot rewrite them on an existing row.
        let row = json!({
            "user_id": user_id,
            "user_type": user_type,
            "latitude": latitude,
            "longitude": longitude,
            "address": address,
            "accuracy": accuracy,
            "is_active": true,
            "updated_at": Utc::now(),
        });

        let mut rows: Vec<Location> = self
            .store
            .upsert_returning("locations", "user_id", row)
            .await
            .map_err(db_err)?;

        rows.pop()
            .ok_or_else(|| GeoError::Database("upsert returned no row".to_string()))
    }

    async fn fetch_active_location(&self, user_id: &str) -> Result<Option<Location>, GeoError> {
        let path = format!(
            "/locations?user_id=eq.{}&is_active=eq.true",
            urlencoding::encode(user_id)
        );
        let mut rows: Vec<Location> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(db_err)?;

        Ok(rows.pop())
    }

    async fn fetch_doctor_location(&self, doctor_id: &str) -> Result<Option<Location>, GeoError> {
        let path = format!(
            "/locations?user_id=eq.{}&user_type=eq.doctor&is_active=eq.true",
            urlencoding::encode(doctor_id)
        );
        let mut rows: Vec<Location> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(db_err)?;

        Ok(rows.pop())
    }

    async fn append_history(&self, entry: &LocationHistoryEntry) -> Result<(), GeoError> {
        let row = serde_json::to_value(entry).map_err(|e| GeoError::Database(e.to_string()))?;

        let _rows: Vec<LocationHistoryEntry> = self
            .store
            .insert_returning("location_history", row)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn list_history(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LocationHistoryEntry>, GeoError> {
        let path = format!(
            "/location_history?user_id=eq.{}&order=recorded_at.desc&limit={}&offset={}",
            urlencoding::encode(user_id),
            limit,
            offset
        );
        self.store.request(Method::GET, &path, None).await.map_err(db_err)
    }

    async fn upsert_availability(
        &self,
        doctor_id: &str,
        request: &UpdateAvailabilityRequest,
        current_location_id: Option<String>,
    ) -> Result<DoctorAvailability, GeoError> {
        let mut row = Map::new();
        row.insert("doctor_id".to_string(), json!(doctor_id));
        row.insert("is_available".to_string(), json!(request.is_available));
        row.insert("current_location_id".to_string(), json!(current_location_id));
        row.insert("updated_at".to_string(), json!(Utc::now()));

        if let Some(specialization) = &request.specialization {
            row.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(rating) = request.rating {
            row.insert("rating".to_string(), json!(rating));
        }
        if let Some(years) = request.experience_years {
            row.insert("experience_years".to_string(), json!(years));
        }

        let mut rows: Vec<DoctorAvailability> = self
            .store
            .upsert_returning("doctor_availability", "doctor_id", Value::Object(row))
            .await
            .map_err(db_err)?;

        rows.pop()
            .ok_or_else(|| GeoError::Database("upsert returned no row".to_string()))
    }

    async fn list_available_doctors(
        &self,
        specialization: Option<&str>,
    ) -> Result<Vec<DoctorCandidate>, GeoError> {
        let mut path =
            "/doctor_availability?select=*,location:locations!current_location_id(*)&is_available=eq.true"
                .to_string();
        if let Some(specialization) = specialization {
            path.push_str(&format!(
                "&specialization=eq.{}",
                urlencoding::encode(specialization)
            ));
        }
        debug!("Loading doctor candidates: {}", path);

        let rows: Vec<CandidateRow> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(db_err)?;

        let candidates = rows
            .into_iter()
            .filter_map(|row| {
                let location = row.location?;
                if !location.is_active || location.user_type != UserType::Doctor {
                    return None;
                }
                Some(DoctorCandidate {
                    availability: row.availability,
                    location,
                })
            })
            .collect();

        Ok(candidates)
    }
}
