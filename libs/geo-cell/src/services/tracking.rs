// libs/geo-cell/src/services/tracking.rs
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_models::identity::{Identity, Role};

use crate::models::{
    GeoError, Location, LocationHistoryEntry, TrackLocationRequest, UserType,
};
use crate::repository::{GeoRepository, PostgrestGeoRepository};
use crate::services::geocoding::GeocodingService;

pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

pub struct LocationTrackingService<R: GeoRepository> {
    repository: R,
    geocoder: GeocodingService,
}

impl LocationTrackingService<PostgrestGeoRepository> {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: PostgrestGeoRepository::new(config),
            geocoder: GeocodingService::new(config),
        }
    }
}

impl<R: GeoRepository> LocationTrackingService<R> {
    pub fn with_repository(repository: R, geocoder: GeocodingService) -> Self {
        Self { repository, geocoder }
    }

    /// Upsert the caller's active location and append one immutable history
    /// row. Reverse geocoding is best-effort; a geocoder outage never fails
    /// the tracking write.
    pub async fn track_location(
        &self,
        identity: &Identity,
        request: TrackLocationRequest,
    ) -> Result<Location, GeoError> {
        let address = match request.address.clone() {
            Some(address) => Some(address),
            None => match self
                .geocoder
                .reverse_geocode(request.latitude, request.longitude)
                .await
            {
                Ok(address) => address,
                Err(e) => {
                    warn!("Reverse geocoding failed, storing location without address: {}", e);
                    None
                }
            },
        };

        let location = self
            .repository
            .upsert_active_location(
                &identity.user_id,
                user_type_for(identity),
                request.latitude,
                request.longitude,
                address,
                request.accuracy,
            )
            .await?;

        self.repository
            .append_history(&LocationHistoryEntry::from_location(&location))
            .await?;

        info!("Tracked location for user {}", identity.user_id);
        Ok(location)
    }

    pub async fn get_user_location(&self, user_id: &str) -> Result<Location, GeoError> {
        self.repository
            .fetch_active_location(user_id)
            .await?
            .ok_or(GeoError::LocationNotFound)
    }

    pub async fn get_doctor_location(&self, doctor_id: &str) -> Result<Location, GeoError> {
        self.repository
            .fetch_doctor_location(doctor_id)
            .await?
            .ok_or(GeoError::LocationNotFound)
    }

    pub async fn get_history(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<LocationHistoryEntry>, GeoError> {
        self.repository
            .list_history(
                user_id,
                limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
                offset.unwrap_or(0),
            )
            .await
    }

    pub async fn geocode_address(&self, address: &str) -> Result<(f64, f64), GeoError> {
        self.geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| GeoError::Validation("Could not geocode address".to_string()))
    }
}

fn user_type_for(identity: &Identity) -> UserType {
    match identity.role {
        Some(Role::Doctor) => UserType::Doctor,
        Some(Role::Clinic) => UserType::Clinic,
        _ => UserType::Patient,
    }
}
